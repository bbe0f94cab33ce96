use std::collections::BTreeMap;
use std::path::Path;

use f1stats_parser::{load_dataset, F1Dataset};
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::stats;

/// Source tables plus every derived column and table the analyses read.
#[derive(Debug, Clone)]
pub struct EnrichedData {
    /// Lap times with a `seconds` column.
    pub lap_times: DataFrame,
    /// Races with a nullable `num_laps` column.
    pub races: DataFrame,
    /// One row per race: `raceId`, `driverId`, `lap`, `milliseconds`.
    pub fastest_laps: DataFrame,
    /// One row per (race, driver): `raceId`, `driverId`, `lap_count`, `lap_std_ms`.
    pub lap_dispersion: DataFrame,
    /// Results ordered by (driver, race) with `historical_avg_position`.
    pub historical_positions: DataFrame,
    pub results: DataFrame,
    pub driver_standings: DataFrame,
    pub drivers: DataFrame,
    pub qualifying: DataFrame,
}

/// Loads the six tables from `dir` and enriches them. Loader failures surface as
/// `AnalysisError::Parser`.
pub fn load_enriched(dir: &Path) -> Result<EnrichedData> {
    let dataset = load_dataset(dir)?;
    enrich(&dataset)
}

pub fn enrich(dataset: &F1Dataset) -> Result<EnrichedData> {
    info!("enriching loaded tables");

    let lap_times = with_seconds(&dataset.lap_times)?;
    let races = races_with_num_laps(&dataset.races, &dataset.lap_times)?;
    let fastest_laps = fastest_laps(&dataset.lap_times)?;
    let lap_dispersion = lap_time_dispersion(&dataset.lap_times)?;
    let historical_positions = historical_positions(&dataset.results)?;

    let races_without_laps = races.column("num_laps")?.null_count();
    if races_without_laps > 0 {
        debug!(races_without_laps, "races have no lap data; num_laps left null");
    }

    Ok(EnrichedData {
        lap_times,
        races,
        fastest_laps,
        lap_dispersion,
        historical_positions,
        results: dataset.results.clone(),
        driver_standings: dataset.driver_standings.clone(),
        drivers: dataset.drivers.clone(),
        qualifying: dataset.qualifying.clone(),
    })
}

pub fn with_seconds(lap_times: &DataFrame) -> Result<DataFrame> {
    let df = lap_times
        .clone()
        .lazy()
        .with_column((col("milliseconds").cast(DataType::Float64) / lit(1000.0)).alias("seconds"))
        .collect()?;
    Ok(df)
}

/// Left-joins the highest lap number seen per race as `num_laps`.
pub fn races_with_num_laps(races: &DataFrame, lap_times: &DataFrame) -> Result<DataFrame> {
    let race_laps = lap_times
        .clone()
        .lazy()
        .group_by([col("raceId")])
        .agg([col("lap").max().alias("num_laps")]);

    let df = races
        .clone()
        .lazy()
        .join(
            race_laps,
            [col("raceId")],
            [col("raceId")],
            JoinArgs::new(JoinType::Left),
        )
        .sort(["raceId"], SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}

/// Quickest lap of every race. Equal times resolve to the lowest lap number, then the lowest
/// driver id.
pub fn fastest_laps(lap_times: &DataFrame) -> Result<DataFrame> {
    let race_ids = lap_times.column("raceId")?.i64()?;
    let driver_ids = lap_times.column("driverId")?.i64()?;
    let laps = lap_times.column("lap")?.i64()?;
    let millis = lap_times.column("milliseconds")?.i64()?;

    // raceId -> (milliseconds, lap, driverId); tuple order is the tie-break order.
    let mut best: BTreeMap<i64, (i64, i64, i64)> = BTreeMap::new();
    for idx in 0..lap_times.height() {
        let (Some(race), Some(driver), Some(lap), Some(ms)) = (
            race_ids.get(idx),
            driver_ids.get(idx),
            laps.get(idx),
            millis.get(idx),
        ) else {
            continue;
        };

        let candidate = (ms, lap, driver);
        best.entry(race)
            .and_modify(|current| {
                if candidate < *current {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }

    let mut out_races = Vec::with_capacity(best.len());
    let mut out_drivers = Vec::with_capacity(best.len());
    let mut out_laps = Vec::with_capacity(best.len());
    let mut out_millis = Vec::with_capacity(best.len());
    for (race, (ms, lap, driver)) in best {
        out_races.push(race);
        out_drivers.push(driver);
        out_laps.push(lap);
        out_millis.push(ms);
    }

    let df = df![
        "raceId" => out_races,
        "driverId" => out_drivers,
        "lap" => out_laps,
        "milliseconds" => out_millis,
    ]?;
    Ok(df)
}

/// Sample standard deviation of lap milliseconds per (race, driver). Drivers with a single
/// recorded lap get a null `lap_std_ms`.
pub fn lap_time_dispersion(lap_times: &DataFrame) -> Result<DataFrame> {
    let race_ids = lap_times.column("raceId")?.i64()?;
    let driver_ids = lap_times.column("driverId")?.i64()?;
    let millis = lap_times.column("milliseconds")?.i64()?;

    let mut groups: BTreeMap<(i64, i64), Vec<f64>> = BTreeMap::new();
    for idx in 0..lap_times.height() {
        if let (Some(race), Some(driver), Some(ms)) =
            (race_ids.get(idx), driver_ids.get(idx), millis.get(idx))
        {
            groups.entry((race, driver)).or_default().push(ms as f64);
        }
    }

    let mut out_races = Vec::with_capacity(groups.len());
    let mut out_drivers = Vec::with_capacity(groups.len());
    let mut lap_counts = Vec::with_capacity(groups.len());
    let mut std_devs: Vec<Option<f64>> = Vec::with_capacity(groups.len());
    let mut single_lap = 0usize;

    for ((race, driver), values) in &groups {
        let std_dev = stats::sample_std_dev(values);
        if std_dev.is_none() {
            single_lap += 1;
        }
        out_races.push(*race);
        out_drivers.push(*driver);
        lap_counts.push(values.len() as i64);
        std_devs.push(std_dev);
    }

    if single_lap > 0 {
        warn!(single_lap, "driver/race pairs with one lap have no lap-time deviation");
    }

    let df = df![
        "raceId" => out_races,
        "driverId" => out_drivers,
        "lap_count" => lap_counts,
        "lap_std_ms" => std_devs,
    ]?;
    Ok(df)
}

/// Running mean of `positionOrder` over each driver's strictly earlier races (by raceId).
/// A driver's first race has no history and gets null.
pub fn historical_positions(results: &DataFrame) -> Result<DataFrame> {
    let race_ids = results.column("raceId")?.i64()?;
    let driver_ids = results.column("driverId")?.i64()?;
    let positions = results.column("positionOrder")?.i64()?;

    let mut rows: Vec<(i64, i64, i64)> = Vec::with_capacity(results.height());
    for idx in 0..results.height() {
        if let (Some(driver), Some(race), Some(position)) =
            (driver_ids.get(idx), race_ids.get(idx), positions.get(idx))
        {
            rows.push((driver, race, position));
        }
    }
    rows.sort_unstable();

    let mut out_drivers = Vec::with_capacity(rows.len());
    let mut out_races = Vec::with_capacity(rows.len());
    let mut out_positions = Vec::with_capacity(rows.len());
    let mut history: Vec<Option<f64>> = Vec::with_capacity(rows.len());

    let mut current_driver = None;
    let mut sum = 0.0;
    let mut count = 0usize;

    for (driver, race, position) in rows {
        if current_driver != Some(driver) {
            current_driver = Some(driver);
            sum = 0.0;
            count = 0;
        }

        history.push((count > 0).then(|| sum / count as f64));
        out_drivers.push(driver);
        out_races.push(race);
        out_positions.push(position);

        sum += position as f64;
        count += 1;
    }

    let df = df![
        "driverId" => out_drivers,
        "raceId" => out_races,
        "positionOrder" => out_positions,
        "historical_avg_position" => history,
    ]?;
    Ok(df)
}
