use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::enrich::EnrichedData;
use crate::error::Result;
use crate::stats;

/// A fastest-lap holder's pace consistency in that race and their standing after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyObservation {
    pub race_id: i64,
    pub driver_id: i64,
    pub lap_std_ms: f64,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionDispersion {
    pub position: i64,
    pub observations: usize,
    /// Sample standard deviation of `lap_std_ms` within the bucket; undefined for one observation.
    pub lap_std_dispersion: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FastestLapConsistency {
    pub observations: Vec<ConsistencyObservation>,
    pub correlation: Option<f64>,
    pub position_dispersion: Vec<PositionDispersion>,
    /// Fastest-lap holders inside the standing range dropped for having a single recorded lap.
    pub single_lap_holders: usize,
}

/// Relates lap-time consistency of each race's fastest-lap holder to their championship
/// standing after that race.
pub fn fastest_lap_consistency(
    data: &EnrichedData,
    config: &AnalysisConfig,
) -> Result<FastestLapConsistency> {
    let dispersion = data.lap_dispersion.clone().lazy().select([
        col("raceId"),
        col("driverId"),
        col("lap_count"),
        col("lap_std_ms"),
    ]);
    let standings = data.driver_standings.clone().lazy().select([
        col("raceId"),
        col("driverId"),
        col("position"),
    ]);

    let joined = data
        .fastest_laps
        .clone()
        .lazy()
        .join(
            dispersion,
            [col("raceId"), col("driverId")],
            [col("raceId"), col("driverId")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            standings,
            [col("raceId"), col("driverId")],
            [col("raceId"), col("driverId")],
            JoinArgs::new(JoinType::Left),
        )
        .filter(
            col("position")
                .gt_eq(lit(1i64))
                .and(col("position").lt_eq(lit(config.max_standing_position))),
        )
        .sort(["raceId"], SortMultipleOptions::default())
        .collect()?;

    let race_ids = joined.column("raceId")?.i64()?;
    let driver_ids = joined.column("driverId")?.i64()?;
    let lap_counts = joined.column("lap_count")?.i64()?;
    let lap_stds = joined.column("lap_std_ms")?.f64()?;
    let positions = joined.column("position")?.i64()?;

    let mut seen: HashSet<(i64, i64)> = HashSet::new();
    let mut observations = Vec::with_capacity(joined.height());
    let mut single_lap_holders = 0usize;
    for idx in 0..joined.height() {
        let (Some(race_id), Some(driver_id), Some(position)) =
            (race_ids.get(idx), driver_ids.get(idx), positions.get(idx))
        else {
            continue;
        };
        let Some(lap_std_ms) = lap_stds.get(idx) else {
            if lap_counts.get(idx).is_some_and(|count| count < 2) {
                single_lap_holders += 1;
            }
            continue;
        };
        if !seen.insert((race_id, driver_id)) {
            continue;
        }
        observations.push(ConsistencyObservation {
            race_id,
            driver_id,
            lap_std_ms,
            position,
        });
    }

    let lap_std_values: Vec<f64> = observations.iter().map(|obs| obs.lap_std_ms).collect();
    let position_values: Vec<f64> = observations.iter().map(|obs| obs.position as f64).collect();
    let correlation = stats::pearson(&lap_std_values, &position_values);

    let mut buckets: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for obs in &observations {
        buckets.entry(obs.position).or_default().push(obs.lap_std_ms);
    }
    let position_dispersion: Vec<PositionDispersion> = buckets
        .into_iter()
        .map(|(position, values)| PositionDispersion {
            position,
            observations: values.len(),
            lap_std_dispersion: stats::sample_std_dev(&values),
        })
        .collect();

    if single_lap_holders > 0 {
        warn!(single_lap_holders, "fastest-lap holders with a single recorded lap dropped");
    }
    let undefined_buckets = position_dispersion
        .iter()
        .filter(|bucket| bucket.lap_std_dispersion.is_none())
        .count();
    if undefined_buckets > 0 {
        warn!(undefined_buckets, "standing positions with a single observation have no dispersion");
    }
    if correlation.is_none() {
        warn!(observations = observations.len(), "fastest-lap consistency correlation is undefined");
    }
    info!(
        observations = observations.len(),
        correlation = ?correlation,
        "computed fastest-lap consistency"
    );

    Ok(FastestLapConsistency {
        observations,
        correlation,
        position_dispersion,
        single_lap_holders,
    })
}
