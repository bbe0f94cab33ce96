//! Two pole-to-podium measures that disagree on what a "pole" is.
//!
//! `qualifying_pole_conversion` counts qualifying position 1 only. `front_row_conversion`
//! counts any grid slot up to `front_row_cutoff` from the race results. They are reported side
//! by side and never merged.

use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use super::{driver_label, driver_surnames};
use crate::config::AnalysisConfig;
use crate::enrich::EnrichedData;
use crate::error::Result;
use crate::stats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverPoleConversion {
    pub driver_id: i64,
    pub surname: Option<String>,
    pub poles: i64,
    pub podiums: i64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualifyingPoleConversion {
    /// Drivers with at least one pole, ordered by driver id.
    pub drivers: Vec<DriverPoleConversion>,
    pub average_conversion_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontRowConversion {
    pub driver_id: i64,
    pub label: String,
    pub front_row_starts: i64,
    pub podium_finishes: i64,
    pub ratio: f64,
}

/// Podiums per qualifying pole, per driver, over races present in both qualifying and results.
/// Podiums count across every joined race, not only the pole races.
pub fn qualifying_pole_conversion(
    data: &EnrichedData,
    config: &AnalysisConfig,
) -> Result<QualifyingPoleConversion> {
    let results = data.results.clone().lazy().select([
        col("raceId"),
        col("driverId"),
        col("positionOrder"),
    ]);

    let per_driver = data
        .qualifying
        .clone()
        .lazy()
        .select([col("raceId"), col("driverId"), col("position")])
        .join(
            results,
            [col("raceId"), col("driverId")],
            [col("raceId"), col("driverId")],
            JoinArgs::new(JoinType::Inner),
        )
        .group_by([col("driverId")])
        .agg([
            col("position")
                .eq(lit(config.pole_position))
                .cast(DataType::Int64)
                .sum()
                .alias("poles"),
            col("positionOrder")
                .lt_eq(lit(config.podium_cutoff))
                .cast(DataType::Int64)
                .sum()
                .alias("podiums"),
        ])
        .filter(col("poles").gt(lit(0i64)))
        .sort(["driverId"], SortMultipleOptions::default())
        .collect()?;

    let surnames = driver_surnames(&data.drivers)?;
    let driver_ids = per_driver.column("driverId")?.i64()?;
    let pole_counts = per_driver.column("poles")?.i64()?;
    let podium_counts = per_driver.column("podiums")?.i64()?;

    let mut drivers = Vec::with_capacity(per_driver.height());
    for idx in 0..per_driver.height() {
        let (Some(driver_id), Some(poles), Some(podiums)) =
            (driver_ids.get(idx), pole_counts.get(idx), podium_counts.get(idx))
        else {
            continue;
        };
        drivers.push(DriverPoleConversion {
            driver_id,
            surname: surnames.get(&driver_id).cloned(),
            poles,
            podiums,
            conversion_rate: podiums as f64 / poles as f64,
        });
    }

    let rates: Vec<f64> = drivers.iter().map(|d| d.conversion_rate).collect();
    let average_conversion_rate = stats::mean(&rates);
    if average_conversion_rate.is_none() {
        warn!("no driver holds a qualifying pole; average conversion rate is undefined");
    }
    info!(
        drivers = drivers.len(),
        average = ?average_conversion_rate,
        "computed qualifying pole conversion"
    );

    Ok(QualifyingPoleConversion {
        drivers,
        average_conversion_rate,
    })
}

/// Podium finishes per front-row start, per driver, from race results alone.
///
/// A driver without a front-row start or without a podium has no defined ratio and is
/// dropped. Output is ascending by ratio; equal ratios keep driver id order.
pub fn front_row_conversion(
    data: &EnrichedData,
    config: &AnalysisConfig,
) -> Result<Vec<FrontRowConversion>> {
    let per_driver = data
        .results
        .clone()
        .lazy()
        .group_by([col("driverId")])
        .agg([
            col("grid")
                .lt_eq(lit(config.front_row_cutoff))
                .cast(DataType::Int64)
                .sum()
                .alias("front_row_starts"),
            col("positionOrder")
                .lt_eq(lit(config.podium_cutoff))
                .cast(DataType::Int64)
                .sum()
                .alias("podium_finishes"),
        ])
        .sort(["driverId"], SortMultipleOptions::default())
        .collect()?;

    let surnames = driver_surnames(&data.drivers)?;
    let driver_ids = per_driver.column("driverId")?.i64()?;
    let starts = per_driver.column("front_row_starts")?.i64()?;
    let podiums = per_driver.column("podium_finishes")?.i64()?;

    let mut rows = Vec::with_capacity(per_driver.height());
    let mut undefined = 0usize;
    for idx in 0..per_driver.height() {
        let Some(driver_id) = driver_ids.get(idx) else {
            continue;
        };
        let front_row_starts = starts.get(idx).unwrap_or(0);
        let podium_finishes = podiums.get(idx).unwrap_or(0);
        if front_row_starts == 0 || podium_finishes == 0 {
            undefined += 1;
            continue;
        }
        rows.push(FrontRowConversion {
            driver_id,
            label: driver_label(&surnames, driver_id),
            front_row_starts,
            podium_finishes,
            ratio: podium_finishes as f64 / front_row_starts as f64,
        });
    }

    rows.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));

    if undefined > 0 {
        warn!(undefined, "drivers without front-row starts or podiums dropped from conversion");
    }
    info!(drivers = rows.len(), "computed front-row conversion");

    Ok(rows)
}
