use std::collections::{BTreeMap, HashMap};

use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use super::{race_label, race_labels};
use crate::config::AnalysisConfig;
use crate::enrich::EnrichedData;
use crate::error::Result;
use crate::stats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceDurationDeviation {
    pub race_id: i64,
    pub name: Option<String>,
    pub date: Option<String>,
    pub circuit_id: Option<i64>,
    pub avg_lap_time: f64,
    pub num_laps: Option<i64>,
    pub total_race_duration: Option<f64>,
    pub avg_circuit_duration: Option<f64>,
    pub deviation: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircuitDurationDeviation {
    /// Every race with lap data, ascending by race id.
    pub races: Vec<RaceDurationDeviation>,
    pub most_deviating: Option<RaceDurationDeviation>,
    /// Highest deviations first; equal deviations keep race id order.
    pub top: Vec<RaceDurationDeviation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceLapTimeDeviation {
    pub race_id: i64,
    pub label: String,
    pub avg_lap_time: f64,
    pub deviation: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalLapTimeDeviation {
    pub global_avg_lap_time: Option<f64>,
    /// Ascending by race id.
    pub races: Vec<RaceLapTimeDeviation>,
}

fn average_lap_time_per_race(data: &EnrichedData) -> LazyFrame {
    data.lap_times
        .clone()
        .lazy()
        .group_by([col("raceId")])
        .agg([col("seconds").mean().alias("avg_lap_time")])
}

/// Estimated race duration (mean lap × lap count) against the mean estimate of every race held
/// at the same circuit, the race itself included.
pub fn circuit_duration_deviation(
    data: &EnrichedData,
    config: &AnalysisConfig,
) -> Result<CircuitDurationDeviation> {
    let races = data.races.clone().lazy().select([
        col("raceId"),
        col("name"),
        col("date"),
        col("circuitId"),
        col("num_laps"),
    ]);

    let per_race = average_lap_time_per_race(data)
        .join(
            races,
            [col("raceId")],
            [col("raceId")],
            JoinArgs::new(JoinType::Left),
        )
        .sort(["raceId"], SortMultipleOptions::default())
        .collect()?;

    let race_ids = per_race.column("raceId")?.i64()?;
    let names = per_race.column("name")?.str()?;
    let dates = per_race.column("date")?.str()?;
    let circuit_ids = per_race.column("circuitId")?.i64()?;
    let num_laps = per_race.column("num_laps")?.i64()?;
    let avg_laps = per_race.column("avg_lap_time")?.f64()?;

    let mut races = Vec::with_capacity(per_race.height());
    for idx in 0..per_race.height() {
        let (Some(race_id), Some(avg_lap_time)) = (race_ids.get(idx), avg_laps.get(idx)) else {
            continue;
        };
        let laps = num_laps.get(idx);
        races.push(RaceDurationDeviation {
            race_id,
            name: names.get(idx).map(str::to_string),
            date: dates.get(idx).map(str::to_string),
            circuit_id: circuit_ids.get(idx),
            avg_lap_time,
            num_laps: laps,
            total_race_duration: laps.map(|laps| avg_lap_time * laps as f64),
            avg_circuit_duration: None,
            deviation: None,
        });
    }

    let mut durations_by_circuit: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for race in &races {
        if let (Some(circuit), Some(total)) = (race.circuit_id, race.total_race_duration) {
            durations_by_circuit.entry(circuit).or_default().push(total);
        }
    }
    let circuit_averages: HashMap<i64, f64> = durations_by_circuit
        .iter()
        .filter_map(|(circuit, totals)| stats::mean(totals).map(|avg| (*circuit, avg)))
        .collect();

    for race in races.iter_mut() {
        race.avg_circuit_duration = race
            .circuit_id
            .and_then(|circuit| circuit_averages.get(&circuit).copied());
        race.deviation = match (race.total_race_duration, race.avg_circuit_duration) {
            (Some(total), Some(avg)) => Some((total - avg).abs()),
            _ => None,
        };
    }

    let unranked = races.iter().filter(|race| race.deviation.is_none()).count();
    if unranked > 0 {
        warn!(unranked, "races without a circuit or lap count are excluded from the ranking");
    }

    let mut most_deviating: Option<&RaceDurationDeviation> = None;
    for race in &races {
        let Some(deviation) = race.deviation else {
            continue;
        };
        let is_larger = most_deviating
            .and_then(|best| best.deviation)
            .map_or(true, |best| deviation > best);
        if is_larger {
            most_deviating = Some(race);
        }
    }
    let most_deviating = most_deviating.cloned();

    let mut top: Vec<RaceDurationDeviation> = races
        .iter()
        .filter(|race| race.deviation.is_some())
        .cloned()
        .collect();
    top.sort_by(|a, b| {
        let a = a.deviation.unwrap_or(f64::NEG_INFINITY);
        let b = b.deviation.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
    top.truncate(config.top_deviation_count);

    info!(
        races = races.len(),
        most_deviating = ?most_deviating.as_ref().map(|race| race.race_id),
        "computed circuit duration deviation"
    );

    Ok(CircuitDurationDeviation {
        races,
        most_deviating,
        top,
    })
}

/// Each race's mean lap time against the mean of every lap in the dataset.
pub fn global_lap_time_deviation(data: &EnrichedData) -> Result<GlobalLapTimeDeviation> {
    let seconds: Vec<f64> = data
        .lap_times
        .column("seconds")?
        .f64()?
        .into_iter()
        .flatten()
        .collect();
    let global_avg_lap_time = stats::mean(&seconds);

    let per_race = average_lap_time_per_race(data)
        .sort(["raceId"], SortMultipleOptions::default())
        .collect()?;
    let race_ids = per_race.column("raceId")?.i64()?;
    let avg_laps = per_race.column("avg_lap_time")?.f64()?;
    let labels = race_labels(&data.races)?;

    let mut races = Vec::with_capacity(per_race.height());
    if let Some(global) = global_avg_lap_time {
        for idx in 0..per_race.height() {
            let (Some(race_id), Some(avg_lap_time)) = (race_ids.get(idx), avg_laps.get(idx)) else {
                continue;
            };
            races.push(RaceLapTimeDeviation {
                race_id,
                label: race_label(&labels, race_id),
                avg_lap_time,
                deviation: (avg_lap_time - global).abs(),
            });
        }
    } else {
        warn!("no lap times loaded; global lap-time deviation is undefined");
    }

    info!(
        races = races.len(),
        global_avg_lap_time = ?global_avg_lap_time,
        "computed global lap-time deviation"
    );

    Ok(GlobalLapTimeDeviation {
        global_avg_lap_time,
        races,
    })
}
