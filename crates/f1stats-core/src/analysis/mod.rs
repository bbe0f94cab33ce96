pub mod fastest_lap;
pub mod pole_conversion;
pub mod position_prediction;
pub mod race_duration;

use std::collections::HashMap;

use polars::prelude::*;
use serde::Serialize;
use tracing::error;

use crate::config::AnalysisConfig;
use crate::enrich::EnrichedData;
use crate::error::Result;
use crate::report::{AnalysisReport, QuestionFailure};

pub use fastest_lap::{
    fastest_lap_consistency, ConsistencyObservation, FastestLapConsistency, PositionDispersion,
};
pub use pole_conversion::{
    front_row_conversion, qualifying_pole_conversion, DriverPoleConversion, FrontRowConversion,
    QualifyingPoleConversion,
};
pub use position_prediction::{position_prediction, PositionPrediction};
pub use race_duration::{
    circuit_duration_deviation, global_lap_time_deviation, CircuitDurationDeviation,
    GlobalLapTimeDeviation, RaceDurationDeviation, RaceLapTimeDeviation,
};

/// Independently computed metrics. Questions 2 and 3 each carry two distinct measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Question {
    FastestLapConsistency,
    QualifyingPoleConversion,
    FrontRowConversion,
    CircuitDurationDeviation,
    GlobalLapTimeDeviation,
    PositionPrediction,
}

impl Question {
    pub fn key(&self) -> &'static str {
        match self {
            Question::FastestLapConsistency => "fastest_lap_consistency",
            Question::QualifyingPoleConversion => "qualifying_pole_conversion",
            Question::FrontRowConversion => "front_row_conversion",
            Question::CircuitDurationDeviation => "circuit_duration_deviation",
            Question::GlobalLapTimeDeviation => "global_lap_time_deviation",
            Question::PositionPrediction => "position_prediction",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Question::FastestLapConsistency => {
                "Question 1: Does achieving the fastest lap relate to a driver's season ranking through pace consistency?"
            }
            Question::QualifyingPoleConversion => {
                "Question 2: What is the conversion rate of pole positions to podium finishes?"
            }
            Question::FrontRowConversion => {
                "Question 2: Podium finishes per front-row start by driver"
            }
            Question::CircuitDurationDeviation => {
                "Question 3: What race has the most deviation from historical average total race duration?"
            }
            Question::GlobalLapTimeDeviation => {
                "Question 3: Deviation of average lap times from the historical average (per race)"
            }
            Question::PositionPrediction => {
                "Question 4: Can we reliably predict a driver's race position from their historical performance?"
            }
        }
    }
}

/// Runs every analysis over the same enriched tables. A failing analysis is logged and
/// recorded in the report; the remaining ones still run.
pub fn run_all(data: &EnrichedData, config: &AnalysisConfig) -> AnalysisReport {
    let mut failures = Vec::new();

    let fastest_lap_consistency = isolate(Question::FastestLapConsistency, &mut failures, || {
        fastest_lap_consistency(data, config)
    });
    let qualifying_pole_conversion =
        isolate(Question::QualifyingPoleConversion, &mut failures, || {
            qualifying_pole_conversion(data, config)
        });
    let front_row_conversion = isolate(Question::FrontRowConversion, &mut failures, || {
        front_row_conversion(data, config)
    });
    let circuit_duration_deviation =
        isolate(Question::CircuitDurationDeviation, &mut failures, || {
            circuit_duration_deviation(data, config)
        });
    let global_lap_time_deviation = isolate(Question::GlobalLapTimeDeviation, &mut failures, || {
        global_lap_time_deviation(data)
    });
    let position_prediction = isolate(Question::PositionPrediction, &mut failures, || {
        position_prediction(data)
    });

    AnalysisReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        config: config.clone(),
        fastest_lap_consistency,
        qualifying_pole_conversion,
        front_row_conversion,
        circuit_duration_deviation,
        global_lap_time_deviation,
        position_prediction,
        failures,
    }
}

fn isolate<T>(
    question: Question,
    failures: &mut Vec<QuestionFailure>,
    run: impl FnOnce() -> Result<T>,
) -> Option<T> {
    match run() {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            error!(question = question.key(), error = %err, "analysis failed");
            failures.push(QuestionFailure {
                question,
                message: err.to_string(),
            });
            None
        }
    }
}

pub(crate) fn driver_surnames(drivers: &DataFrame) -> Result<HashMap<i64, String>> {
    let ids = drivers.column("driverId")?.i64()?;
    let surnames = drivers.column("surname")?.str()?;

    let mut map = HashMap::with_capacity(drivers.height());
    for idx in 0..drivers.height() {
        if let (Some(id), Some(surname)) = (ids.get(idx), surnames.get(idx)) {
            map.insert(id, surname.to_string());
        }
    }
    Ok(map)
}

pub(crate) fn driver_label(surnames: &HashMap<i64, String>, driver_id: i64) -> String {
    surnames
        .get(&driver_id)
        .cloned()
        .unwrap_or_else(|| format!("driver {driver_id}"))
}

/// `"<name> (<date>)"` per race id.
pub(crate) fn race_labels(races: &DataFrame) -> Result<HashMap<i64, String>> {
    let ids = races.column("raceId")?.i64()?;
    let names = races.column("name")?.str()?;
    let dates = races.column("date")?.str()?;

    let mut map = HashMap::with_capacity(races.height());
    for idx in 0..races.height() {
        if let (Some(id), Some(name), Some(date)) = (ids.get(idx), names.get(idx), dates.get(idx))
        {
            map.insert(id, format!("{name} ({date})"));
        }
    }
    Ok(map)
}

pub(crate) fn race_label(labels: &HashMap<i64, String>, race_id: i64) -> String {
    labels
        .get(&race_id)
        .cloned()
        .unwrap_or_else(|| format!("race {race_id}"))
}
