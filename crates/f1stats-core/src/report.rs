use serde::Serialize;

use crate::analysis::{
    CircuitDurationDeviation, FastestLapConsistency, FrontRowConversion, GlobalLapTimeDeviation,
    PositionPrediction, Question, QualifyingPoleConversion, RaceDurationDeviation,
};
use crate::config::AnalysisConfig;
use crate::error::Result;

pub const DEVIATION_TABLE_HEADER: &str =
    "| Name                           | Date       | Race ID | Deviation per Driver (seconds)";

const UNDEFINED: &str = "undefined";

#[derive(Debug, Clone, Serialize)]
pub struct QuestionFailure {
    pub question: Question,
    pub message: String,
}

/// Everything one run produced. An analysis that failed is `None` and listed in `failures`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: String,
    pub config: AnalysisConfig,
    pub fastest_lap_consistency: Option<FastestLapConsistency>,
    pub qualifying_pole_conversion: Option<QualifyingPoleConversion>,
    pub front_row_conversion: Option<Vec<FrontRowConversion>>,
    pub circuit_duration_deviation: Option<CircuitDurationDeviation>,
    pub global_lap_time_deviation: Option<GlobalLapTimeDeviation>,
    pub position_prediction: Option<PositionPrediction>,
    pub failures: Vec<QuestionFailure>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Bar charts for every analysis that produced one.
    pub fn charts(&self) -> Vec<ChartSeries> {
        let mut charts = Vec::new();
        if let Some(consistency) = &self.fastest_lap_consistency {
            charts.push(position_dispersion_chart(consistency));
        }
        if let Some(conversion) = &self.front_row_conversion {
            charts.push(front_row_conversion_chart(conversion));
        }
        if let Some(deviation) = &self.global_lap_time_deviation {
            charts.push(global_deviation_chart(deviation));
        }
        charts
    }
}

/// Labelled (category, value) pairs handed to a chart renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// File-name friendly identifier.
    pub slug: &'static str,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(String, f64)>,
}

impl ChartSeries {
    pub fn categories(&self) -> Vec<String> {
        self.points.iter().map(|(label, _)| label.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, value)| *value).collect()
    }
}

/// Undefined buckets are omitted.
pub fn position_dispersion_chart(consistency: &FastestLapConsistency) -> ChartSeries {
    ChartSeries {
        slug: "lap_consistency_by_position",
        title: "Variation in Lap Time Consistency Across Finishing Positions".to_string(),
        x_label: "Season Finishing Position".to_string(),
        y_label: "Standard Deviation of Lap Time Standard Deviations".to_string(),
        points: consistency
            .position_dispersion
            .iter()
            .filter_map(|bucket| {
                bucket
                    .lap_std_dispersion
                    .map(|value| (bucket.position.to_string(), value))
            })
            .collect(),
    }
}

pub fn front_row_conversion_chart(conversion: &[FrontRowConversion]) -> ChartSeries {
    ChartSeries {
        slug: "front_row_conversion",
        title: "Podium Finishes per Front-Row Start by Driver".to_string(),
        x_label: "Driver Surname".to_string(),
        y_label: "Conversion Rate".to_string(),
        points: conversion
            .iter()
            .map(|row| (row.label.clone(), row.ratio))
            .collect(),
    }
}

pub fn global_deviation_chart(deviation: &GlobalLapTimeDeviation) -> ChartSeries {
    ChartSeries {
        slug: "lap_time_deviation_per_race",
        title: "Deviation of Average Lap Times from Historical Average (per Race)".to_string(),
        x_label: "Race Name (Date)".to_string(),
        y_label: "Average Deviation in Seconds (per Lap)".to_string(),
        points: deviation
            .races
            .iter()
            .map(|race| (race.label.clone(), race.deviation))
            .collect(),
    }
}

pub fn format_correlation(correlation: Option<f64>) -> String {
    match correlation {
        Some(r) => format!("r = {r:.2}"),
        None => format!("r = {UNDEFINED}"),
    }
}

pub fn format_conversion_average(average: Option<f64>) -> String {
    match average {
        Some(value) => format!("{value:.3}:1"),
        None => UNDEFINED.to_string(),
    }
}

pub fn format_optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(value) => format!("{value:.precision$}"),
        None => UNDEFINED.to_string(),
    }
}

/// One row of the top-deviation table; the race name is padded or cut to 30 characters.
pub fn format_deviation_row(race: &RaceDurationDeviation) -> String {
    format!(
        "| {:<30.30} | {} | {:<7} | {}",
        race.name.as_deref().unwrap_or("unknown"),
        race.date.as_deref().unwrap_or("unknown"),
        race.race_id,
        format_optional(race.deviation, 2),
    )
}

pub fn format_most_deviating(race: &RaceDurationDeviation) -> Vec<String> {
    vec![
        format!(
            "| Race Name: {} | Date: {} | Race ID: {}",
            race.name.as_deref().unwrap_or("unknown"),
            race.date.as_deref().unwrap_or("unknown"),
            race.race_id,
        ),
        format!(
            "| Total Duration: {} seconds | Circuit Avg Total Duration: {} seconds | Deviation (Race Duration Difference): {} seconds",
            format_optional(race.total_race_duration, 2),
            format_optional(race.avg_circuit_duration, 2),
            format_optional(race.deviation, 2),
        ),
    ]
}

pub fn format_deviation_table(deviation: &CircuitDurationDeviation) -> Vec<String> {
    let mut lines = Vec::with_capacity(deviation.top.len() + 1);
    lines.push(DEVIATION_TABLE_HEADER.to_string());
    lines.extend(deviation.top.iter().map(format_deviation_row));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::PositionDispersion;

    fn race(name: &str, deviation: Option<f64>) -> RaceDurationDeviation {
        RaceDurationDeviation {
            race_id: 841,
            name: Some(name.to_string()),
            date: Some("2011-03-27".to_string()),
            circuit_id: Some(1),
            avg_lap_time: 98.5,
            num_laps: Some(58),
            total_race_duration: Some(5713.0),
            avg_circuit_duration: Some(5600.25),
            deviation,
        }
    }

    #[test]
    fn correlation_uses_two_decimals() {
        assert_eq!(format_correlation(Some(0.73456)), "r = 0.73");
        assert_eq!(format_correlation(None), "r = undefined");
    }

    #[test]
    fn conversion_average_uses_ratio_notation() {
        assert_eq!(format_conversion_average(Some(0.5)), "0.500:1");
        assert_eq!(format_conversion_average(None), "undefined");
    }

    #[test]
    fn deviation_row_pads_and_truncates_name() {
        let row = format_deviation_row(&race("Australian Grand Prix", Some(112.754)));
        assert_eq!(
            row,
            "| Australian Grand Prix          | 2011-03-27 | 841     | 112.75"
        );

        let long = format_deviation_row(&race(
            "Formula 1 Gulf Air Bahrain Grand Prix Night Edition",
            Some(1.0),
        ));
        assert!(long.starts_with("| Formula 1 Gulf Air Bahrain Gra | "));
    }

    #[test]
    fn most_deviating_summary_lists_durations() {
        let lines = format_most_deviating(&race("Australian Grand Prix", Some(112.75)));
        assert_eq!(
            lines[0],
            "| Race Name: Australian Grand Prix | Date: 2011-03-27 | Race ID: 841"
        );
        assert!(lines[1].contains("Total Duration: 5713.00 seconds"));
        assert!(lines[1].contains("Circuit Avg Total Duration: 5600.25 seconds"));
    }

    #[test]
    fn dispersion_chart_omits_undefined_buckets() {
        let consistency = FastestLapConsistency {
            observations: Vec::new(),
            correlation: None,
            position_dispersion: vec![
                PositionDispersion {
                    position: 1,
                    observations: 3,
                    lap_std_dispersion: Some(120.0),
                },
                PositionDispersion {
                    position: 2,
                    observations: 1,
                    lap_std_dispersion: None,
                },
            ],
            single_lap_holders: 0,
        };

        let chart = position_dispersion_chart(&consistency);
        assert_eq!(chart.categories(), vec!["1".to_string()]);
        assert_eq!(chart.values(), vec![120.0]);
    }
}
