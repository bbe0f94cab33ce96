mod common;

use std::io::Write;

use anyhow::Result;
use common::{close, fixture_dir};
use f1stats_core::report::format_conversion_average;
use f1stats_core::{enrich, load_enriched, run_all, AnalysisConfig, AnalysisError, Question};
use f1stats_parser::{load_dataset, ParserError};
use polars::prelude::*;

#[test]
fn fixture_dataset_runs_every_analysis() -> Result<()> {
    let dataset = load_dataset(&fixture_dir())?;
    let data = enrich(&dataset)?;
    let report = run_all(&data, &AnalysisConfig::default());

    assert!(report.failures.is_empty(), "{:?}", report.failures);

    let consistency = report.fastest_lap_consistency.as_ref().unwrap();
    let observed: Vec<(i64, i64, i64)> = consistency
        .observations
        .iter()
        .map(|row| (row.race_id, row.driver_id, row.position))
        .collect();
    assert_eq!(observed, vec![(1, 1, 1), (2, 2, 2), (3, 2, 1)]);
    assert!(close(consistency.correlation.unwrap(), -0.5));
    assert!(close(
        consistency.position_dispersion[0].lap_std_dispersion.unwrap(),
        500_000f64.sqrt()
    ));
    assert_eq!(consistency.position_dispersion[1].lap_std_dispersion, None);

    let poles = report.qualifying_pole_conversion.as_ref().unwrap();
    let per_driver: Vec<(i64, i64, i64)> = poles
        .drivers
        .iter()
        .map(|row| (row.driver_id, row.poles, row.podiums))
        .collect();
    assert_eq!(per_driver, vec![(1, 2, 4), (2, 2, 4)]);
    assert_eq!(
        format_conversion_average(poles.average_conversion_rate),
        "2.000:1"
    );

    let front_row: Vec<(&str, f64)> = report
        .front_row_conversion
        .as_ref()
        .unwrap()
        .iter()
        .map(|row| (row.label.as_str(), row.ratio))
        .collect();
    assert_eq!(
        front_row,
        vec![("Hamilton", 1.0), ("Rosberg", 1.0), ("Vettel", 2.0)]
    );

    let circuit = report.circuit_duration_deviation.as_ref().unwrap();
    assert_eq!(circuit.races.len(), 3, "race 4 has no laps");
    assert!(close(circuit.races[0].total_race_duration.unwrap(), 1923.0 / 7.0));
    assert!(close(circuit.races[1].total_race_duration.unwrap(), 305.5));
    assert!(close(circuit.races[2].total_race_duration.unwrap(), 267.0));
    assert!(close(circuit.races[0].deviation.unwrap(), 27.0 / 7.0));
    assert!(close(circuit.races[1].deviation.unwrap(), 0.0));
    assert_eq!(circuit.top.len(), 3);
    assert_eq!(circuit.top[2].race_id, 2);

    let global = report.global_lap_time_deviation.as_ref().unwrap();
    assert!(close(global.global_avg_lap_time.unwrap(), 94.34));
    let labels: Vec<&str> = global.races.iter().map(|race| race.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Australian Grand Prix (2009-03-29)",
            "Malaysian Grand Prix (2009-04-05)",
            "Australian Grand Prix (2010-03-28)",
        ]
    );
    assert!(close(global.races[1].deviation, 916.5 / 9.0 - 94.34));

    let prediction = report.position_prediction.as_ref().unwrap();
    assert_eq!(prediction.observations, 9);
    assert!(close(prediction.correlation.unwrap(), 0.45469886172314156));

    let charts = report.charts();
    let slugs: Vec<&str> = charts.iter().map(|chart| chart.slug).collect();
    assert_eq!(
        slugs,
        vec![
            "lap_consistency_by_position",
            "front_row_conversion",
            "lap_time_deviation_per_race"
        ]
    );
    assert_eq!(charts[0].points.len(), 1);
    assert_eq!(charts[1].categories(), vec!["Hamilton", "Rosberg", "Vettel"]);
    assert_eq!(charts[2].points.len(), 3);
    Ok(())
}

#[test]
fn failing_analysis_does_not_stop_the_others() -> Result<()> {
    let dataset = load_dataset(&fixture_dir())?;
    let mut data = enrich(&dataset)?;
    data.qualifying = df!(
        "raceId" => [1i64, 2],
        "driverId" => [1i64, 2],
    )?;

    let report = run_all(&data, &AnalysisConfig::default());

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].question, Question::QualifyingPoleConversion);
    assert!(report.qualifying_pole_conversion.is_none());
    assert!(report.fastest_lap_consistency.is_some());
    assert!(report.front_row_conversion.is_some());
    assert!(report.circuit_duration_deviation.is_some());
    assert!(report.global_lap_time_deviation.is_some());
    assert!(report.position_prediction.is_some());

    let json: serde_json::Value = serde_json::from_str(&report.to_json()?)?;
    assert!(json["qualifying_pole_conversion"].is_null());
    assert_eq!(json["failures"][0]["question"], "qualifying_pole_conversion");
    Ok(())
}

#[test]
fn config_file_overrides_thresholds() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "front_row_cutoff = 1")?;
    writeln!(file, "podium_cutoff = 1")?;
    let config = AnalysisConfig::load(file.path())?;
    assert_eq!(config.front_row_cutoff, 1);
    assert_eq!(config.top_deviation_count, 10);

    let data = enrich(&load_dataset(&fixture_dir())?)?;
    let report = run_all(&data, &config);
    let front_row: Vec<(i64, i64, i64)> = report
        .front_row_conversion
        .unwrap()
        .iter()
        .map(|row| (row.driver_id, row.front_row_starts, row.podium_finishes))
        .collect();
    // grid 1: driver 1 in races 1 and 3, driver 2 in race 2. Wins: driver 1 three, driver 2 one.
    assert_eq!(front_row, vec![(2, 1, 1), (1, 2, 3)]);
    Ok(())
}

#[test]
fn load_enriched_reports_missing_tables_as_parser_errors() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::copy(fixture_dir().join("lap_times.csv"), dir.path().join("lap_times.csv"))?;

    let err = load_enriched(dir.path()).unwrap_err();
    match err {
        AnalysisError::Parser(ParserError::MissingInput { table, path, .. }) => {
            assert_eq!(table, "results");
            assert_eq!(path, dir.path().join("results.csv"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let data = load_enriched(&fixture_dir())?;
    assert_eq!(data.lap_times.height(), 25);
    assert!(data.lap_times.column("seconds").is_ok());
    Ok(())
}
