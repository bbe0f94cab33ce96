#![allow(dead_code)]

use std::path::PathBuf;

use f1stats_parser::F1Dataset;
use polars::prelude::*;

pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../f1stats-parser/tests/data")
}

pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// (raceId, driverId, lap, milliseconds)
pub fn lap_times(rows: &[(i64, i64, i64, i64)]) -> DataFrame {
    df!(
        "raceId" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "driverId" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        "lap" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
        "milliseconds" => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
    )
    .unwrap()
}

/// (raceId, driverId, grid, positionOrder)
pub fn results(rows: &[(i64, i64, Option<i64>, i64)]) -> DataFrame {
    df!(
        "raceId" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "driverId" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        "grid" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
        "positionOrder" => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
    )
    .unwrap()
}

/// (raceId, driverId, position); also the qualifying layout.
pub fn positions(rows: &[(i64, i64, Option<i64>)]) -> DataFrame {
    df!(
        "raceId" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "driverId" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        "position" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
    )
    .unwrap()
}

/// (driverId, surname)
pub fn drivers(rows: &[(i64, &str)]) -> DataFrame {
    df!(
        "driverId" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "surname" => rows.iter().map(|r| Some(r.1)).collect::<Vec<_>>(),
    )
    .unwrap()
}

/// (raceId, name, date, circuitId)
pub fn races(rows: &[(i64, &str, &str, i64)]) -> DataFrame {
    df!(
        "raceId" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "name" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        "date" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
        "circuitId" => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
    )
    .unwrap()
}

pub fn empty_dataset() -> F1Dataset {
    F1Dataset {
        lap_times: lap_times(&[]),
        results: results(&[]),
        driver_standings: positions(&[]),
        drivers: drivers(&[]),
        races: races(&[]),
        qualifying: positions(&[]),
    }
}
