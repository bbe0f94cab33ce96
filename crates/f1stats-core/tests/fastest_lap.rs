mod common;

use common::{close, empty_dataset, lap_times, positions};
use f1stats_core::analysis::{fastest_lap_consistency, ConsistencyObservation};
use f1stats_core::{enrich, AnalysisConfig};

#[test]
fn one_row_per_fastest_lap_holder_with_undefined_buckets() {
    let mut dataset = empty_dataset();
    // Driver 1 (A) sets race 1's fastest lap with identical laps; driver 2 (B) sets race 2's
    // with varied laps.
    dataset.lap_times = lap_times(&[
        (1, 1, 1, 80000),
        (1, 1, 2, 80000),
        (1, 2, 1, 82000),
        (1, 2, 2, 84000),
        (2, 1, 1, 83000),
        (2, 1, 2, 83000),
        (2, 2, 1, 79000),
        (2, 2, 2, 81000),
        (2, 2, 3, 86000),
    ]);
    dataset.driver_standings = positions(&[
        (1, 1, Some(1)),
        (1, 2, Some(5)),
        (2, 1, Some(1)),
        (2, 2, Some(5)),
    ]);

    let data = enrich(&dataset).unwrap();
    let outcome = fastest_lap_consistency(&data, &AnalysisConfig::default()).unwrap();

    assert_eq!(outcome.observations.len(), 2);
    assert_eq!(outcome.single_lap_holders, 0);
    assert_eq!(
        outcome.observations[0],
        ConsistencyObservation {
            race_id: 1,
            driver_id: 1,
            lap_std_ms: 0.0,
            position: 1,
        }
    );
    assert_eq!(outcome.observations[1].driver_id, 2);
    assert_eq!(outcome.observations[1].position, 5);
    assert!(outcome.observations[1].lap_std_ms > 0.0);

    assert_eq!(outcome.position_dispersion.len(), 2);
    assert!(outcome
        .position_dispersion
        .iter()
        .all(|bucket| bucket.observations == 1 && bucket.lap_std_dispersion.is_none()));

    // Two points always correlate perfectly.
    assert!(close(outcome.correlation.unwrap(), 1.0));
}

#[test]
fn positions_outside_range_and_undefined_dispersion_are_dropped() {
    let mut dataset = empty_dataset();
    dataset.lap_times = lap_times(&[
        // race 1: fastest is driver 3 with a single lap
        (1, 3, 1, 70000),
        (1, 4, 1, 75000),
        (1, 4, 2, 76000),
        // race 2: fastest is driver 4, standing position 22
        (2, 4, 1, 70000),
        (2, 4, 2, 72000),
        // race 3: fastest is driver 5 without a standing row
        (3, 5, 1, 70000),
        (3, 5, 2, 71000),
        // race 4: fastest is driver 6, kept
        (4, 6, 1, 70000),
        (4, 6, 2, 73000),
    ]);
    dataset.driver_standings = positions(&[
        (1, 3, Some(2)),
        (2, 4, Some(22)),
        (4, 6, Some(3)),
    ]);

    let data = enrich(&dataset).unwrap();
    let outcome = fastest_lap_consistency(&data, &AnalysisConfig::default()).unwrap();

    assert_eq!(outcome.observations.len(), 1);
    assert_eq!(outcome.observations[0].race_id, 4);
    assert_eq!(outcome.correlation, None);
    // race 1's holder has one lap; races 2 and 3 fall outside the standing filter first
    assert_eq!(outcome.single_lap_holders, 1);

    let widened = AnalysisConfig {
        max_standing_position: 30,
        ..AnalysisConfig::default()
    };
    let outcome = fastest_lap_consistency(&data, &widened).unwrap();
    assert_eq!(outcome.observations.len(), 2);
    assert_eq!(outcome.single_lap_holders, 1);
}

#[test]
fn dispersion_within_shared_position() {
    let mut dataset = empty_dataset();
    dataset.lap_times = lap_times(&[
        (1, 1, 1, 89000),
        (1, 1, 2, 90000),
        (1, 1, 3, 91000),
        (2, 1, 1, 87000),
        (2, 1, 2, 89000),
        (2, 1, 3, 91000),
        (3, 2, 1, 99500),
        (3, 2, 2, 100500),
        (3, 2, 3, 101500),
    ]);
    dataset.driver_standings = positions(&[(1, 1, Some(1)), (2, 1, Some(1)), (3, 2, Some(2))]);

    let data = enrich(&dataset).unwrap();
    let outcome = fastest_lap_consistency(&data, &AnalysisConfig::default()).unwrap();

    // lap deviations 1000, 2000 at position 1 and 1000 at position 2
    assert!(close(outcome.correlation.unwrap(), -0.5));
    let first = &outcome.position_dispersion[0];
    assert_eq!((first.position, first.observations), (1, 2));
    assert!(close(first.lap_std_dispersion.unwrap(), 500_000f64.sqrt()));
    assert_eq!(outcome.position_dispersion[1].lap_std_dispersion, None);
}
