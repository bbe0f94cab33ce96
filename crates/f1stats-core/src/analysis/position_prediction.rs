use serde::Serialize;
use tracing::{info, warn};

use crate::enrich::EnrichedData;
use crate::error::Result;
use crate::stats;

#[derive(Debug, Clone, Serialize)]
pub struct PositionPrediction {
    /// Results with a defined historical average, i.e. a driver's second race onwards.
    pub observations: usize,
    pub correlation: Option<f64>,
}

/// Correlates each finishing position with the driver's mean finishing position over earlier
/// races.
pub fn position_prediction(data: &EnrichedData) -> Result<PositionPrediction> {
    let history = &data.historical_positions;
    let positions = history.column("positionOrder")?.i64()?;
    let averages = history.column("historical_avg_position")?.f64()?;

    let mut actual = Vec::with_capacity(history.height());
    let mut predicted = Vec::with_capacity(history.height());
    for idx in 0..history.height() {
        if let (Some(position), Some(average)) = (positions.get(idx), averages.get(idx)) {
            actual.push(position as f64);
            predicted.push(average);
        }
    }

    let correlation = stats::pearson(&actual, &predicted);
    if correlation.is_none() {
        warn!(observations = actual.len(), "position prediction correlation is undefined");
    }
    info!(
        observations = actual.len(),
        correlation = ?correlation,
        "computed historical position prediction"
    );

    Ok(PositionPrediction {
        observations: actual.len(),
        correlation,
    })
}
