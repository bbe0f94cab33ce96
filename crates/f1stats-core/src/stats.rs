//! Descriptive statistics with an explicit "undefined" result.
//!
//! statrs reports undersized samples as `NaN`. Every helper here turns that into `None` so an
//! undefined statistic is dropped by the caller instead of leaking into an aggregate.

use statrs::statistics::Statistics;

fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Arithmetic mean; `None` for an empty sample.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    defined(values.iter().mean())
}

/// Sample standard deviation (N−1 denominator); `None` with fewer than two observations.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    defined(values.iter().std_dev())
}

/// Pearson correlation coefficient.
///
/// `None` when the samples differ in length, hold fewer than two pairs, or either side has
/// zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let sd_x = sample_std_dev(xs)?;
    let sd_y = sample_std_dev(ys)?;
    if sd_x == 0.0 || sd_y == 0.0 {
        return None;
    }

    let covariance = xs.iter().covariance(ys.iter());
    defined(covariance / (sd_x * sd_y)).map(|r| r.clamp(-1.0, 1.0))
}
