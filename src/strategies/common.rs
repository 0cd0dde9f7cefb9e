//! Shared plumbing for weighting strategies.

use super::BOOTSTRAP_DAYS;
use crate::error::{BacktestError, Result};
use crate::stats::covariance;
use crate::types::AssetInfo;

pub(super) fn equal_weights(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Locate `day` on the calendar shared by the aligned assets, or report
/// equal weights directly when the day is still inside the bootstrap window.
pub(super) fn bootstrap_or_index(assets: &[AssetInfo], day: &str) -> Result<BootstrapOrIndex> {
    let first = assets.first().ok_or(BacktestError::NoData)?;
    let index = first.day_index(day).ok_or_else(|| {
        BacktestError::InvalidInput(format!("day {day} is not on the asset calendar"))
    })?;
    if index < BOOTSTRAP_DAYS {
        Ok(BootstrapOrIndex::Bootstrap(equal_weights(assets.len())))
    } else {
        Ok(BootstrapOrIndex::Index(index))
    }
}

pub(super) enum BootstrapOrIndex {
    Bootstrap(Vec<f64>),
    Index(usize),
}

/// Sample covariance of each asset's trailing `back` returns ending just
/// before `day_index`; the as-of day itself never enters the estimate.
pub(super) fn lookback_covariance(
    assets: &[AssetInfo],
    day_index: usize,
    back: usize,
) -> Vec<Vec<f64>> {
    let start = day_index.saturating_sub(back);
    let history: Vec<Vec<f64>> = assets
        .iter()
        .map(|a| a.daily_returns[start..day_index].to_vec())
        .collect();
    covariance(&history)
}

/// Round weights to whole percents, absorbing the rounding residual into
/// the smallest component so the vector still sums to exactly 1.0.
pub fn round_weights(weights: &[f64]) -> Vec<f64> {
    if weights.is_empty() {
        return Vec::new();
    }
    let mut min = 0;
    for (i, w) in weights.iter().enumerate() {
        if *w < weights[min] {
            min = i;
        }
    }
    let mut rounded: Vec<f64> = weights.iter().map(|w| (w * 100.0).round() / 100.0).collect();
    let sum: f64 = rounded.iter().sum();
    rounded[min] -= sum - 1.0;
    rounded
}
