//! Blended risk-parity / minimum-total-risk weighting.

use super::common::{bootstrap_or_index, lookback_covariance, round_weights, BootstrapOrIndex};
use super::risk_parity::risk_parity_objective;
use super::WeightStrategy;
use crate::config::OptimizerOptions;
use crate::error::{BacktestError, Result};
use crate::gradient::{gradient_descent, GdOptions};
use crate::risk::risk_model;
use crate::types::AssetInfo;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Weighted combination of the risk-parity objective and total portfolio
/// risk: `ratio` pulls toward equal risk contributions, the remainder
/// toward outright risk minimization.
pub struct BlendedRiskParityMinVariance {
    options: OptimizerOptions,
    ratio: f64,
    gd: GdOptions,
    rng: StdRng,
}

impl BlendedRiskParityMinVariance {
    pub fn new(options: OptimizerOptions, ratio: f64) -> Result<Self> {
        Self::with_rng(options, ratio, StdRng::from_entropy())
    }

    /// Deterministic variant for reproducible runs.
    pub fn with_seed(options: OptimizerOptions, ratio: f64, seed: u64) -> Result<Self> {
        Self::with_rng(options, ratio, StdRng::seed_from_u64(seed))
    }

    fn with_rng(options: OptimizerOptions, ratio: f64, rng: StdRng) -> Result<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(BacktestError::ConfigError(format!(
                "blend ratio must be within [0, 1], got {ratio}"
            )));
        }
        let gd = GdOptions {
            min_iterate: 200,
            learning_rate: 0.01,
            min_weight: options.min_weight,
            max_weight: options.max_weight,
            ..GdOptions::default()
        };
        Ok(Self {
            options,
            ratio,
            gd,
            rng,
        })
    }
}

impl WeightStrategy for BlendedRiskParityMinVariance {
    fn name(&self) -> &str {
        "Blended Risk Parity / Minimum Variance"
    }

    fn weights_for(&mut self, assets: &[AssetInfo], day: &str) -> Result<Vec<f64>> {
        let index = match bootstrap_or_index(assets, day)? {
            BootstrapOrIndex::Bootstrap(weights) => return Ok(weights),
            BootstrapOrIndex::Index(index) => index,
        };
        let cov = lookback_covariance(assets, index, self.options.back);
        let ratio = self.ratio;
        let objective = move |w: &[f64], cov: &[Vec<f64>]| {
            ratio * risk_parity_objective(w, cov) + (1.0 - ratio) * risk_model(w, cov).total_risk
        };
        let weights = gradient_descent(&cov, objective, &self.gd, &mut self.rng);
        Ok(round_weights(&weights))
    }
}
