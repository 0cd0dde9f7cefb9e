//! Risk-parity weighting via gradient descent.

use super::common::{bootstrap_or_index, lookback_covariance, round_weights, BootstrapOrIndex};
use super::WeightStrategy;
use crate::config::OptimizerOptions;
use crate::error::Result;
use crate::gradient::{gradient_descent, GdOptions};
use crate::risk::risk_model;
use crate::types::AssetInfo;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Sum of squared pairwise differences between risk-contribution shares;
/// zero exactly when every asset contributes the same share of total risk.
pub(super) fn risk_parity_objective(weights: &[f64], cov: &[Vec<f64>]) -> f64 {
    let analysis = risk_model(weights, cov);
    let contributions: Vec<f64> = analysis
        .risks
        .iter()
        .map(|r| r / analysis.total_risk)
        .collect();
    contributions
        .iter()
        .map(|ci| {
            contributions
                .iter()
                .map(|cj| (ci - cj) * (ci - cj))
                .sum::<f64>()
        })
        .sum()
}

/// Drives every asset toward an equal share of portfolio risk.
pub struct RiskParity {
    options: OptimizerOptions,
    gd: GdOptions,
    rng: StdRng,
}

impl RiskParity {
    pub fn new(options: OptimizerOptions) -> Self {
        Self::with_rng(options, StdRng::from_entropy())
    }

    /// Deterministic variant for reproducible runs.
    pub fn with_seed(options: OptimizerOptions, seed: u64) -> Self {
        Self::with_rng(options, StdRng::seed_from_u64(seed))
    }

    fn with_rng(options: OptimizerOptions, rng: StdRng) -> Self {
        let gd = GdOptions {
            min_weight: options.min_weight,
            max_weight: options.max_weight,
            ..GdOptions::default()
        };
        Self { options, gd, rng }
    }
}

impl WeightStrategy for RiskParity {
    fn name(&self) -> &str {
        "Risk Parity"
    }

    fn weights_for(&mut self, assets: &[AssetInfo], day: &str) -> Result<Vec<f64>> {
        let index = match bootstrap_or_index(assets, day)? {
            BootstrapOrIndex::Bootstrap(weights) => return Ok(weights),
            BootstrapOrIndex::Index(index) => index,
        };
        let cov = lookback_covariance(assets, index, self.options.back);
        let weights = gradient_descent(&cov, risk_parity_objective, &self.gd, &mut self.rng);
        Ok(round_weights(&weights))
    }
}
