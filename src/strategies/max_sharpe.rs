//! Maximum-Sharpe weighting via gradient descent.

use super::common::{bootstrap_or_index, lookback_covariance, round_weights, BootstrapOrIndex};
use super::WeightStrategy;
use crate::config::OptimizerOptions;
use crate::error::{BacktestError, Result};
use crate::gradient::{gradient_descent, GdOptions};
use crate::risk::risk_model;
use crate::types::AssetInfo;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Maximizes expected portfolio return per unit of risk. Requires every
/// asset to carry a model-implied expected-return series; the expectation as
/// of the rebalance day feeds the objective.
pub struct MaximumSharpe {
    options: OptimizerOptions,
    gd: GdOptions,
    rng: StdRng,
}

impl MaximumSharpe {
    pub fn new(options: OptimizerOptions) -> Self {
        Self::with_rng(options, StdRng::from_entropy())
    }

    /// Deterministic variant for reproducible runs.
    pub fn with_seed(options: OptimizerOptions, seed: u64) -> Self {
        Self::with_rng(options, StdRng::seed_from_u64(seed))
    }

    fn with_rng(options: OptimizerOptions, rng: StdRng) -> Self {
        let gd = GdOptions {
            min_iterate: 200,
            learning_rate: 0.03,
            tolerance: 5e-5,
            min_weight: options.min_weight,
            max_weight: options.max_weight,
            ..GdOptions::default()
        };
        Self { options, gd, rng }
    }
}

impl WeightStrategy for MaximumSharpe {
    fn name(&self) -> &str {
        "Maximum Sharpe"
    }

    fn weights_for(&mut self, assets: &[AssetInfo], day: &str) -> Result<Vec<f64>> {
        let index = match bootstrap_or_index(assets, day)? {
            BootstrapOrIndex::Bootstrap(weights) => return Ok(weights),
            BootstrapOrIndex::Index(index) => index,
        };

        let expected = assets
            .iter()
            .map(|a| {
                a.expected
                    .as_ref()
                    .and_then(|e| e.get(index).copied())
                    .ok_or_else(|| {
                        BacktestError::InvalidInput(format!(
                            "asset {} has no expected-return series at {day}",
                            a.symbol
                        ))
                    })
            })
            .collect::<Result<Vec<f64>>>()?;

        let cov = lookback_covariance(assets, index, self.options.back);
        // Negated ratio: the optimizer minimizes.
        let objective = move |w: &[f64], cov: &[Vec<f64>]| {
            let portfolio_return: f64 = w.iter().zip(&expected).map(|(wi, ei)| wi * ei).sum();
            -portfolio_return / risk_model(w, cov).total_risk
        };
        let weights = gradient_descent(&cov, objective, &self.gd, &mut self.rng);
        Ok(round_weights(&weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReturnSeries;

    fn asset(symbol: &str, returns: Vec<f64>, expected: Option<f64>) -> AssetInfo {
        let days: Vec<String> = (0..returns.len())
            .map(|i| format!("2024-{:02}-{:02}", i / 28 + 1, i % 28 + 1))
            .collect();
        let n = returns.len();
        let info = AssetInfo::new(symbol, symbol, ReturnSeries::new(days, returns).unwrap());
        match expected {
            Some(e) => info.with_expected(vec![e; n]),
            None => info,
        }
    }

    fn alternating(amplitude: f64, period_two: bool, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let sign = if period_two {
                    if i % 2 == 0 { 1.0 } else { -1.0 }
                } else if (i / 2) % 2 == 0 {
                    1.0
                } else {
                    -1.0
                };
                amplitude * sign
            })
            .collect()
    }

    #[test]
    fn test_missing_expected_series_is_rejected() {
        let assets = vec![
            asset("A", alternating(0.01, true, 40), Some(0.0004)),
            asset("B", alternating(0.01, false, 40), None),
        ];
        let mut strategy = MaximumSharpe::with_seed(OptimizerOptions::default(), 5);
        let day = assets[0].days[30].clone();
        assert!(matches!(
            strategy.weights_for(&assets, &day),
            Err(BacktestError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_favors_the_higher_expectation_at_equal_risk() {
        // Same volatility, uncorrelated, but one asset promises five times
        // the forward return.
        let assets = vec![
            asset("LOW", alternating(0.01, true, 80), Some(0.0001)),
            asset("HIGH", alternating(0.01, false, 80), Some(0.0005)),
        ];
        let options = OptimizerOptions {
            min_weight: 0.0,
            max_weight: 1.0,
            back: 60,
            ..OptimizerOptions::default()
        };
        let mut strategy = MaximumSharpe::with_seed(options, 5);
        let day = assets[0].days[75].clone();
        let weights = strategy.weights_for(&assets, &day).unwrap();

        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(weights[1] > weights[0], "weights: {weights:?}");
    }

    #[test]
    fn test_bootstrap_ignores_expectations() {
        let assets = vec![
            asset("A", vec![0.01; 30], Some(0.001)),
            asset("B", vec![0.01; 30], Some(0.0001)),
        ];
        let mut strategy = MaximumSharpe::with_seed(OptimizerOptions::default(), 5);
        let day = assets[0].days[2].clone();
        assert_eq!(strategy.weights_for(&assets, &day).unwrap(), vec![0.5, 0.5]);
    }
}
