//! Fixed, user-specified weights.

use super::WeightStrategy;
use crate::error::{BacktestError, Result};
use crate::types::AssetInfo;

/// Returns the same user-chosen allocation on every rebalance day. With the
/// turnover gate in front of it, this behaves as periodic rebalancing back
/// to a fixed target mix.
pub struct ManualWeights {
    weights: Vec<f64>,
}

impl ManualWeights {
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }
}

impl WeightStrategy for ManualWeights {
    fn name(&self) -> &str {
        "Manual"
    }

    fn weights_for(&mut self, assets: &[AssetInfo], _day: &str) -> Result<Vec<f64>> {
        if self.weights.len() != assets.len() {
            return Err(BacktestError::InvalidInput(format!(
                "{} manual weights for {} assets",
                self.weights.len(),
                assets.len()
            )));
        }
        Ok(self.weights.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReturnSeries;

    #[test]
    fn test_returns_the_configured_weights() {
        let days: Vec<String> = (1..=5).map(|i| format!("2024-01-{i:02}")).collect();
        let assets: Vec<AssetInfo> = ["A", "B"]
            .iter()
            .map(|s| {
                AssetInfo::new(
                    *s,
                    *s,
                    ReturnSeries::new(days.clone(), vec![0.01; 5]).unwrap(),
                )
            })
            .collect();

        let mut strategy = ManualWeights::new(vec![0.6, 0.4]);
        assert_eq!(
            strategy.weights_for(&assets, "2024-01-03").unwrap(),
            vec![0.6, 0.4]
        );

        let mut wrong_arity = ManualWeights::new(vec![1.0]);
        assert!(wrong_arity.weights_for(&assets, "2024-01-03").is_err());
    }
}
