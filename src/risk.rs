//! Portfolio risk decomposition.
//!
//! Total risk is annualized portfolio volatility; each asset's marginal
//! contribution follows the Euler decomposition of the (homogeneous degree
//! one) risk function, so the contributions sum exactly to the total.

use crate::stats::{covariance, TRADING_DAYS_PER_YEAR};
use crate::types::AssetInfo;
use serde::{Deserialize, Serialize};

/// Total annualized portfolio risk plus per-asset signed contributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub total_risk: f64,
    pub risks: Vec<f64>,
}

/// Decompose portfolio risk for a weight vector under a covariance matrix of
/// per-period returns.
pub fn risk_model(weights: &[f64], cov: &[Vec<f64>]) -> RiskAnalysis {
    let exposure: Vec<f64> = cov
        .iter()
        .map(|row| row.iter().zip(weights).map(|(c, w)| c * w).sum())
        .collect();
    let variance: f64 = weights.iter().zip(&exposure).map(|(w, e)| w * e).sum();
    let total_risk = variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt();

    let risks = weights
        .iter()
        .zip(&exposure)
        .map(|(w, e)| total_risk * w * e / variance)
        .collect();

    RiskAnalysis { total_risk, risks }
}

/// Risk decomposition from each asset's trailing `back` daily returns (all
/// available history when shorter).
pub fn historical_risk_model(weights: &[f64], assets: &[AssetInfo], back: usize) -> RiskAnalysis {
    let history: Vec<Vec<f64>> = assets
        .iter()
        .map(|a| {
            let start = a.daily_returns.len().saturating_sub(back);
            a.daily_returns[start..].to_vec()
        })
        .collect();
    risk_model(weights, &covariance(&history))
}
