//! Run configuration: the tunables the engine exposes, plus TOML file
//! support for reproducible backtests.

use crate::backtest::RebalancePeriod;
use crate::error::{BacktestError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Weight bounds and estimation tunables passed into every strategy call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptimizerOptions {
    /// Per-asset lower weight bound.
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,
    /// Per-asset upper weight bound.
    #[serde(default = "default_max_weight")]
    pub max_weight: f64,
    /// Minimum L1 weight change required before a rebalance is applied.
    #[serde(default = "default_turnover_constraint")]
    pub turnover_constraint: f64,
    /// Covariance lookback window in trading days.
    #[serde(default = "default_back")]
    pub back: usize,
}

fn default_min_weight() -> f64 {
    0.05
}
fn default_max_weight() -> f64 {
    0.80
}
fn default_turnover_constraint() -> f64 {
    0.10
}
fn default_back() -> usize {
    60
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            min_weight: default_min_weight(),
            max_weight: default_max_weight(),
            turnover_constraint: default_turnover_constraint(),
            back: default_back(),
        }
    }
}

impl OptimizerOptions {
    /// Check the bounds for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_weight) || !(0.0..=1.0).contains(&self.max_weight) {
            return Err(BacktestError::ConfigError(format!(
                "weight bounds must lie in [0, 1], got [{}, {}]",
                self.min_weight, self.max_weight
            )));
        }
        if self.min_weight > self.max_weight {
            return Err(BacktestError::ConfigError(format!(
                "min_weight {} exceeds max_weight {}",
                self.min_weight, self.max_weight
            )));
        }
        if self.back == 0 {
            return Err(BacktestError::ConfigError(
                "lookback window must be at least one day".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which weighting strategy a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    MinimumVariance,
    RiskParity,
    Blended,
    MaximumSharpe,
    Manual,
}

/// A single asset entry in a run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetEntry {
    /// JSON file holding the collaborator's `{symbol, name, days,
    /// dailyReturns}` payload.
    pub file: String,
    /// Expected-return model tag, e.g. `SH000300.pe`, `5y.cnbond`,
    /// `SH510880.history` or `0.history`.
    #[serde(default)]
    pub model: Option<String>,
    /// CSV series backing the model when it needs one (PE ratios or
    /// percentage yields as `day,value` rows).
    #[serde(default)]
    pub model_file: Option<String>,
    /// Fixed weight, used by the manual strategy.
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Complete backtest run configuration, loadable from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default)]
    pub period: RebalancePeriod,
    #[serde(default)]
    pub options: OptimizerOptions,
    /// Blend coefficient for the blended strategy.
    #[serde(default = "default_ratio")]
    pub ratio: f64,
    /// Seed for the learning-rate perturbation of the gradient-descent
    /// strategies; unseeded runs draw from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// JSON file for the benchmark asset.
    pub benchmark: String,
    #[serde(default)]
    pub assets: Vec<AssetEntry>,
    /// Drop trading days before this ISO date.
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub show_progress: bool,
}

fn default_ratio() -> f64 {
    0.05
}

impl RunConfig {
    /// Load a run configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: RunConfig = toml::from_str(&text)?;
        config.validate()?;
        info!("loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.options.validate()?;
        if !(0.0..=1.0).contains(&self.ratio) {
            return Err(BacktestError::ConfigError(format!(
                "blend ratio must lie in [0, 1], got {}",
                self.ratio
            )));
        }
        if self.assets.is_empty() {
            return Err(BacktestError::ConfigError(
                "at least one asset entry is required".to_string(),
            ));
        }
        Ok(())
    }
}
