//! Folio - a backtesting engine for portfolio allocation strategies.
//!
//! # Overview
//!
//! Folio evaluates weighting strategies against historical daily-return
//! series. Given a set of tradable assets and a strategy, it simulates a
//! multi-year trading history with periodic, turnover-gated rebalancing and
//! produces performance, risk-decomposition and holdings-over-time output:
//!
//! - **Series alignment**: heterogeneous calendars merged onto one index,
//!   gaps zero-filled, trimmed to the shared window
//! - **Four optimization strategies**: minimum variance (exact quadratic
//!   program), risk parity, a blended objective, and maximum Sharpe (both
//!   via seeded gradient descent), plus fixed manual weights
//! - **Risk decomposition**: total annualized risk with per-asset marginal
//!   contributions that sum exactly to the total
//! - **Expected-return models**: PE-derived yield, fixed-coupon proxy, and
//!   historical-average inputs for the maximum-Sharpe objective
//!
//! # Quick Start
//!
//! ```no_run
//! use folio::backtest::{BacktestEngine, RebalancePeriod};
//! use folio::config::OptimizerOptions;
//! use folio::data::load_asset_json;
//! use folio::strategies::MinimumVariance;
//!
//! let assets = vec![
//!     load_asset_json("data/bonds.json").unwrap(),
//!     load_asset_json("data/gold.json").unwrap(),
//!     load_asset_json("data/dividend.json").unwrap(),
//! ];
//! let benchmark = load_asset_json("data/cash.json").unwrap();
//!
//! let options = OptimizerOptions::default();
//! let mut strategy = MinimumVariance::new(options);
//! let engine = BacktestEngine::new(options, RebalancePeriod::SemiAnnually);
//!
//! let result = engine.run(&assets, &benchmark, &mut strategy).unwrap();
//! println!("annualized: {:.2}%", result.portfolio.annualized * 100.0);
//! println!("sharpe: {:.2}", result.portfolio.sharpe);
//! ```
//!
//! # Custom Strategies
//!
//! Implement the [`strategies::WeightStrategy`] trait to plug in your own
//! allocation logic:
//!
//! ```
//! use folio::strategies::WeightStrategy;
//! use folio::types::AssetInfo;
//! use folio::Result;
//!
//! struct EqualWeight;
//!
//! impl WeightStrategy for EqualWeight {
//!     fn name(&self) -> &str {
//!         "Equal Weight"
//!     }
//!
//!     fn weights_for(&mut self, assets: &[AssetInfo], _day: &str) -> Result<Vec<f64>> {
//!         Ok(vec![1.0 / assets.len() as f64; assets.len()])
//!     }
//! }
//! ```
//!
//! # Modules
//!
//! - [`types`]: core data types ([`ReturnSeries`], [`AssetInfo`])
//! - [`align`]: multi-series calendar alignment
//! - [`stats`]: compounding, annualization, Sharpe, volatility, covariance
//! - [`risk`]: portfolio risk decomposition
//! - [`gradient`]: the shared gradient-descent optimizer core
//! - [`strategies`]: the interchangeable weighting strategies
//! - [`backtest`]: the rebalancing simulation engine
//! - [`expected`]: expected-return models
//! - [`data`]: JSON/CSV loading of the data collaborator's output
//! - [`config`]: TOML run configuration
//! - [`cli`]: the command-line runner

pub mod align;
pub mod backtest;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod expected;
pub mod gradient;
pub mod risk;
pub mod stats;
pub mod strategies;
pub mod types;

// Re-exports for convenience
pub use align::{align_assets, align_returns, slice_assets};
pub use backtest::{BacktestEngine, BacktestResult, Performance, RebalancePeriod};
pub use config::{OptimizerOptions, RunConfig, StrategyKind};
pub use error::{BacktestError, Result};
pub use risk::{historical_risk_model, risk_model, RiskAnalysis};
pub use strategies::{
    round_weights, BlendedRiskParityMinVariance, ManualWeights, MaximumSharpe, MinimumVariance,
    RiskParity, WeightStrategy,
};
pub use types::{AssetInfo, ReturnSeries};
