//! The rebalancing simulation engine.
//!
//! One pass over the aligned trading calendar: realize the day's portfolio
//! return under the carried weights, periodically ask the strategy for a new
//! allocation, apply it only when the turnover clears the configured gate,
//! and otherwise let weights drift with the assets. The first twenty days
//! exist solely to give the strategy lookback on day zero and are dropped
//! from the reported output.

use crate::align::align_assets;
use crate::config::OptimizerOptions;
use crate::error::{BacktestError, Result};
use crate::risk::{historical_risk_model, RiskAnalysis};
use crate::stats;
use crate::strategies::{WeightStrategy, BOOTSTRAP_DAYS};
use crate::types::AssetInfo;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How often the engine re-runs the weighting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalancePeriod {
    Quarterly,
    #[default]
    SemiAnnually,
    Annually,
}

impl RebalancePeriod {
    /// Approximate length of the period in trading days.
    pub fn trading_days(&self) -> usize {
        match self {
            RebalancePeriod::Quarterly => 53,
            RebalancePeriod::SemiAnnually => 126,
            RebalancePeriod::Annually => 252,
        }
    }
}

/// Derived performance record for a daily-return series, cached once per
/// run. All figures are fractions, not percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub days: Vec<String>,
    pub daily_returns: Vec<f64>,
    pub accumulative_returns: Vec<f64>,
    pub annualized: f64,
    pub sharpe: f64,
    pub volatility: f64,
}

impl Performance {
    /// Compute the record for a return series.
    pub fn from_returns(days: Vec<String>, daily_returns: Vec<f64>) -> Self {
        let accumulative_returns = stats::cumulative(&daily_returns);
        let annualized = stats::annualize(&daily_returns);
        let sharpe = stats::sharpe(&daily_returns);
        let volatility = stats::volatility(&daily_returns);
        Self {
            days,
            daily_returns,
            accumulative_returns,
            annualized,
            sharpe,
            volatility,
        }
    }
}

/// Full output of a backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    /// Reported trading calendar (post warm-up).
    pub days: Vec<String>,
    /// The aligned, trimmed assets the simulation traded.
    pub assets: Vec<AssetInfo>,
    /// Weight vector held on each reported day.
    pub holdings: Vec<Vec<f64>>,
    /// Traded portfolio performance.
    pub portfolio: Performance,
    pub benchmark_name: String,
    /// The benchmark's own compounded record; never traded.
    pub benchmark: Performance,
    /// Strategy weights as of the final day.
    pub latest: Vec<f64>,
    /// Risk decomposition of the final weights.
    pub risk: RiskAnalysis,
}

/// The backtest engine.
pub struct BacktestEngine {
    options: OptimizerOptions,
    period: RebalancePeriod,
    show_progress: bool,
}

impl BacktestEngine {
    /// Create an engine with the given tunables.
    pub fn new(options: OptimizerOptions, period: RebalancePeriod) -> Self {
        Self {
            options,
            period,
            show_progress: false,
        }
    }

    /// Toggle the simulation progress bar.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Simulate the strategy over the assets' shared history.
    ///
    /// A strategy failure on any rebalance day aborts the run: the weight
    /// state for subsequent days would be undefined.
    pub fn run(
        &self,
        assets: &[AssetInfo],
        benchmark: &AssetInfo,
        strategy: &mut dyn WeightStrategy,
    ) -> Result<BacktestResult> {
        self.options.validate()?;
        if assets.is_empty() {
            return Err(BacktestError::NoData);
        }

        let mut material: Vec<AssetInfo> = Vec::with_capacity(assets.len() + 1);
        material.push(benchmark.clone());
        material.extend(assets.iter().cloned());
        let mut aligned = align_assets(&material)?;
        let benchmark = aligned.remove(0);
        let assets = aligned;

        let days = benchmark.days.clone();
        if days.len() <= BOOTSTRAP_DAYS {
            return Err(BacktestError::InsufficientHistory(format!(
                "{} overlapping trading days, need more than {}",
                days.len(),
                BOOTSTRAP_DAYS
            )));
        }

        info!(
            "running backtest: {} over {} assets, {} trading days",
            strategy.name(),
            assets.len(),
            days.len()
        );

        let progress = if self.show_progress {
            let pb = ProgressBar::new(days.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let period_days = self.period.trading_days();
        let mut last_weight = vec![0.0; assets.len()];
        let mut returns = Vec::with_capacity(days.len());
        let mut holdings = Vec::with_capacity(days.len());

        for (i, day) in days.iter().enumerate() {
            let day_return: f64 = last_weight
                .iter()
                .enumerate()
                .map(|(j, w)| w * assets[j].daily_returns[i])
                .sum();
            returns.push(day_return);

            let mut accepted = None;
            if i == 0 || i == BOOTSTRAP_DAYS || i % period_days == 0 {
                let proposed = strategy.weights_for(&assets, day)?;
                let turnover: f64 = proposed
                    .iter()
                    .zip(&last_weight)
                    .map(|(p, w)| (p - w).abs())
                    .sum();
                if turnover > self.options.turnover_constraint {
                    debug!("rebalance at {}: turnover {:.4}", day, turnover);
                    accepted = Some(proposed);
                } else {
                    debug!(
                        "skipping rebalance at {}: turnover {:.4} under constraint",
                        day, turnover
                    );
                }
            }

            let new_holding = accepted.unwrap_or_else(|| {
                last_weight
                    .iter()
                    .enumerate()
                    .map(|(j, w)| (1.0 + assets[j].daily_returns[i]) * w / (1.0 + day_return))
                    .collect()
            });

            last_weight.clone_from(&new_holding);
            holdings.push(new_holding);

            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        // Where the allocation stands today, turnover gate not applied.
        let latest = strategy.weights_for(&assets, days.last().unwrap())?;
        let risk = historical_risk_model(&latest, &assets, self.options.back);

        // Warm-up days are not reported performance; the first reported
        // return is a synthetic zero baseline for both records.
        let days = days[BOOTSTRAP_DAYS..].to_vec();
        let holdings = holdings[BOOTSTRAP_DAYS..].to_vec();
        let mut returns = returns[BOOTSTRAP_DAYS..].to_vec();
        returns[0] = 0.0;
        let mut benchmark_returns = benchmark.daily_returns[BOOTSTRAP_DAYS..].to_vec();
        benchmark_returns[0] = 0.0;

        let assets: Vec<AssetInfo> = assets
            .into_iter()
            .map(|a| a.truncated(BOOTSTRAP_DAYS))
            .collect();

        let portfolio = Performance::from_returns(days.clone(), returns);
        let benchmark_performance = Performance::from_returns(days.clone(), benchmark_returns);

        info!(
            "backtest complete: {:.2}% annualized, {:.2}% volatility, {:.2} sharpe",
            portfolio.annualized * 100.0,
            portfolio.volatility * 100.0,
            portfolio.sharpe
        );

        Ok(BacktestResult {
            days,
            assets,
            holdings,
            portfolio,
            benchmark_name: benchmark.name.clone(),
            benchmark: benchmark_performance,
            latest,
            risk,
        })
    }
}
