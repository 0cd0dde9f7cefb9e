//! Expected-return models feeding the maximum-Sharpe strategy.
//!
//! Each model shapes a raw data series (valuation ratios, coupon yields,
//! realized history) into a forward daily-expected-return series on the
//! source's own calendar. Attaching it to an asset aligns the two calendars
//! first, so the expectation stays day-parallel with the realized returns.

use crate::align::align_returns;
use crate::error::{BacktestError, Result};
use crate::stats::{mean, moving_average};
use crate::types::{AssetInfo, ReturnSeries};

/// Calendar days used to spread an annual yield over single days.
const YIELD_DAYS_PER_YEAR: f64 = 255.0;

/// Smoothing window for the earnings-yield model, in trading days.
const PE_SMOOTHING_WINDOW: usize = 60;

/// Forward-return model selected per asset by a `<source>.<kind>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnModel {
    /// Earnings-yield estimate from a trailing price-earnings series.
    PeYield { source: String },
    /// Constant-coupon proxy from a bond-yield series.
    FixedCoupon { source: String },
    /// The asset's own realized average, broadcast forward. A `0` source
    /// means zero expectations.
    HistoricalAverage { source: String },
}

impl ReturnModel {
    /// Parse a model tag such as `SH000300.pe`, `5y.cnbond` or `0.history`.
    pub fn parse(tag: &str) -> Result<Self> {
        let (source, kind) = tag.split_once('.').ok_or_else(|| {
            BacktestError::ConfigError(format!("malformed return-model tag: {tag}"))
        })?;
        let source = source.to_string();
        match kind {
            "pe" => Ok(Self::PeYield { source }),
            "cnbond" => Ok(Self::FixedCoupon { source }),
            "history" => Ok(Self::HistoricalAverage { source }),
            _ => Err(BacktestError::ConfigError(format!(
                "unknown return model kind: {kind}"
            ))),
        }
    }

    /// The data series the model draws from.
    pub fn source(&self) -> &str {
        match self {
            Self::PeYield { source }
            | Self::FixedCoupon { source }
            | Self::HistoricalAverage { source } => source,
        }
    }
}

/// Expected daily returns from a trailing price-earnings series: the
/// earnings yield `1/PE` spread over the year, then smoothed.
pub fn pe_derived(days: Vec<String>, pe: &[f64]) -> ReturnSeries {
    let yields: Vec<f64> = pe.iter().map(|p| 1.0 / p / YIELD_DAYS_PER_YEAR).collect();
    ReturnSeries {
        days,
        daily_returns: moving_average(&yields, PE_SMOOTHING_WINDOW),
    }
}

/// Constant-coupon proxy: a percentage annual yield per day, spread daily.
pub fn fixed_coupon(days: Vec<String>, yield_pct: &[f64]) -> ReturnSeries {
    let daily_returns = yield_pct
        .iter()
        .map(|y| y / 100.0 / YIELD_DAYS_PER_YEAR)
        .collect();
    ReturnSeries {
        days,
        daily_returns,
    }
}

/// The asset's realized mean daily return, broadcast over its calendar.
pub fn historical_average(series: &ReturnSeries) -> ReturnSeries {
    let average = mean(&series.daily_returns);
    ReturnSeries {
        days: series.days.clone(),
        daily_returns: vec![average; series.days.len()],
    }
}

/// Align an expected-return series onto an asset's calendar and attach it.
///
/// The asset is trimmed to the window both calendars cover, with expectation
/// gaps zero-filled, so the result still satisfies day-parallelism.
pub fn attach_expected(asset: &AssetInfo, expected: &ReturnSeries) -> Result<AssetInfo> {
    let aligned = align_returns(&[asset.return_series(), expected.clone()])?;
    Ok(AssetInfo {
        symbol: asset.symbol.clone(),
        name: asset.name.clone(),
        days: aligned[0].days.clone(),
        daily_returns: aligned[0].daily_returns.clone(),
        expected: Some(aligned[1].daily_returns.clone()),
    })
}
