//! Core data types for the backtest engine.

use crate::error::{BacktestError, Result};
use serde::{Deserialize, Serialize};

/// A daily simple-return series indexed by ISO `yyyy-MM-dd` date strings.
///
/// Invariants: `days` is strictly ascending (lexicographic order equals
/// chronological order for ISO dates) and `daily_returns` has the same
/// length. `daily_returns[i]` is the fractional change realized on `days[i]`
/// relative to the prior trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnSeries {
    pub days: Vec<String>,
    pub daily_returns: Vec<f64>,
}

impl ReturnSeries {
    /// Create a series, validating the day-ordering invariants.
    pub fn new(days: Vec<String>, daily_returns: Vec<f64>) -> Result<Self> {
        let series = Self {
            days,
            daily_returns,
        };
        series.validate()?;
        Ok(series)
    }

    /// An empty series (no trading days).
    pub fn empty() -> Self {
        Self {
            days: Vec::new(),
            daily_returns: Vec::new(),
        }
    }

    /// Check the series invariants.
    pub fn validate(&self) -> Result<()> {
        if self.days.len() != self.daily_returns.len() {
            return Err(BacktestError::DataError(format!(
                "{} days but {} returns",
                self.days.len(),
                self.daily_returns.len()
            )));
        }
        for day in &self.days {
            if day.len() != 10 || day.as_bytes()[4] != b'-' || day.as_bytes()[7] != b'-' {
                return Err(BacktestError::DataError(format!(
                    "malformed day string: {day}"
                )));
            }
        }
        for pair in self.days.windows(2) {
            if pair[0] >= pair[1] {
                return Err(BacktestError::DataError(format!(
                    "days must be strictly ascending: {} then {}",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// First trading day, if any.
    pub fn first_day(&self) -> Option<&str> {
        self.days.first().map(String::as_str)
    }

    /// Last trading day, if any.
    pub fn last_day(&self) -> Option<&str> {
        self.days.last().map(String::as_str)
    }
}

/// A tradable asset: its realized return series plus identity, and
/// optionally a day-parallel series of model-implied forward daily returns.
///
/// Produced by the data-fetch collaborator (the serde field names match its
/// JSON contract) and consumed read-only by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub symbol: String,
    pub name: String,
    pub days: Vec<String>,
    pub daily_returns: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Vec<f64>>,
}

impl AssetInfo {
    /// Create an asset from a validated return series.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, series: ReturnSeries) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            days: series.days,
            daily_returns: series.daily_returns,
            expected: None,
        }
    }

    /// Attach a day-parallel expected-return series.
    pub fn with_expected(mut self, expected: Vec<f64>) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Check the series invariants, including expected-series parallelism.
    pub fn validate(&self) -> Result<()> {
        self.return_series().validate()?;
        if let Some(expected) = &self.expected {
            if expected.len() != self.days.len() {
                return Err(BacktestError::DataError(format!(
                    "asset {}: expected series has {} entries for {} days",
                    self.symbol,
                    expected.len(),
                    self.days.len()
                )));
            }
        }
        Ok(())
    }

    /// The realized return series as a standalone value.
    pub fn return_series(&self) -> ReturnSeries {
        ReturnSeries {
            days: self.days.clone(),
            daily_returns: self.daily_returns.clone(),
        }
    }

    /// Position of `day` on this asset's calendar.
    pub fn day_index(&self, day: &str) -> Option<usize> {
        self.days.iter().position(|d| d == day)
    }

    /// Copy of this asset with the first `skip` trading days dropped.
    pub fn truncated(&self, skip: usize) -> AssetInfo {
        let skip = skip.min(self.days.len());
        AssetInfo {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            days: self.days[skip..].to_vec(),
            daily_returns: self.daily_returns[skip..].to_vec(),
            expected: self.expected.as_ref().map(|e| e[skip..].to_vec()),
        }
    }
}
