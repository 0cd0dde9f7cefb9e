//! Multi-series calendar alignment.
//!
//! Return series arrive with arbitrary, possibly disjoint date sets. The
//! engine needs every series on one ascending calendar: gaps are zero-filled
//! against the union of all days, then everything is trimmed to the window
//! where every series has real observations. Zero-filling before trimming
//! lets short-history assets contribute placeholder days inside the union
//! while the final trim keeps padding out of covariance estimates.

use crate::error::{BacktestError, Result};
use crate::types::{AssetInfo, ReturnSeries};
use std::cmp::Ordering;
use tracing::debug;

fn union_calendar(series: &[ReturnSeries]) -> Vec<String> {
    let mut days: Vec<String> = series
        .iter()
        .flat_map(|s| s.days.iter().cloned())
        .collect();
    days.sort();
    days.dedup();
    days
}

/// Walk the union calendar with one cursor per series, emitting 0.0 on days
/// the series has no observation for.
fn zero_fill(series: &[ReturnSeries], calendar: &[String]) -> Vec<ReturnSeries> {
    let mut cursors = vec![0usize; series.len()];
    let mut filled: Vec<ReturnSeries> = series
        .iter()
        .map(|_| ReturnSeries {
            days: Vec::with_capacity(calendar.len()),
            daily_returns: Vec::with_capacity(calendar.len()),
        })
        .collect();

    for day in calendar {
        for (j, s) in series.iter().enumerate() {
            let out = &mut filled[j];
            out.days.push(day.clone());
            let c = cursors[j];
            if c == s.days.len() {
                out.daily_returns.push(0.0);
                continue;
            }
            match day.as_str().cmp(s.days[c].as_str()) {
                Ordering::Less => out.daily_returns.push(0.0),
                Ordering::Equal => {
                    out.daily_returns.push(s.daily_returns[c]);
                    cursors[j] += 1;
                }
                // The calendar is the sorted union of the inputs' own days,
                // which are validated ascending, so a union day can never
                // overtake an unconsumed cursor.
                Ordering::Greater => unreachable!("union calendar overtook series {j} at {day}"),
            }
        }
    }
    filled
}

/// Align return series of arbitrary date ranges onto one shared calendar.
///
/// Every output series has identical `days`: the union of all input days,
/// zero-filled per series, trimmed to the inclusive window between the
/// latest first day and the earliest last day of the originals. An empty
/// input series, or a window that closes before it opens, yields empty
/// output for every series; callers treat all-empty as insufficient data.
pub fn align_returns(series: &[ReturnSeries]) -> Result<Vec<ReturnSeries>> {
    if series.is_empty() {
        return Ok(Vec::new());
    }
    for s in series {
        s.validate()?;
    }
    if series.iter().any(|s| s.is_empty()) {
        return Ok(series.iter().map(|_| ReturnSeries::empty()).collect());
    }

    let begin_day = series.iter().map(|s| s.first_day().unwrap()).max().unwrap();
    let end_day = series.iter().map(|s| s.last_day().unwrap()).min().unwrap();
    if begin_day > end_day {
        debug!("no overlapping window: {} after {}", begin_day, end_day);
        return Ok(series.iter().map(|_| ReturnSeries::empty()).collect());
    }

    let calendar = union_calendar(series);
    let begin = calendar.iter().position(|d| d == begin_day).unwrap();
    let end = calendar.iter().position(|d| d == end_day).unwrap();

    let filled = zero_fill(series, &calendar);
    Ok(filled
        .into_iter()
        .map(|s| ReturnSeries {
            days: s.days[begin..=end].to_vec(),
            daily_returns: s.daily_returns[begin..=end].to_vec(),
        })
        .collect())
}

/// Align assets onto one calendar, carrying each asset's expected-return
/// series through the same fill and trim.
///
/// The expected series ride along as extra entries in a doubled list so they
/// stay day-parallel with their asset after alignment; assets without an
/// expected series come back without one.
pub fn align_assets(assets: &[AssetInfo]) -> Result<Vec<AssetInfo>> {
    for a in assets {
        a.validate()?;
    }

    let mut series: Vec<ReturnSeries> = assets.iter().map(|a| a.return_series()).collect();
    series.extend(assets.iter().map(|a| ReturnSeries {
        days: a.days.clone(),
        daily_returns: a
            .expected
            .clone()
            .unwrap_or_else(|| vec![0.0; a.days.len()]),
    }));

    let aligned = align_returns(&series)?;
    let (returns, expected) = aligned.split_at(assets.len());

    Ok(assets
        .iter()
        .zip(returns.iter().zip(expected.iter()))
        .map(|(a, (r, e))| AssetInfo {
            symbol: a.symbol.clone(),
            name: a.name.clone(),
            days: r.days.clone(),
            daily_returns: r.daily_returns.clone(),
            expected: a.expected.as_ref().map(|_| e.daily_returns.clone()),
        })
        .collect())
}

/// Trim aligned assets so the shared calendar starts at the first trading
/// day at or after `start`.
pub fn slice_assets(assets: &[AssetInfo], start: &str) -> Result<Vec<AssetInfo>> {
    let first = assets.first().ok_or(BacktestError::NoData)?;
    let from = first
        .days
        .iter()
        .position(|d| d.as_str() >= start)
        .ok_or_else(|| {
            BacktestError::InvalidInput(format!("no trading day at or after {start}"))
        })?;
    Ok(assets.iter().map(|a| a.truncated(from)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(days: &[&str], returns: &[f64]) -> ReturnSeries {
        ReturnSeries::new(
            days.iter().map(|d| d.to_string()).collect(),
            returns.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn test_align_fills_gaps_with_zero() {
        let a = series(&["2024-01-02", "2024-01-03", "2024-01-04"], &[0.01, 0.02, 0.03]);
        let b = series(&["2024-01-02", "2024-01-04"], &[0.1, 0.2]);

        let aligned = align_returns(&[a, b]).unwrap();
        assert_eq!(aligned[0].days, aligned[1].days);
        assert_eq!(aligned[0].daily_returns, vec![0.01, 0.02, 0.03]);
        assert_eq!(aligned[1].daily_returns, vec![0.1, 0.0, 0.2]);
    }

    #[test]
    fn test_align_trims_to_intersection_window() {
        let long = series(
            &["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"],
            &[0.1, 0.2, 0.3, 0.4],
        );
        let short = series(&["2024-01-02", "2024-01-03"], &[0.01, 0.02]);

        let aligned = align_returns(&[long, short]).unwrap();
        assert_eq!(aligned[0].days, vec!["2024-01-02", "2024-01-03"]);
        assert_eq!(aligned[0].daily_returns, vec![0.2, 0.3]);
        assert_eq!(aligned[1].daily_returns, vec![0.01, 0.02]);
    }

    #[test]
    fn test_align_is_idempotent() {
        let a = series(&["2024-01-02", "2024-01-03", "2024-01-05"], &[0.01, 0.0, 0.02]);
        let b = series(&["2024-01-02", "2024-01-04", "2024-01-05"], &[0.1, 0.2, 0.3]);

        let once = align_returns(&[a, b]).unwrap();
        let twice = align_returns(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_align_disjoint_ranges_yields_empty() {
        let a = series(&["2024-01-02", "2024-01-03"], &[0.01, 0.02]);
        let b = series(&["2024-02-01", "2024-02-02"], &[0.1, 0.2]);

        let aligned = align_returns(&[a, b]).unwrap();
        assert!(aligned.iter().all(|s| s.is_empty()));
    }

    #[test]
    fn test_align_empty_series_yields_empty() {
        let a = series(&["2024-01-02"], &[0.01]);
        let aligned = align_returns(&[a, ReturnSeries::empty()]).unwrap();
        assert!(aligned.iter().all(|s| s.is_empty()));
    }

    #[test]
    fn test_align_assets_keeps_expected_parallel() {
        let a = AssetInfo::new(
            "A",
            "Asset A",
            series(&["2024-01-02", "2024-01-03", "2024-01-04"], &[0.01, 0.02, 0.03]),
        )
        .with_expected(vec![0.001, 0.002, 0.003]);
        let b = AssetInfo::new("B", "Asset B", series(&["2024-01-03", "2024-01-04"], &[0.1, 0.2]));

        let aligned = align_assets(&[a, b]).unwrap();
        assert_eq!(aligned[0].days, aligned[1].days);
        assert_eq!(aligned[0].days, vec!["2024-01-03", "2024-01-04"]);
        assert_eq!(aligned[0].expected.as_deref(), Some(&[0.002, 0.003][..]));
        assert!(aligned[1].expected.is_none());
    }

    #[test]
    fn test_slice_assets_from_start_day() {
        let a = AssetInfo::new(
            "A",
            "Asset A",
            series(&["2024-01-02", "2024-01-05", "2024-01-08"], &[0.1, 0.2, 0.3]),
        );
        let sliced = slice_assets(&[a], "2024-01-03").unwrap();
        assert_eq!(sliced[0].days, vec!["2024-01-05", "2024-01-08"]);

        let b = AssetInfo::new("B", "Asset B", series(&["2024-01-02"], &[0.1]));
        assert!(slice_assets(&[b], "2024-06-01").is_err());
    }
}
