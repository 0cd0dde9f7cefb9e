//! Loading the data-fetch collaborator's output from disk.
//!
//! The collaborator resolves each instrument to a JSON payload of
//! `{symbol, name, days, dailyReturns}`; model inputs (PE ratios, coupon
//! yields) arrive as `day,value` CSV exports. No other wire format is
//! assumed.

use crate::error::Result;
use crate::types::{AssetInfo, ReturnSeries};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Load and validate an asset payload from a JSON file.
pub fn load_asset_json(path: impl AsRef<Path>) -> Result<AssetInfo> {
    let text = fs::read_to_string(path.as_ref())?;
    let asset: AssetInfo = serde_json::from_str(&text)?;
    asset.validate()?;
    info!(
        "loaded {} ({}, {} trading days)",
        asset.symbol,
        asset.name,
        asset.days.len()
    );
    Ok(asset)
}

/// One row of a `day,value` CSV export.
#[derive(Debug, Deserialize)]
struct SeriesRecord {
    day: String,
    value: f64,
}

/// Load and validate a `day,value` CSV series (daily returns, PE ratios,
/// percentage yields).
pub fn load_series_csv(path: impl AsRef<Path>) -> Result<ReturnSeries> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut days = Vec::new();
    let mut values = Vec::new();
    for record in reader.deserialize() {
        let record: SeriesRecord = record?;
        days.push(record.day);
        values.push(record.value);
    }
    let series = ReturnSeries::new(days, values)?;
    info!(
        "loaded {} rows from {}",
        series.len(),
        path.as_ref().display()
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("folio-test-{name}"));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_asset_json() {
        let path = temp_file(
            "asset.json",
            r#"{
                "symbol": "F161119",
                "name": "Aggregate Bond",
                "days": ["2024-01-02", "2024-01-03"],
                "dailyReturns": [0.0002, -0.0001],
                "expected": [0.0001, 0.0001]
            }"#,
        );
        let asset = load_asset_json(&path).unwrap();
        assert_eq!(asset.symbol, "F161119");
        assert_eq!(asset.expected.as_deref(), Some(&[0.0001, 0.0001][..]));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_asset_json_rejects_unsorted_days() {
        let path = temp_file(
            "unsorted.json",
            r#"{
                "symbol": "X",
                "name": "X",
                "days": ["2024-01-03", "2024-01-02"],
                "dailyReturns": [0.0, 0.0]
            }"#,
        );
        assert!(load_asset_json(&path).is_err());
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_series_csv() {
        let path = temp_file(
            "series.csv",
            "day,value\n2024-01-02,12.5\n2024-01-03,12.8\n",
        );
        let series = load_series_csv(&path).unwrap();
        assert_eq!(series.days, vec!["2024-01-02", "2024-01-03"]);
        assert_eq!(series.daily_returns, vec![12.5, 12.8]);
        fs::remove_file(path).ok();
    }
}
