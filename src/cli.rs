//! Command-line runner.

use crate::align::slice_assets;
use crate::backtest::{BacktestEngine, BacktestResult};
use crate::config::{AssetEntry, RunConfig, StrategyKind};
use crate::data::{load_asset_json, load_series_csv};
use crate::error::{BacktestError, Result};
use crate::expected::{
    attach_expected, fixed_coupon, historical_average, pe_derived, ReturnModel,
};
use crate::strategies::{
    BlendedRiskParityMinVariance, ManualWeights, MaximumSharpe, MinimumVariance, RiskParity,
    WeightStrategy,
};
use crate::types::{AssetInfo, ReturnSeries};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Backtests portfolio allocation strategies against historical return series",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the backtest described by a TOML configuration file.
    Run {
        /// Path to the configuration file.
        #[arg(short, long)]
        config: String,
        /// Write the full result as JSON to this path.
        #[arg(short, long)]
        output: Option<String>,
    },
}

pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run { config, output } => run(&config, output.as_deref()),
    }
}

fn run(config_path: &str, output: Option<&str>) -> Result<()> {
    let config = RunConfig::from_file(config_path)?;

    let benchmark = load_asset_json(&config.benchmark)?;
    let mut assets = Vec::with_capacity(config.assets.len());
    for entry in &config.assets {
        assets.push(load_entry(entry)?);
    }

    let assets = match &config.start {
        Some(start) => assets
            .iter()
            .map(|a| Ok(slice_assets(std::slice::from_ref(a), start)?.remove(0)))
            .collect::<Result<Vec<AssetInfo>>>()?,
        None => assets,
    };

    let mut strategy = build_strategy(&config)?;
    let engine = BacktestEngine::new(config.options, config.period)
        .with_progress(config.show_progress);
    let result = engine.run(&assets, &benchmark, strategy.as_mut())?;

    print_summary(&result);

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&result)?)?;
        println!("result written to {path}");
    }
    Ok(())
}

/// Load one configured asset and attach its expected-return series.
fn load_entry(entry: &AssetEntry) -> Result<AssetInfo> {
    let asset = load_asset_json(&entry.file)?;
    let Some(tag) = &entry.model else {
        return Ok(asset);
    };

    let model = ReturnModel::parse(tag)?;
    let expected = match &model {
        ReturnModel::HistoricalAverage { source } if source == "0" => ReturnSeries {
            days: asset.days.clone(),
            daily_returns: vec![0.0; asset.days.len()],
        },
        ReturnModel::HistoricalAverage { .. } => historical_average(&asset.return_series()),
        ReturnModel::PeYield { .. } => {
            let series = load_series_csv(model_file(entry, tag)?)?;
            pe_derived(series.days, &series.daily_returns)
        }
        ReturnModel::FixedCoupon { .. } => {
            let series = load_series_csv(model_file(entry, tag)?)?;
            fixed_coupon(series.days, &series.daily_returns)
        }
    };
    attach_expected(&asset, &expected)
}

fn model_file<'a>(entry: &'a AssetEntry, tag: &str) -> Result<&'a str> {
    entry.model_file.as_deref().ok_or_else(|| {
        BacktestError::ConfigError(format!("model {tag} needs a model_file series"))
    })
}

fn build_strategy(config: &RunConfig) -> Result<Box<dyn WeightStrategy>> {
    Ok(match config.strategy {
        StrategyKind::MinimumVariance => Box::new(MinimumVariance::new(config.options)),
        StrategyKind::RiskParity => Box::new(match config.seed {
            Some(seed) => RiskParity::with_seed(config.options, seed),
            None => RiskParity::new(config.options),
        }),
        StrategyKind::Blended => Box::new(match config.seed {
            Some(seed) => {
                BlendedRiskParityMinVariance::with_seed(config.options, config.ratio, seed)?
            }
            None => BlendedRiskParityMinVariance::new(config.options, config.ratio)?,
        }),
        StrategyKind::MaximumSharpe => Box::new(match config.seed {
            Some(seed) => MaximumSharpe::with_seed(config.options, seed),
            None => MaximumSharpe::new(config.options),
        }),
        StrategyKind::Manual => {
            let weights = config
                .assets
                .iter()
                .map(|a| a.weight.unwrap_or(0.0))
                .collect();
            Box::new(ManualWeights::new(weights))
        }
    })
}

fn print_summary(result: &BacktestResult) {
    println!("{}", "Backtest result".bold());
    println!(
        "  annualized {}  volatility {:.2}%  sharpe {:.2}",
        format!("{:+.2}%", result.portfolio.annualized * 100.0).green(),
        result.portfolio.volatility * 100.0,
        result.portfolio.sharpe,
    );
    println!(
        "  benchmark {}: annualized {:+.2}%",
        result.benchmark_name,
        result.benchmark.annualized * 100.0
    );

    let mut builder = Builder::default();
    builder.push_record(["symbol", "name", "weight", "risk share"]);
    for (i, asset) in result.assets.iter().enumerate() {
        let share = result.risk.risks[i] / result.risk.total_risk;
        builder.push_record([
            asset.symbol.clone(),
            asset.name.clone(),
            format!("{:.0}%", result.latest[i] * 100.0),
            format!("{:.1}%", share * 100.0),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
    println!("  total risk {:.2}%", result.risk.total_risk * 100.0);
}
