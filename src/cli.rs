//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::csv_adapter::CsvMarketData;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::route::parse_route;
use crate::domain::backtest::{BacktestResult, Backtester, RawRequest};
use crate::domain::error::{ErrorRecord, HindsightError};
use crate::domain::settings::Settings;

/// Data directory used when neither the config file nor `--data-dir` names one.
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(
    name = "hindsight",
    about = "What would my investment be worth?",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// INI configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Market data directory (overrides [data] dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest from a path such as 1000EUR/of/AAPL/on/2025-03-31/and-sold-on/2025-07-18
    Query {
        path: String,
        /// Asset type: stock or crypto
        #[arg(long = "type")]
        asset_type: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Run a backtest from explicit arguments
    Backtest {
        /// Share quantity (10) or value with currency (1000EUR, $500)
        amount: String,
        ticker: String,
        /// Purchase date, YYYY-MM-DD
        #[arg(long = "on")]
        buy_date: String,
        /// Sale date, YYYY-MM-DD
        #[arg(long = "sold-on")]
        sell_date: Option<String>,
        /// Reinvest dividends between purchase and sale
        #[arg(long)]
        drip: bool,
        /// Treat a bare number as a value in the asset's currency
        #[arg(long)]
        value: bool,
        /// Asset type: stock or crypto
        #[arg(long = "type")]
        asset_type: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Validate a configuration file
    CheckConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Query {
            path,
            asset_type,
            source,
        } => match parse_route(&path, asset_type.as_deref()) {
            Ok(raw) => run_request(&raw, &source),
            Err(e) => report_error(&e),
        },
        Command::Backtest {
            amount,
            ticker,
            buy_date,
            sell_date,
            drip,
            value,
            asset_type,
            source,
        } => {
            let raw = RawRequest {
                amount,
                ticker,
                buy_date,
                sell_date,
                drip,
                asset_type,
                value_marker: value,
            };
            run_request(&raw, &source)
        }
        Command::CheckConfig { config } => run_check_config(&config),
    }
}

/// Load settings from the optional config file, applying CLI overrides.
pub fn load_settings(source: &SourceArgs) -> Result<Settings, HindsightError> {
    let mut settings = match &source.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            let adapter = FileConfigAdapter::from_file(path)?;
            Settings::from_config(&adapter)?
        }
        None => Settings::default(),
    };
    if let Some(dir) = &source.data_dir {
        settings.data_dir = Some(dir.clone());
    }
    Ok(settings)
}

/// Run one request against the CSV market data named by `settings`.
pub fn evaluate(raw: &RawRequest, settings: &Settings) -> Result<BacktestResult, HindsightError> {
    let data_dir = settings
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let market = CsvMarketData::new(data_dir);
    let backtester = Backtester::new(&market, &market, &market, settings);
    backtester.run_raw(raw)
}

pub fn render_result(result: &BacktestResult) -> Result<String, HindsightError> {
    serde_json::to_string_pretty(result).map_err(|e| HindsightError::Io(std::io::Error::other(e)))
}

pub fn render_error(err: &HindsightError) -> String {
    let record = ErrorRecord::from(err);
    serde_json::to_string_pretty(&record)
        .unwrap_or_else(|_| format!("{{\"error\":{:?},\"details\":{:?}}}", record.error, record.details))
}

fn run_request(raw: &RawRequest, source: &SourceArgs) -> ExitCode {
    let outcome = load_settings(source)
        .and_then(|settings| evaluate(raw, &settings))
        .and_then(|result| render_result(&result));

    match outcome {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn report_error(err: &HindsightError) -> ExitCode {
    error!("{err}");
    println!("{}", render_error(err));
    err.into()
}

fn run_check_config(path: &Path) -> ExitCode {
    let source = SourceArgs {
        config: Some(path.to_path_buf()),
        data_dir: None,
    };
    match load_settings(&source) {
        Ok(settings) => {
            eprintln!("Config validated successfully");
            eprintln!("  stock currency:  {}", settings.stock_currency);
            eprintln!("  crypto currency: {}", settings.crypto_currency);
            eprintln!("  ticker overrides: {}", settings.ticker_currencies.len());
            eprintln!("  drip pricing:    {:?}", settings.drip_pricing);
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}
