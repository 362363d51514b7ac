//! CLI integration tests.
//!
//! Tests cover:
//! - Argument parsing for every subcommand
//! - Settings loading from INI files on disk, with CLI overrides
//! - Full requests against a CSV data directory
//! - JSON rendering of results and error records

use clap::Parser;
use hindsight::cli::{self, Cli, Command, SourceArgs};
use hindsight::domain::backtest::route::parse_route;
use hindsight::domain::backtest::{BacktestResult, RawRequest};
use hindsight::domain::error::HindsightError;
use hindsight::domain::settings::DripPricing;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn write_market(root: &Path) {
    for sub in ["prices", "dividends", "fx"] {
        fs::create_dir_all(root.join(sub)).unwrap();
    }
    fs::write(
        root.join("prices/AAPL.csv"),
        "date,close\n2025-03-31,200.50\n2025-06-20,205.75\n2025-07-17,210.02\n2025-07-18,211.18\n",
    )
    .unwrap();
    fs::write(
        root.join("prices/SAP.csv"),
        "date,close\n2025-07-18,250.00\n",
    )
    .unwrap();
    fs::write(
        root.join("dividends/AAPL.csv"),
        "ex_date,amount\n2025-06-20,0.25\n2025-07-17,0.25\n",
    )
    .unwrap();
    fs::write(
        root.join("fx/EUR_USD.csv"),
        "date,rate\n2025-03-31,1.0500\n2025-07-18,1.0815\n",
    )
    .unwrap();
}

fn source(config: Option<&Path>, data_dir: Option<&Path>) -> SourceArgs {
    SourceArgs {
        config: config.map(Path::to_path_buf),
        data_dir: data_dir.map(Path::to_path_buf),
    }
}

mod argument_parsing {
    use super::*;

    #[test]
    fn query_subcommand() {
        let cli = Cli::try_parse_from([
            "hindsight",
            "query",
            "/10/AAPL/on/2025-07-18",
            "--type",
            "crypto",
            "--data-dir",
            "/tmp/market",
        ])
        .unwrap();

        let Command::Query {
            path,
            asset_type,
            source,
        } = cli.command
        else {
            panic!("expected query");
        };
        assert_eq!(path, "/10/AAPL/on/2025-07-18");
        assert_eq!(asset_type.as_deref(), Some("crypto"));
        assert_eq!(source.data_dir, Some(PathBuf::from("/tmp/market")));
        assert_eq!(source.config, None);
    }

    #[test]
    fn backtest_subcommand() {
        let cli = Cli::try_parse_from([
            "hindsight",
            "backtest",
            "1000EUR",
            "AAPL",
            "--on",
            "2025-03-31",
            "--sold-on",
            "2025-07-18",
            "--drip",
            "-c",
            "hindsight.ini",
        ])
        .unwrap();

        let Command::Backtest {
            amount,
            ticker,
            buy_date,
            sell_date,
            drip,
            value,
            asset_type,
            source,
        } = cli.command
        else {
            panic!("expected backtest");
        };
        assert_eq!(amount, "1000EUR");
        assert_eq!(ticker, "AAPL");
        assert_eq!(buy_date, "2025-03-31");
        assert_eq!(sell_date.as_deref(), Some("2025-07-18"));
        assert!(drip);
        assert!(!value);
        assert_eq!(asset_type, None);
        assert_eq!(source.config, Some(PathBuf::from("hindsight.ini")));
    }

    #[test]
    fn backtest_requires_buy_date() {
        assert!(Cli::try_parse_from(["hindsight", "backtest", "10", "AAPL"]).is_err());
    }

    #[test]
    fn check_config_requires_path() {
        assert!(Cli::try_parse_from(["hindsight", "check-config"]).is_err());
        assert!(Cli::try_parse_from(["hindsight", "check-config", "-c", "a.ini"]).is_ok());
    }
}

mod config_loading {
    use super::*;

    const VALID_INI: &str = r#"
[data]
dir = /srv/market

[pricing]
stock_currency = USD
crypto_currency = EUR

[currencies]
SAP = EUR

[drip]
pricing = ex_date
"#;

    #[test]
    fn defaults_without_config() {
        let settings = cli::load_settings(&SourceArgs::default()).unwrap();
        assert_eq!(settings.data_dir, None);
        assert_eq!(settings.stock_currency, "USD");
        assert_eq!(settings.drip_pricing, DripPricing::Constant);
    }

    #[test]
    fn loads_ini_from_disk() {
        let file = write_temp_ini(VALID_INI);
        let settings = cli::load_settings(&source(Some(file.path()), None)).unwrap();

        assert_eq!(settings.data_dir, Some(PathBuf::from("/srv/market")));
        assert_eq!(settings.crypto_currency, "EUR");
        assert_eq!(settings.ticker_currencies.get("SAP").map(String::as_str), Some("EUR"));
        assert_eq!(settings.drip_pricing, DripPricing::ExDate);
    }

    #[test]
    fn data_dir_flag_overrides_config() {
        let file = write_temp_ini(VALID_INI);
        let settings =
            cli::load_settings(&source(Some(file.path()), Some(Path::new("/elsewhere")))).unwrap();
        assert_eq!(settings.data_dir, Some(PathBuf::from("/elsewhere")));
    }

    #[test]
    fn missing_file_is_parse_error() {
        let err = cli::load_settings(&source(Some(Path::new("/nonexistent/hindsight.ini")), None))
            .unwrap_err();
        assert!(matches!(err, HindsightError::ConfigParse { .. }));
    }

    #[test]
    fn bad_currency_is_rejected() {
        let file = write_temp_ini("[pricing]\nstock_currency = dollars\n");
        let err = cli::load_settings(&source(Some(file.path()), None)).unwrap_err();
        assert!(matches!(
            err,
            HindsightError::ConfigInvalid { ref section, ref key, .. }
                if section == "pricing" && key == "stock_currency"
        ));
    }

    #[test]
    fn bad_drip_pricing_is_rejected() {
        let file = write_temp_ini("[drip]\npricing = average\n");
        let err = cli::load_settings(&source(Some(file.path()), None)).unwrap_err();
        assert!(matches!(err, HindsightError::ConfigInvalid { .. }));
    }
}

mod csv_end_to_end {
    use super::*;

    fn settings_for(dir: &TempDir) -> hindsight::domain::settings::Settings {
        cli::load_settings(&source(None, Some(dir.path()))).unwrap()
    }

    #[test]
    fn value_buy_from_route() {
        let dir = TempDir::new().unwrap();
        write_market(dir.path());
        let raw = parse_route("/1000EUR/of/AAPL/on/2025-07-18", None).unwrap();

        let result = cli::evaluate(&raw, &settings_for(&dir)).unwrap();
        let BacktestResult::ValueBuy(r) = &result else {
            panic!("expected value buy");
        };
        assert!((r.shares - 5.1210).abs() < 1e-3);

        let json: serde_json::Value =
            serde_json::from_str(&cli::render_result(&result).unwrap()).unwrap();
        assert_eq!(json["mode"], "valueBuy");
        assert_eq!(json["ticker"], "AAPL");
        assert_eq!(json["buyDate"], "2025-07-18");
        assert_eq!(json["type"], "stock");
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["stockCurrency"], "USD");
    }

    #[test]
    fn value_buy_sell_uses_inverted_fx_file() {
        let dir = TempDir::new().unwrap();
        write_market(dir.path());
        let raw = RawRequest {
            amount: "1000EUR".into(),
            ticker: "AAPL".into(),
            buy_date: "2025-03-31".into(),
            sell_date: Some("2025-07-18".into()),
            ..RawRequest::default()
        };

        let result = cli::evaluate(&raw, &settings_for(&dir)).unwrap();
        let BacktestResult::ValueBuySell(r) = result else {
            panic!("expected value buy/sell");
        };
        assert!((r.fx_rate_sell - 1.0 / 1.0815).abs() < 1e-12);
        assert!((r.final_value_in_original_currency - 1022.5891581725301).abs() < 1e-6);
    }

    #[test]
    fn drip_with_ex_date_pricing_from_config() {
        let dir = TempDir::new().unwrap();
        write_market(dir.path());
        let ini = write_temp_ini(&format!(
            "[data]\ndir = {}\n\n[drip]\npricing = ex_date\n",
            dir.path().display()
        ));
        let settings = cli::load_settings(&source(Some(ini.path()), None)).unwrap();
        let raw =
            parse_route("/10/AAPL/on/2025-03-31/and-sold-on/2025-07-18/with-drip", None).unwrap();

        let result = cli::evaluate(&raw, &settings).unwrap();
        let BacktestResult::QuantityDrip(r) = result else {
            panic!("expected quantity drip");
        };
        assert_eq!(r.reinvestments.len(), 2);
        assert!((r.reinvestments[0].price - 205.75).abs() < 1e-12);
        assert!((r.reinvestments[1].price - 210.02).abs() < 1e-12);
    }

    #[test]
    fn ticker_currency_from_config_avoids_fx() {
        let dir = TempDir::new().unwrap();
        write_market(dir.path());
        let ini = write_temp_ini("[currencies]\nSAP = EUR\n");
        let settings =
            cli::load_settings(&source(Some(ini.path()), Some(dir.path()))).unwrap();
        let raw = parse_route("/1000EUR/of/SAP/on/2025-07-18", None).unwrap();

        let BacktestResult::ValueBuy(r) = cli::evaluate(&raw, &settings).unwrap() else {
            panic!("expected value buy");
        };
        assert_eq!(r.stock_currency, "EUR");
        assert!((r.fx_rate - 1.0).abs() < f64::EPSILON);
        assert!((r.shares - 4.0).abs() < 1e-12);
    }

    #[test]
    fn missing_price_renders_error_record() {
        let dir = TempDir::new().unwrap();
        write_market(dir.path());
        let raw = parse_route("/10/MSFT/on/2025-07-18", None).unwrap();

        let err = cli::evaluate(&raw, &settings_for(&dir)).unwrap_err();
        assert!(matches!(err, HindsightError::PriceUnavailable { .. }));

        let json: serde_json::Value = serde_json::from_str(&cli::render_error(&err)).unwrap();
        assert_eq!(json["error"], "Failed to fetch stock price");
        assert!(json["details"].as_str().unwrap().contains("MSFT"));
    }

    #[test]
    fn invalid_type_renders_error_record() {
        let dir = TempDir::new().unwrap();
        let raw = parse_route("/10/AAPL/on/2025-07-18?type=banana", None).unwrap();

        let err = cli::evaluate(&raw, &settings_for(&dir)).unwrap_err();
        let json: serde_json::Value = serde_json::from_str(&cli::render_error(&err)).unwrap();
        assert_eq!(json["error"], "Invalid type parameter");
        assert!(json["details"].as_str().unwrap().contains("banana"));
    }
}
