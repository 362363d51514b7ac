//! Runtime settings and their validation.
//!
//! Built once from configuration at start-up and passed by reference into
//! the backtester; nothing in the core reads ambient state.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::backtest::AssetType;
use crate::domain::error::HindsightError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_CURRENCY: &str = "USD";

/// How DRIP reinvestment prices are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DripPricing {
    /// Every dividend is reinvested at the buy-date close.
    #[default]
    Constant,
    /// Each dividend is reinvested at the close on its ex-date.
    ExDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: Option<PathBuf>,
    pub stock_currency: String,
    pub crypto_currency: String,
    /// Native currency per ticker, overriding the per-type default.
    pub ticker_currencies: HashMap<String, String>,
    pub drip_pricing: DripPricing,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            stock_currency: DEFAULT_CURRENCY.to_string(),
            crypto_currency: DEFAULT_CURRENCY.to_string(),
            ticker_currencies: HashMap::new(),
            drip_pricing: DripPricing::Constant,
        }
    }
}

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, HindsightError> {
        let data_dir = config
            .get_string("data", "dir")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let stock_currency = currency_setting(config, "pricing", "stock_currency")?;
        let crypto_currency = currency_setting(config, "pricing", "crypto_currency")?;

        let mut ticker_currencies = HashMap::new();
        for (ticker, code) in config.get_section("currencies") {
            let code = code.trim().to_string();
            if !is_currency_code(&code) {
                return Err(invalid(
                    "currencies",
                    &ticker,
                    "expected a three-letter uppercase currency code",
                ));
            }
            ticker_currencies.insert(ticker.trim().to_uppercase(), code);
        }

        let drip_pricing = match config
            .get_string("drip", "pricing")
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            None | Some("") | Some("constant") => DripPricing::Constant,
            Some("ex_date") => DripPricing::ExDate,
            Some(_) => {
                return Err(invalid(
                    "drip",
                    "pricing",
                    "must be 'constant' or 'ex_date'",
                ));
            }
        };

        Ok(Self {
            data_dir,
            stock_currency,
            crypto_currency,
            ticker_currencies,
            drip_pricing,
        })
    }

    /// Currency the asset is priced in by the price source.
    pub fn asset_currency(&self, ticker: &str, asset_type: AssetType) -> &str {
        if let Some(code) = self.ticker_currencies.get(&ticker.to_uppercase()) {
            return code;
        }
        match asset_type {
            AssetType::Stock => &self.stock_currency,
            AssetType::Crypto => &self.crypto_currency,
        }
    }
}

fn currency_setting(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, HindsightError> {
    match config.get_string(section, key) {
        None => Ok(DEFAULT_CURRENCY.to_string()),
        Some(value) => {
            let value = value.trim().to_string();
            if is_currency_code(&value) {
                Ok(value)
            } else {
                Err(invalid(
                    section,
                    key,
                    "expected a three-letter uppercase currency code",
                ))
            }
        }
    }
}

fn is_currency_code(value: &str) -> bool {
    value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase())
}

fn invalid(section: &str, key: &str, reason: &str) -> HindsightError {
    HindsightError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
