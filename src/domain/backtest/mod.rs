//! Backtest requests, results and the orchestrating engine.
//!
//! - `RawRequest`: request fields as received from a route or the CLI
//! - `BacktestRequest`: validated request, built before any data is fetched
//! - `BacktestResult`: one variant per request shape and amount mode
//! - `Backtester`: runs a request against the market data ports

pub mod engine;
pub mod result;
pub mod route;

pub use engine::Backtester;
pub use result::BacktestResult;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::domain::amount::{self, ParsedAmount};
use crate::domain::error::HindsightError;
use crate::domain::fx;

static TICKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.^=-]+$").expect("valid ticker pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    #[default]
    Stock,
    Crypto,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Crypto => "crypto",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = HindsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stock" => Ok(AssetType::Stock),
            "crypto" => Ok(AssetType::Crypto),
            other => Err(HindsightError::InvalidType {
                value: other.to_string(),
            }),
        }
    }
}

/// Request fields as strings, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRequest {
    pub amount: String,
    pub ticker: String,
    pub buy_date: String,
    pub sell_date: Option<String>,
    pub drip: bool,
    /// `stock` when absent.
    pub asset_type: Option<String>,
    /// Set when the request came through a value-mode (`/of/`) route.
    pub value_marker: bool,
}

/// The three request shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    BuyOnly,
    BuySell { sell: NaiveDate },
    BuySellDrip { sell: NaiveDate },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRequest {
    pub amount: ParsedAmount,
    /// ISO code of the amount's currency token, when it carries one.
    pub currency_code: Option<String>,
    pub ticker: String,
    pub buy_date: NaiveDate,
    pub sell_date: Option<NaiveDate>,
    pub drip: bool,
    pub asset_type: AssetType,
}

impl BacktestRequest {
    /// Validate a raw request. Type and amount are checked first, so a bad
    /// request never reaches a data source.
    pub fn from_raw(raw: &RawRequest) -> Result<Self, HindsightError> {
        let asset_type = match raw.asset_type.as_deref() {
            None => AssetType::Stock,
            Some(t) => t.parse()?,
        };

        let amount = amount::parse_with_marker(&raw.amount, raw.value_marker)?;
        let currency_code = amount
            .currency()
            .map(|token| {
                fx::currency_code(token).ok_or_else(|| HindsightError::InvalidAmount {
                    input: raw.amount.clone(),
                    reason: format!("unrecognized currency {:?}", token),
                })
            })
            .transpose()?;

        let ticker = raw.ticker.trim();
        if ticker.is_empty() {
            return Err(HindsightError::InvalidRequest {
                reason: "ticker is required".into(),
            });
        }
        if !TICKER_RE.is_match(ticker) || ticker.contains("..") {
            return Err(HindsightError::InvalidRequest {
                reason: format!("invalid ticker {:?}", ticker),
            });
        }

        let buy_date = parse_date("buy date", &raw.buy_date)?;
        let sell_date = raw
            .sell_date
            .as_deref()
            .map(|s| parse_date("sell date", s))
            .transpose()?;

        if let Some(sell) = sell_date {
            if sell < buy_date {
                return Err(HindsightError::InvalidRequest {
                    reason: format!("sell date {} is before buy date {}", sell, buy_date),
                });
            }
        }
        if raw.drip && sell_date.is_none() {
            return Err(HindsightError::InvalidRequest {
                reason: "dividend reinvestment needs a sell date".into(),
            });
        }

        Ok(Self {
            amount,
            currency_code,
            ticker: ticker.to_string(),
            buy_date,
            sell_date,
            drip: raw.drip,
            asset_type,
        })
    }

    pub fn shape(&self) -> Shape {
        match (self.sell_date, self.drip) {
            (None, _) => Shape::BuyOnly,
            (Some(sell), false) => Shape::BuySell { sell },
            (Some(sell), true) => Shape::BuySellDrip { sell },
        }
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, HindsightError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        HindsightError::InvalidRequest {
            reason: format!("{} {:?} is not a YYYY-MM-DD date", field, value),
        }
    })
}
