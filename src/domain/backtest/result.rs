//! Backtest result records.
//!
//! Each variant has a fixed field set and serializes to a flat JSON object
//! with camelCase keys and a `mode` discriminator.

use chrono::NaiveDate;
use serde::Serialize;

use super::AssetType;
use crate::domain::drip::Reinvestment;

/// Fields every result carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub ticker: String,
    pub buy_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityBuy {
    #[serde(flatten)]
    pub header: Header,
    pub quantity: f64,
    pub close_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueBuy {
    #[serde(flatten)]
    pub header: Header,
    pub value: f64,
    pub currency: String,
    pub fx_rate: f64,
    pub shares: f64,
    pub stock_currency: String,
    pub close_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityBuySell {
    #[serde(flatten)]
    pub header: Header,
    pub quantity: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub final_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueBuySell {
    #[serde(flatten)]
    pub header: Header,
    pub value: f64,
    pub currency: String,
    pub buy_price: f64,
    pub sell_price: f64,
    pub fx_rate_buy: f64,
    pub fx_rate_sell: f64,
    pub stock_currency: String,
    pub shares: f64,
    pub final_value_in_stock_currency: f64,
    pub final_value_in_original_currency: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityDrip {
    #[serde(flatten)]
    pub header: Header,
    pub quantity: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub reinvested_shares: f64,
    pub total_shares: f64,
    pub final_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_pct: Option<f64>,
    pub reinvestments: Vec<Reinvestment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueDrip {
    #[serde(flatten)]
    pub header: Header,
    pub value: f64,
    pub currency: String,
    pub buy_price: f64,
    pub sell_price: f64,
    pub fx_rate_buy: f64,
    pub fx_rate_sell: f64,
    pub stock_currency: String,
    /// Shares bought with the initial value, before reinvestment.
    pub shares: f64,
    pub reinvested_shares: f64,
    pub total_shares: f64,
    pub final_value_in_stock_currency: f64,
    pub final_value_in_original_currency: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_pct: Option<f64>,
    pub reinvestments: Vec<Reinvestment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum BacktestResult {
    QuantityBuy(QuantityBuy),
    ValueBuy(ValueBuy),
    QuantityBuySell(QuantityBuySell),
    ValueBuySell(ValueBuySell),
    QuantityDrip(QuantityDrip),
    ValueDrip(ValueDrip),
}

impl BacktestResult {
    pub fn header(&self) -> &Header {
        match self {
            BacktestResult::QuantityBuy(r) => &r.header,
            BacktestResult::ValueBuy(r) => &r.header,
            BacktestResult::QuantityBuySell(r) => &r.header,
            BacktestResult::ValueBuySell(r) => &r.header,
            BacktestResult::QuantityDrip(r) => &r.header,
            BacktestResult::ValueDrip(r) => &r.header,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BacktestResult::QuantityBuy(_) => "Backtest result (quantity buy only)",
            BacktestResult::ValueBuy(_) => "Backtest result (value buy only)",
            BacktestResult::QuantityBuySell(_) => "Backtest result (quantity buy/sell)",
            BacktestResult::ValueBuySell(_) => "Backtest result (value buy/sell)",
            BacktestResult::QuantityDrip(_) => "Backtest result (quantity buy/sell with DRIP)",
            BacktestResult::ValueDrip(_) => "Backtest result (value buy/sell with DRIP)",
        }
    }
}
