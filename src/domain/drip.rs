//! Dividend reinvestment (DRIP) simulation.
//!
//! Each dividend is paid on every share held at its ex-date, including
//! shares bought by earlier reinvestments, so the position compounds.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::domain::error::HindsightError;
use crate::domain::market_data::DividendEvent;
use crate::ports::price_port::PriceSource;

/// One reinvested dividend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reinvestment {
    pub date: NaiveDate,
    pub cash: f64,
    pub price: f64,
    pub shares: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DripResult {
    pub reinvested_shares: f64,
    /// Chronological, one entry per dividend that produced cash.
    pub reinvestments: Vec<Reinvestment>,
}

/// Price at which a dividend's cash buys new shares.
pub trait ReinvestmentPricer {
    fn price_for(&self, event: &DividendEvent) -> Result<f64, HindsightError>;
}

/// Every dividend is reinvested at one fixed price (the buy-date close).
#[derive(Debug, Clone, Copy)]
pub struct ConstantPrice(pub f64);

impl ReinvestmentPricer for ConstantPrice {
    fn price_for(&self, _event: &DividendEvent) -> Result<f64, HindsightError> {
        Ok(self.0)
    }
}

/// Each dividend is reinvested at the close on its own ex-date.
pub struct ExDatePrice<'a> {
    pub source: &'a dyn PriceSource,
    pub ticker: &'a str,
}

impl ReinvestmentPricer for ExDatePrice<'_> {
    fn price_for(&self, event: &DividendEvent) -> Result<f64, HindsightError> {
        self.source.close_price(self.ticker, event.ex_date)
    }
}

/// Dividends with an ex-date in `[buy, sell]`. A same-day round trip has no
/// window at all.
pub fn window(dividends: &[DividendEvent], buy: NaiveDate, sell: NaiveDate) -> Vec<DividendEvent> {
    if buy >= sell {
        return Vec::new();
    }
    dividends
        .iter()
        .filter(|d| d.ex_date >= buy && d.ex_date <= sell)
        .cloned()
        .collect()
}

/// Reinvest each dividend of `ticker` in turn, compounding into the
/// shares held for the next one.
pub fn simulate(
    ticker: &str,
    initial_shares: f64,
    dividends: &[DividendEvent],
    pricer: &dyn ReinvestmentPricer,
) -> Result<DripResult, HindsightError> {
    let mut events: Vec<&DividendEvent> = dividends.iter().collect();
    events.sort_by_key(|d| d.ex_date);

    let mut shares = initial_shares;
    let mut result = DripResult::default();

    for event in events {
        let cash = shares * event.per_share_amount;
        if cash.is_nan() || cash <= 0.0 {
            debug!(ex_date = %event.ex_date, "skipping dividend with no cash");
            continue;
        }

        let price = pricer.price_for(event)?;
        if !price.is_finite() || price <= 0.0 {
            return Err(HindsightError::InvalidPrice {
                ticker: ticker.to_string(),
                date: event.ex_date,
                price,
            });
        }

        let bought = cash / price;
        shares += bought;
        result.reinvested_shares += bought;
        result.reinvestments.push(Reinvestment {
            date: event.ex_date,
            cash,
            price,
            shares: bought,
        });
    }

    Ok(result)
}
