#![allow(dead_code)]

use chrono::NaiveDate;
use hindsight::domain::error::HindsightError;
use hindsight::domain::market_data::DividendEvent;
use hindsight::ports::dividend_port::DividendSource;
use hindsight::ports::fx_port::FxRateSource;
use hindsight::ports::price_port::PriceSource;
use std::cell::Cell;
use std::collections::HashMap;

/// In-memory market data with per-port call counters.
pub struct MockMarket {
    pub prices: HashMap<(String, NaiveDate), f64>,
    pub rates: HashMap<(String, String, NaiveDate), f64>,
    pub dividends: HashMap<String, Vec<DividendEvent>>,
    pub price_errors: HashMap<String, String>,
    pub fx_errors: HashMap<String, String>,
    pub dividend_errors: HashMap<String, String>,
    pub price_calls: Cell<usize>,
    pub fx_calls: Cell<usize>,
    pub dividend_calls: Cell<usize>,
}

impl MockMarket {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            rates: HashMap::new(),
            dividends: HashMap::new(),
            price_errors: HashMap::new(),
            fx_errors: HashMap::new(),
            dividend_errors: HashMap::new(),
            price_calls: Cell::new(0),
            fx_calls: Cell::new(0),
            dividend_calls: Cell::new(0),
        }
    }

    pub fn with_price(mut self, ticker: &str, day: &str, close: f64) -> Self {
        self.prices.insert((ticker.to_string(), d(day)), close);
        self
    }

    /// Registers `from->to` and its inverse.
    pub fn with_fx(mut self, from: &str, to: &str, day: &str, rate: f64) -> Self {
        self.rates
            .insert((from.to_string(), to.to_string(), d(day)), rate);
        self.rates
            .insert((to.to_string(), from.to_string(), d(day)), 1.0 / rate);
        self
    }

    pub fn with_dividend(mut self, ticker: &str, ex_date: &str, amount: f64) -> Self {
        self.dividends
            .entry(ticker.to_string())
            .or_default()
            .push(DividendEvent {
                ex_date: d(ex_date),
                per_share_amount: amount,
            });
        self
    }

    pub fn with_price_error(mut self, ticker: &str, reason: &str) -> Self {
        self.price_errors
            .insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn with_fx_error(mut self, from: &str, reason: &str) -> Self {
        self.fx_errors.insert(from.to_string(), reason.to_string());
        self
    }

    pub fn with_dividend_error(mut self, ticker: &str, reason: &str) -> Self {
        self.dividend_errors
            .insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn total_calls(&self) -> usize {
        self.price_calls.get() + self.fx_calls.get() + self.dividend_calls.get()
    }
}

impl PriceSource for MockMarket {
    fn close_price(&self, ticker: &str, date: NaiveDate) -> Result<f64, HindsightError> {
        self.price_calls.set(self.price_calls.get() + 1);
        if let Some(reason) = self.price_errors.get(ticker) {
            return Err(HindsightError::PriceUnavailable {
                ticker: ticker.to_string(),
                date,
                reason: reason.clone(),
            });
        }
        self.prices
            .get(&(ticker.to_string(), date))
            .copied()
            .ok_or_else(|| HindsightError::PriceUnavailable {
                ticker: ticker.to_string(),
                date,
                reason: format!("no data for date {}", date),
            })
    }
}

impl FxRateSource for MockMarket {
    fn rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<f64, HindsightError> {
        self.fx_calls.set(self.fx_calls.get() + 1);
        if let Some(reason) = self.fx_errors.get(from) {
            return Err(HindsightError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
                date,
                reason: reason.clone(),
            });
        }
        self.rates
            .get(&(from.to_string(), to.to_string(), date))
            .copied()
            .ok_or_else(|| HindsightError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
                date,
                reason: "no rate".to_string(),
            })
    }
}

impl DividendSource for MockMarket {
    fn schedule(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DividendEvent>, HindsightError> {
        self.dividend_calls.set(self.dividend_calls.get() + 1);
        if let Some(reason) = self.dividend_errors.get(ticker) {
            return Err(HindsightError::DividendsUnavailable {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .dividends
            .get(ticker)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.ex_date >= from && e.ex_date <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Market with the AAPL closes and EUR/GBP rates used across the tests.
pub fn sample_market() -> MockMarket {
    MockMarket::new()
        .with_price("AAPL", "2025-07-18", 211.18)
        .with_price("AAPL", "2025-07-17", 210.02)
        .with_price("AAPL", "2025-03-31", 200.50)
        .with_price("AAPL", "2025-06-20", 205.75)
        .with_fx("EUR", "USD", "2025-07-18", 1.0815)
        .with_fx("EUR", "USD", "2025-03-31", 1.0500)
        .with_fx("EUR", "USD", "2025-06-20", 1.0700)
        .with_fx("GBP", "USD", "2025-07-18", 1.0 / 0.85)
        .with_fx("GBP", "USD", "2025-03-31", 1.0 / 0.80)
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn date(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}
