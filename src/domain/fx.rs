//! Historical currency conversion.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::error::HindsightError;
use crate::ports::fx_port::FxRateSource;

const SYMBOL_CODES: &[(&str, &str)] = &[
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₹", "INR"),
    ("₩", "KRW"),
    ("₽", "RUB"),
    ("₺", "TRY"),
    ("₪", "ILS"),
    ("₫", "VND"),
    ("₱", "PHP"),
    ("₴", "UAH"),
    ("₦", "NGN"),
    ("฿", "THB"),
    ("₿", "BTC"),
];

/// Resolve a parsed currency token (code or symbol) to a three-letter code.
///
/// Returns `None` for symbols with no known code.
pub fn currency_code(token: &str) -> Option<String> {
    if token.len() == 3 && token.chars().all(|c| c.is_ascii_uppercase()) {
        return Some(token.to_string());
    }
    SYMBOL_CODES
        .iter()
        .find(|(symbol, _)| *symbol == token)
        .map(|(_, code)| code.to_string())
}

pub struct FxConverter<'a> {
    source: &'a dyn FxRateSource,
}

impl<'a> FxConverter<'a> {
    pub fn new(source: &'a dyn FxRateSource) -> Self {
        Self { source }
    }

    /// Units of `to` per unit of `from` on `date`. Identical currencies
    /// short-circuit to 1.0 without touching the rate source.
    pub fn rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<f64, HindsightError> {
        if from == to {
            return Ok(1.0);
        }

        debug!(from, to, %date, "fetching fx rate");
        let rate = self.source.rate(from, to, date)?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(HindsightError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
                date,
                reason: format!("source returned unusable rate {}", rate),
            });
        }
        Ok(rate)
    }

    pub fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<f64, HindsightError> {
        Ok(amount * self.rate(from, to, date)?)
    }
}
