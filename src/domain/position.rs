//! Share count and value arithmetic.

use chrono::NaiveDate;

use crate::domain::error::HindsightError;

/// Shares bought with `value` (already in the asset's currency) at `close`.
///
/// A non-positive close is a data-integrity failure from the price source.
pub fn shares_from_value(
    value: f64,
    close: f64,
    ticker: &str,
    date: NaiveDate,
) -> Result<f64, HindsightError> {
    if !close.is_finite() || close <= 0.0 {
        return Err(HindsightError::InvalidPrice {
            ticker: ticker.to_string(),
            date,
            price: close,
        });
    }
    Ok(value / close)
}

pub fn value_from_shares(shares: f64, close: f64) -> f64 {
    shares * close
}

/// Percentage gain from `initial` to `final_value`; `None` when there is no
/// positive starting value.
pub fn return_pct(initial: f64, final_value: f64) -> Option<f64> {
    if initial > 0.0 {
        Some((final_value - initial) / initial * 100.0)
    } else {
        None
    }
}
