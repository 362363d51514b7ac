//! Historical foreign-exchange rate port.

use crate::domain::error::HindsightError;
use chrono::NaiveDate;

pub trait FxRateSource {
    /// Units of `to` bought by one unit of `from` on `date`.
    fn rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<f64, HindsightError>;
}
