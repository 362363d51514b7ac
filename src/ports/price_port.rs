//! Historical close price port.

use crate::domain::error::HindsightError;
use chrono::NaiveDate;

pub trait PriceSource {
    /// Closing price of `ticker` on exactly `date`, in the asset's currency.
    ///
    /// Fails with [`HindsightError::PriceUnavailable`] when the source has
    /// no close for that day.
    fn close_price(&self, ticker: &str, date: NaiveDate) -> Result<f64, HindsightError>;
}
