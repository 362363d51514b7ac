//! Dividend schedule port.

use crate::domain::error::HindsightError;
use crate::domain::market_data::DividendEvent;
use chrono::NaiveDate;

pub trait DividendSource {
    /// Cash dividends of `ticker` with an ex-date in `[from, to]`, oldest first.
    /// A ticker that never paid a dividend yields an empty schedule.
    fn schedule(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DividendEvent>, HindsightError>;
}
