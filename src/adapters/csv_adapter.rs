//! CSV file market data adapter.
//!
//! Layout under the root directory:
//!
//! ```text
//! prices/{TICKER}.csv      date,close
//! dividends/{TICKER}.csv   ex_date,amount
//! fx/{FROM}_{TO}.csv       date,rate
//! ```
//!
//! Lookups are exact-date. A ticker without a dividend file has an empty
//! schedule. When only the reverse FX file exists its rate is inverted.

use crate::domain::error::HindsightError;
use crate::domain::market_data::{DividendEvent, FxRate, PricePoint};
use crate::ports::dividend_port::DividendSource;
use crate::ports::fx_port::FxRateSource;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvMarketData {
    base_path: PathBuf,
}

impl CsvMarketData {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn price_path(&self, ticker: &str) -> PathBuf {
        self.base_path
            .join("prices")
            .join(format!("{}.csv", ticker.to_uppercase()))
    }

    fn dividend_path(&self, ticker: &str) -> PathBuf {
        self.base_path
            .join("dividends")
            .join(format!("{}.csv", ticker.to_uppercase()))
    }

    fn fx_path(&self, from: &str, to: &str) -> PathBuf {
        self.base_path.join("fx").join(format!("{}_{}.csv", from, to))
    }

    /// Full price history of a ticker, oldest first.
    pub fn price_history(&self, ticker: &str) -> Result<Vec<PricePoint>, String> {
        let rows = read_rows(&self.price_path(ticker))?;
        let mut points = rows
            .into_iter()
            .map(|(date, close)| PricePoint { date, close })
            .collect::<Vec<_>>();
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    /// Rate history for one currency pair, falling back to the inverted
    /// reverse pair.
    pub fn fx_history(&self, from: &str, to: &str) -> Result<Vec<FxRate>, String> {
        let direct = self.fx_path(from, to);
        if direct.exists() {
            return Ok(read_rows(&direct)?
                .into_iter()
                .map(|(date, rate)| FxRate {
                    from: from.to_string(),
                    to: to.to_string(),
                    date,
                    rate,
                })
                .collect());
        }

        let reverse = self.fx_path(to, from);
        if reverse.exists() {
            debug!(path = %reverse.display(), "using inverted reverse fx file");
            return Ok(read_rows(&reverse)?
                .into_iter()
                .map(|(date, rate)| {
                    FxRate {
                        from: to.to_string(),
                        to: from.to_string(),
                        date,
                        rate,
                    }
                    .inverse()
                })
                .collect());
        }

        Err(format!("no rate file for {}/{}", from, to))
    }
}

impl PriceSource for CsvMarketData {
    fn close_price(&self, ticker: &str, date: NaiveDate) -> Result<f64, HindsightError> {
        let unavailable = |reason: String| HindsightError::PriceUnavailable {
            ticker: ticker.to_string(),
            date,
            reason,
        };

        self.price_history(ticker)
            .map_err(unavailable)?
            .into_iter()
            .find(|p| p.date == date)
            .map(|p| p.close)
            .ok_or_else(|| unavailable(format!("no data for date {}", date)))
    }
}

impl DividendSource for CsvMarketData {
    fn schedule(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DividendEvent>, HindsightError> {
        let path = self.dividend_path(ticker);
        if !path.exists() {
            debug!(ticker, "no dividend file, assuming no dividends");
            return Ok(Vec::new());
        }

        let rows = read_rows(&path).map_err(|reason| HindsightError::DividendsUnavailable {
            ticker: ticker.to_string(),
            reason,
        })?;

        let mut events: Vec<DividendEvent> = rows
            .into_iter()
            .filter(|(date, _)| *date >= from && *date <= to)
            .map(|(ex_date, per_share_amount)| DividendEvent {
                ex_date,
                per_share_amount,
            })
            .collect();
        events.sort_by_key(|d| d.ex_date);
        Ok(events)
    }
}

impl FxRateSource for CsvMarketData {
    fn rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<f64, HindsightError> {
        let unavailable = |reason: String| HindsightError::RateUnavailable {
            from: from.to_string(),
            to: to.to_string(),
            date,
            reason,
        };

        self.fx_history(from, to)
            .map_err(unavailable)?
            .into_iter()
            .find(|r| r.date == date)
            .map(|r| r.rate)
            .ok_or_else(|| unavailable(format!("no rate for date {}", date)))
    }
}

/// Read a two-column `date,value` file with a header row.
fn read_rows(path: &Path) -> Result<Vec<(NaiveDate, f64)>, String> {
    debug!(path = %path.display(), "reading csv");
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| format!("CSV parse error: {}", e))?;

        let date_str = record.get(0).ok_or("missing date column")?;
        let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
            .map_err(|e| format!("invalid date format: {}", e))?;

        let value: f64 = record
            .get(1)
            .ok_or("missing value column")?
            .trim()
            .parse()
            .map_err(|e| format!("invalid value on {}: {}", date, e))?;

        rows.push((date, value));
    }

    Ok(rows)
}
