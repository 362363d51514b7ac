//! Market data values handed to the core by the collaborator ports.

use chrono::NaiveDate;
use serde::Serialize;

/// A closing price for one trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// 1 unit of `from` buys `rate` units of `to` on `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct FxRate {
    pub from: String,
    pub to: String,
    pub date: NaiveDate,
    pub rate: f64,
}

impl FxRate {
    /// The same quote seen from the other side of the pair.
    pub fn inverse(&self) -> FxRate {
        FxRate {
            from: self.to.clone(),
            to: self.from.clone(),
            date: self.date,
            rate: 1.0 / self.rate,
        }
    }
}

/// A cash dividend paid per share held at the ex-dividend date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendEvent {
    pub ex_date: NaiveDate,
    pub per_share_amount: f64,
}
