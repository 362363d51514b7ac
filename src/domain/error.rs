//! Domain error types.

use chrono::NaiveDate;
use serde::Serialize;

/// Top-level error type for hindsight.
#[derive(Debug, thiserror::Error)]
pub enum HindsightError {
    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("invalid type parameter {value:?}: must be 'stock' or 'crypto'")]
    InvalidType { value: String },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("no close price for {ticker} on {date}: {reason}")]
    PriceUnavailable {
        ticker: String,
        date: NaiveDate,
        reason: String,
    },

    #[error("no {from}->{to} rate on {date}: {reason}")]
    RateUnavailable {
        from: String,
        to: String,
        date: NaiveDate,
        reason: String,
    },

    #[error("dividend schedule unavailable for {ticker}: {reason}")]
    DividendsUnavailable { ticker: String, reason: String },

    #[error("unusable price {price} for {ticker} on {date}")]
    InvalidPrice {
        ticker: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HindsightError {
    /// True for errors caused by the request itself rather than a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            HindsightError::InvalidAmount { .. }
                | HindsightError::InvalidType { .. }
                | HindsightError::InvalidRequest { .. }
        )
    }

    /// Short category message used as the `error` field of an [`ErrorRecord`].
    pub fn summary(&self) -> &'static str {
        match self {
            HindsightError::InvalidAmount { .. } => "Invalid amount format",
            HindsightError::InvalidType { .. } => "Invalid type parameter",
            HindsightError::InvalidRequest { .. } => "Invalid request",
            HindsightError::PriceUnavailable { .. } | HindsightError::InvalidPrice { .. } => {
                "Failed to fetch stock price"
            }
            HindsightError::RateUnavailable { .. } => "Failed to fetch FX rate",
            HindsightError::DividendsUnavailable { .. } => "Failed to fetch dividends",
            HindsightError::ConfigParse { .. } | HindsightError::ConfigInvalid { .. } => {
                "Invalid configuration"
            }
            HindsightError::Io(_) => "I/O error",
        }
    }
}

/// Serializable `{error, details}` record emitted in place of a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub error: String,
    pub details: String,
}

impl From<&HindsightError> for ErrorRecord {
    fn from(err: &HindsightError) -> Self {
        Self {
            error: err.summary().to_string(),
            details: err.to_string(),
        }
    }
}

impl From<&HindsightError> for std::process::ExitCode {
    fn from(err: &HindsightError) -> Self {
        let code: u8 = match err {
            HindsightError::Io(_) => 1,
            HindsightError::ConfigParse { .. } | HindsightError::ConfigInvalid { .. } => 2,
            HindsightError::InvalidAmount { .. }
            | HindsightError::InvalidType { .. }
            | HindsightError::InvalidRequest { .. } => 3,
            HindsightError::PriceUnavailable { .. }
            | HindsightError::RateUnavailable { .. }
            | HindsightError::DividendsUnavailable { .. }
            | HindsightError::InvalidPrice { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
