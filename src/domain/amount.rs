//! Amount token parsing.
//!
//! An amount token is free-form text such as `10`, `1000EUR`, `$250.5` or
//! `€1000`. Two independent scans run over the token: one for the first
//! numeric substring, one for the first currency indicator (a Unicode
//! currency symbol or a run of three uppercase letters). A comma is never a
//! decimal separator, so `1000,50` reads as `1000`.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::HindsightError;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?[0-9]*\.?[0-9]+").expect("valid number pattern"));

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Sc}|[A-Z]{3}").expect("valid currency pattern"));

/// A parsed amount token. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAmount {
    magnitude: f64,
    currency_token: String,
    is_monetary_value: bool,
}

impl ParsedAmount {
    /// Strictly positive numeric value of the token.
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Currency code or symbol exactly as it appeared; empty when none.
    pub fn currency_token(&self) -> &str {
        &self.currency_token
    }

    pub fn currency(&self) -> Option<&str> {
        if self.currency_token.is_empty() {
            None
        } else {
            Some(&self.currency_token)
        }
    }

    pub fn is_monetary_value(&self) -> bool {
        self.is_monetary_value
    }
}

/// Parse a raw amount token. A detected currency marks the amount as a
/// monetary value; otherwise it is a share/unit quantity.
pub fn parse(raw: &str) -> Result<ParsedAmount, HindsightError> {
    parse_with_marker(raw, false)
}

/// Parse a raw amount token, treating a bare number as a monetary value when
/// `value_marker` is set. A currency token, when present, always wins.
pub fn parse_with_marker(raw: &str, value_marker: bool) -> Result<ParsedAmount, HindsightError> {
    let invalid = |reason: &str| HindsightError::InvalidAmount {
        input: raw.to_string(),
        reason: reason.to_string(),
    };

    let number = NUMBER_RE
        .find(raw)
        .ok_or_else(|| invalid("no numeric value found"))?;
    let magnitude: f64 = number
        .as_str()
        .parse()
        .map_err(|e| invalid(&format!("{}", e)))?;

    if !magnitude.is_finite() {
        return Err(invalid("amount is not a finite number"));
    }
    if magnitude <= 0.0 {
        return Err(invalid("amount must be positive"));
    }

    let currency_token = CURRENCY_RE
        .find(raw)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let is_monetary_value = !currency_token.is_empty() || value_marker;

    Ok(ParsedAmount {
        magnitude,
        currency_token,
        is_monetary_value,
    })
}
