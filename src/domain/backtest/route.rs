//! URL-style request paths.
//!
//! Accepted shapes (leading `/` optional, segments percent-decoded):
//!
//! ```text
//! {amount}[/of]/{ticker}/on/{buy}
//! {amount}[/of]/{ticker}/on/{buy}/and-sold-on/{sell}
//! {amount}[/of]/{ticker}/on/{buy}/and-sold-on/{sell}/with-drip
//! ```
//!
//! The `/of/` marker requests value mode; a `?type=` query selects the asset
//! type unless one is passed explicitly.

use super::RawRequest;
use crate::domain::error::HindsightError;

pub fn parse_route(path: &str, asset_type: Option<&str>) -> Result<RawRequest, HindsightError> {
    let (path, query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    };

    let segments = path
        .trim_matches('/')
        .split('/')
        .map(decode)
        .collect::<Result<Vec<String>, _>>()?;
    let segs: Vec<&str> = segments.iter().map(String::as_str).collect();

    let (value_marker, rest) = match segs.as_slice() {
        [amount, "of", ticker, "on", buy, rest @ ..] => (true, (*amount, *ticker, *buy, rest)),
        [amount, ticker, "on", buy, rest @ ..] => (false, (*amount, *ticker, *buy, rest)),
        _ => return Err(unknown(path)),
    };
    let (amount, ticker, buy, tail) = rest;

    let (sell_date, drip) = match tail {
        [] => (None, false),
        ["and-sold-on", sell] => (Some(sell.to_string()), false),
        ["and-sold-on", sell, "with-drip"] => (Some(sell.to_string()), true),
        _ => return Err(unknown(path)),
    };

    let asset_type = match asset_type {
        Some(t) => Some(t.to_string()),
        None => query.map(query_type).transpose()?.flatten(),
    };

    Ok(RawRequest {
        amount: amount.to_string(),
        ticker: ticker.to_string(),
        buy_date: buy.to_string(),
        sell_date,
        drip,
        asset_type,
        value_marker,
    })
}

fn decode(segment: &str) -> Result<String, HindsightError> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|e| HindsightError::InvalidRequest {
            reason: format!("bad path segment {:?}: {}", segment, e),
        })
}

fn query_type(query: &str) -> Result<Option<String>, HindsightError> {
    for pair in query.split('&') {
        if let Some(("type", value)) = pair.split_once('=') {
            return decode(value).map(Some);
        }
    }
    Ok(None)
}

fn unknown(path: &str) -> HindsightError {
    HindsightError::InvalidRequest {
        reason: format!("unrecognized request path {:?}", path),
    }
}
