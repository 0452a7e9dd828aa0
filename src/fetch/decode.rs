use std::collections::HashMap;

use serde_json::Value;

use super::{QuoteFailure, QuoteResponse};

const RATE_LIMIT_MARKERS: [&str; 2] = ["rate limit", "api credits"];
const INVALID_SYMBOL_MARKERS: [&str; 2] = ["invalid", "not found"];

/// Classify a provider error message embedded in a JSON body.
pub fn classify_message(message: &str) -> QuoteFailure {
    let lower = message.to_lowercase();
    if RATE_LIMIT_MARKERS.iter().any(|marker| lower.contains(marker)) {
        QuoteFailure::RateLimited
    } else if INVALID_SYMBOL_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
    {
        QuoteFailure::InvalidSymbol(message.to_string())
    } else {
        QuoteFailure::Unknown(message.to_string())
    }
}

/// Failure signalled by an object's `message` field, if present.
pub fn message_failure(body: &Value) -> Option<QuoteFailure> {
    body.get("message")
        .and_then(Value::as_str)
        .map(classify_message)
}

/// Failure implied by the HTTP status alone.
pub fn status_failure(status: u16) -> Option<QuoteFailure> {
    match status {
        200..=299 => None,
        429 => Some(QuoteFailure::RateLimited),
        500..=599 => Some(QuoteFailure::Network(format!("HTTP {status}"))),
        other => Some(QuoteFailure::Unknown(format!("HTTP {other}"))),
    }
}

fn number_field(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    };
    parsed.filter(|price| price.is_finite())
}

/// Close (falling back to open) of the most recent entry in a series object.
pub fn latest_price(series: &Value) -> Option<f64> {
    let latest = series.get("values")?.as_array()?.first()?;
    latest
        .get("close")
        .and_then(number_field)
        .or_else(|| latest.get("open").and_then(number_field))
}

/// Decode a single-symbol time-series reply.
pub fn decode_single(response: &QuoteResponse) -> Result<f64, QuoteFailure> {
    if let Some(failure) = message_failure(&response.body) {
        return Err(failure);
    }
    if let Some(failure) = status_failure(response.status) {
        return Err(failure);
    }
    latest_price(&response.body).ok_or(QuoteFailure::NoData)
}

/// Decode a multi-symbol reply into the prices it carries.
///
/// Symbols missing from the body, or whose entry lacks a usable series, are
/// left out of the map. The whole batch only fails when the provider
/// rejected the request itself, or every entry came back rate limited.
pub fn decode_batch(
    response: &QuoteResponse,
    symbols: &[String],
) -> Result<HashMap<String, f64>, QuoteFailure> {
    if let Some(failure) = message_failure(&response.body) {
        return Err(failure);
    }
    if let Some(failure) = status_failure(response.status) {
        return Err(failure);
    }

    // A one-symbol request comes back in the single-series shape.
    if let [only] = symbols {
        if response.body.get("values").is_some() {
            let mut prices = HashMap::new();
            if let Some(price) = latest_price(&response.body) {
                prices.insert(only.clone(), price);
            }
            return Ok(prices);
        }
    }

    let mut prices = HashMap::new();
    let mut rate_limited = 0usize;
    for symbol in symbols {
        let Some(entry) = response.body.get(symbol) else {
            log::warn!("batch response has no entry for {symbol}");
            continue;
        };

        if let Some(failure) = message_failure(entry) {
            if failure == QuoteFailure::RateLimited {
                rate_limited += 1;
            }
            log::warn!("batch entry for {symbol} failed: {failure}");
            continue;
        }

        match latest_price(entry) {
            Some(price) => {
                prices.insert(symbol.clone(), price);
            }
            None => log::warn!("batch entry for {symbol} has no values"),
        }
    }

    if prices.is_empty() && rate_limited > 0 && rate_limited == symbols.len() {
        return Err(QuoteFailure::RateLimited);
    }

    Ok(prices)
}
