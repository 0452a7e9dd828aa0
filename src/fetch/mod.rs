use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod decode;
pub mod limiter;
pub mod quotes;
pub mod retry;
pub mod twelve_data;

pub use limiter::{RateLimitWindow, RateLimiter};
pub use quotes::PriceFetcher;
pub use retry::{RetryDecision, RetryPolicy};
pub use twelve_data::TwelveDataClient;

/// Provider-imposed ceiling on symbols per multi-symbol request.
pub const BATCH_SYMBOL_LIMIT: usize = 8;

/// Why one attempt at fetching a quote did not yield a price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteFailure {
    #[error("no price data returned")]
    NoData,
    #[error("quote API rate limit reached")]
    RateLimited,
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected quote response: {0}")]
    Unknown(String),
}

/// Final outcome of fetching one symbol's latest close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceQuoteResult {
    Price(f64),
    NoData,
    RateLimited,
    InvalidSymbol,
    NetworkError,
    UnknownError,
}

impl PriceQuoteResult {
    pub fn price(&self) -> Option<f64> {
        match self {
            PriceQuoteResult::Price(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<Result<f64, QuoteFailure>> for PriceQuoteResult {
    fn from(result: Result<f64, QuoteFailure>) -> Self {
        match result {
            Ok(price) => PriceQuoteResult::Price(price),
            Err(QuoteFailure::NoData) => PriceQuoteResult::NoData,
            Err(QuoteFailure::RateLimited) => PriceQuoteResult::RateLimited,
            Err(QuoteFailure::InvalidSymbol(_)) => PriceQuoteResult::InvalidSymbol,
            Err(QuoteFailure::Network(_)) => PriceQuoteResult::NetworkError,
            Err(QuoteFailure::Unknown(_)) => PriceQuoteResult::UnknownError,
        }
    }
}

/// Raw reply from the quote API: HTTP status plus the parsed JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteResponse {
    pub status: u16,
    pub body: Value,
}

impl QuoteResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

/// Transport seam for the time-series endpoint.
///
/// Implementations only report transport-level problems as `Network` or
/// `Unknown`; classifying the body is left to [`decode`].
#[async_trait]
pub trait QuoteApi: Send + Sync {
    async fn time_series(&self, symbols: &[String]) -> Result<QuoteResponse, QuoteFailure>;
}
