use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::time::sleep;

use super::decode::{decode_batch, decode_single};
use super::{
    PriceQuoteResult, QuoteApi, QuoteFailure, QuoteResponse, RateLimiter, RetryDecision,
    RetryPolicy, BATCH_SYMBOL_LIMIT,
};

/// Rate-limited, retrying front end over a [`QuoteApi`].
pub struct PriceFetcher {
    api: Arc<dyn QuoteApi>,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
}

impl PriceFetcher {
    pub fn new(api: Arc<dyn QuoteApi>, limiter: Arc<RateLimiter>) -> Self {
        Self::with_policy(api, limiter, RetryPolicy::default())
    }

    pub fn with_policy(
        api: Arc<dyn QuoteApi>,
        limiter: Arc<RateLimiter>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            api,
            limiter,
            policy,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Latest close for one symbol, one limiter charge per attempt.
    pub async fn fetch(&self, symbol: &str) -> PriceQuoteResult {
        let symbols = [symbol.to_string()];
        let result = self.request_with_retry(symbol, &symbols, decode_single).await;
        match &result {
            Ok(price) => log::info!("fetched {symbol}: {price}"),
            Err(failure) => log::warn!("no price for {symbol}: {failure}"),
        }
        result.into()
    }

    /// Latest closes for several symbols, one request per chunk of
    /// [`BATCH_SYMBOL_LIMIT`] distinct symbols.
    ///
    /// Symbols the provider did not price are absent from the result.
    pub async fn fetch_batch(&self, symbols: &[String]) -> HashMap<String, f64> {
        let mut seen = HashSet::new();
        let distinct: Vec<String> = symbols
            .iter()
            .filter(|symbol| seen.insert(symbol.as_str()))
            .cloned()
            .collect();

        let mut prices = HashMap::new();
        for chunk in distinct.chunks(BATCH_SYMBOL_LIMIT) {
            let label = chunk.join(",");
            let decode = |response: &QuoteResponse| decode_batch(response, chunk);
            match self.request_with_retry(&label, chunk, decode).await {
                Ok(found) => {
                    log::info!("batch [{label}] priced {}/{}", found.len(), chunk.len());
                    prices.extend(found);
                }
                Err(failure) => log::warn!("batch [{label}] yielded no prices: {failure}"),
            }
        }
        prices
    }

    async fn request_with_retry<T, D>(
        &self,
        label: &str,
        symbols: &[String],
        decode: D,
    ) -> Result<T, QuoteFailure>
    where
        D: Fn(&QuoteResponse) -> Result<T, QuoteFailure>,
    {
        let mut attempt = 0;
        loop {
            self.limiter.acquire().await;
            let outcome = match self.api.time_series(symbols).await {
                Ok(response) => {
                    log::debug!("quote response for {label}: {}", response.body);
                    decode(&response)
                }
                Err(failure) => Err(failure),
            };

            let failure = match outcome {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };

            match self.policy.decide(&failure, attempt) {
                RetryDecision::Retry {
                    delay,
                    reset_window,
                } => {
                    log::warn!(
                        "attempt {}/{} for {label} failed ({failure}), retrying in {}s",
                        attempt + 1,
                        self.policy.max_attempts,
                        delay.as_secs()
                    );
                    sleep(delay).await;
                    if reset_window {
                        self.limiter.reset().await;
                    }
                    attempt += 1;
                }
                RetryDecision::GiveUp => return Err(failure),
                RetryDecision::Exhausted { cooldown } => {
                    log::error!(
                        "giving up on {label} after {} attempts: {failure}",
                        attempt + 1
                    );
                    if let Some(cooldown) = cooldown {
                        sleep(cooldown).await;
                        self.limiter.reset().await;
                    }
                    return Err(failure);
                }
            }
        }
    }
}
