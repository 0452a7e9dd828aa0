use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::Secret;

use super::{QuoteApi, QuoteFailure, QuoteResponse};

pub const TIME_SERIES_ENDPOINT: &str = "https://api.twelvedata.com/time_series";
const INTERVAL: &str = "1day";
// Two bars so the latest completed session is always present.
const OUTPUT_SIZE: &str = "2";

/// Twelve Data `time_series` client.
pub struct TwelveDataClient {
    client: Client,
    endpoint: String,
    api_key: Secret,
}

impl TwelveDataClient {
    pub fn new(client: Client, api_key: Secret) -> Self {
        Self::with_endpoint(client, api_key, TIME_SERIES_ENDPOINT)
    }

    pub fn with_endpoint<E: Into<String>>(client: Client, api_key: Secret, endpoint: E) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl QuoteApi for TwelveDataClient {
    async fn time_series(&self, symbols: &[String]) -> Result<QuoteResponse, QuoteFailure> {
        let joined = symbols.join(",");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("symbol", joined.as_str()),
                ("interval", INTERVAL),
                ("outputsize", OUTPUT_SIZE),
                ("apikey", self.api_key.expose()),
            ])
            .send()
            .await
            .map_err(|err| QuoteFailure::Network(err.without_url().to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| QuoteFailure::Network(err.without_url().to_string()))?;

        let body: Value = serde_json::from_str(&text).map_err(|err| {
            if status >= 500 {
                QuoteFailure::Network(format!("HTTP {status}"))
            } else {
                QuoteFailure::Unknown(format!("response for {joined} is not JSON: {err}"))
            }
        })?;

        Ok(QuoteResponse { status, body })
    }
}
