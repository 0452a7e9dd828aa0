use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;

use crate::config::NotionConfig;
use crate::error::{AppError, Result};

use super::{DocumentStore, RecordPage};

pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

/// Notion database acting as the document store.
pub struct NotionStore {
    client: Client,
    base_url: String,
    token: String,
    database_id: String,
}

impl NotionStore {
    pub fn new(client: Client, config: &NotionConfig) -> Self {
        Self::with_base_url(client, config, NOTION_API_BASE)
    }

    pub fn with_base_url<B: Into<String>>(client: Client, config: &NotionConfig, base: B) -> Self {
        Self {
            client,
            base_url: base.into().trim_end_matches('/').to_string(),
            token: config.token.expose().to_string(),
            database_id: config.database_id.clone(),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }
}

async fn error_detail(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("HTTP {status}: {body}")
}

#[async_trait]
impl DocumentStore for NotionStore {
    async fn query_page(&self, cursor: Option<&str>) -> Result<RecordPage> {
        let url = format!("{}/databases/{}/query", self.base_url, self.database_id);
        let body = match cursor {
            Some(cursor) => json!({ "start_cursor": cursor }),
            None => json!({}),
        };

        let response = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::SourceList(error_detail(response).await));
        }

        let text = response.text().await?;
        let page = serde_json::from_str::<RecordPage>(&text)?;
        Ok(page)
    }

    async fn update_number(&self, record_id: &str, property: &str, value: f64) -> Result<()> {
        let url = format!("{}/pages/{}", self.base_url, record_id);
        let body = json!({ "properties": { property: { "number": value } } });

        let response = self
            .authorized(self.client.patch(&url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::RecordWrite {
                record_id: record_id.to_string(),
                reason: error_detail(response).await,
            });
        }
        Ok(())
    }
}
