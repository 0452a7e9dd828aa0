use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

pub mod notion;
pub mod source;
pub mod updater;

pub use notion::NotionStore;
pub use source::{extract_symbol, SymbolSource};
pub use updater::{RecordUpdater, UpdateStatus};

/// One tracked ticker and the document-store handle it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockRecord {
    pub record_id: String,
    pub symbol: String,
}

impl StockRecord {
    pub fn new<I: Into<String>, S: Into<String>>(record_id: I, symbol: S) -> Self {
        Self {
            record_id: record_id.into(),
            symbol: symbol.into(),
        }
    }
}

/// Per-record result of one run, used for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeEntry {
    pub symbol: String,
    pub price: Option<f64>,
}

impl OutcomeEntry {
    pub fn new<S: Into<String>>(symbol: S, price: Option<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.price.is_some()
    }
}

/// A raw record as returned by a listing call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageEntry {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub results: Vec<PageEntry>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Seam over the hosted database holding one record per symbol.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List one page of records, starting after `cursor` when given.
    async fn query_page(&self, cursor: Option<&str>) -> Result<RecordPage>;

    /// Set a numeric property on a single record.
    async fn update_number(&self, record_id: &str, property: &str, value: f64) -> Result<()>;
}
