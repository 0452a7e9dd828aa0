use std::sync::Arc;

use serde_json::Value;

use crate::config::ExclusionKeywords;

use super::{DocumentStore, PageEntry, StockRecord};

/// Walks every page of the document store and yields the tracked symbols.
pub struct SymbolSource {
    store: Arc<dyn DocumentStore>,
    symbol_property: String,
    exclusions: ExclusionKeywords,
}

impl SymbolSource {
    pub fn new<P: Into<String>>(
        store: Arc<dyn DocumentStore>,
        symbol_property: P,
        exclusions: ExclusionKeywords,
    ) -> Self {
        Self {
            store,
            symbol_property: symbol_property.into(),
            exclusions,
        }
    }

    /// List every non-excluded record.
    ///
    /// A failing page ends the listing early; whatever was gathered before it
    /// is still returned.
    pub async fn list_symbols(&self) -> Vec<StockRecord> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = match self.store.query_page(cursor.as_deref()).await {
                Ok(page) => page,
                Err(err) => {
                    log::error!(
                        "stopped listing symbols after {} records: {err}",
                        records.len()
                    );
                    break;
                }
            };

            for entry in &page.results {
                let Some(symbol) = extract_symbol(entry, &self.symbol_property) else {
                    log::debug!("record {} has no {} title", entry.id, self.symbol_property);
                    continue;
                };

                if let Some(keyword) = self.exclusions.matching(&symbol) {
                    log::info!("skipping {symbol}: contains excluded keyword `{keyword}`");
                    continue;
                }

                records.push(StockRecord::new(entry.id.clone(), symbol));
            }

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) if cursor.as_deref() == Some(next.as_str()) => {
                    log::warn!("store returned cursor {next} again; stopping");
                    break;
                }
                (true, Some(next)) => cursor = Some(next),
                (true, None) => {
                    log::warn!("store reported more pages without a cursor; stopping");
                    break;
                }
                (false, _) => break,
            }
        }

        log::debug!("listed records: {records:?}");
        records
    }
}

/// First text segment of the title property, if present and non-empty.
pub fn extract_symbol(entry: &PageEntry, property: &str) -> Option<String> {
    let field = entry.properties.get(property)?;
    if field.get("type").and_then(Value::as_str) != Some("title") {
        return None;
    }

    let first = field.get("title")?.as_array()?.first()?;
    let text = first
        .pointer("/text/content")
        .and_then(Value::as_str)
        .or_else(|| first.get("plain_text").and_then(Value::as_str))?
        .trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordPage;
    use crate::test_support::{page_entry, FakeStore};
    use serde_json::json;

    fn source(store: &Arc<FakeStore>, exclusions: &str) -> SymbolSource {
        SymbolSource::new(store.clone(), "Stock", ExclusionKeywords::parse(exclusions))
    }

    #[tokio::test]
    async fn follows_cursors_across_pages() {
        let store = Arc::new(FakeStore::with_pages(vec![
            Ok(RecordPage {
                results: vec![page_entry("p1", "AAPL"), page_entry("p2", "MSFT")],
                has_more: true,
                next_cursor: Some("c1".into()),
            }),
            Ok(RecordPage {
                results: vec![page_entry("p3", "GOOG")],
                has_more: false,
                next_cursor: None,
            }),
        ]));

        let records = source(&store, "").list_symbols().await;

        let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAPL", "MSFT", "GOOG"]);
        assert_eq!(records[2].record_id, "p3");
        assert_eq!(store.cursors(), vec![None, Some("c1".to_string())]);
    }

    #[tokio::test]
    async fn excluded_keywords_filter_by_substring() {
        let store = Arc::new(FakeStore::with_pages(vec![Ok(RecordPage {
            results: vec![page_entry("p1", "TESTSTOCK"), page_entry("p2", "GOOG")],
            has_more: false,
            next_cursor: None,
        })]));

        let records = source(&store, "TEST").list_symbols().await;

        assert_eq!(records, vec![StockRecord::new("p2", "GOOG")]);
    }

    #[tokio::test]
    async fn skips_records_without_a_title() {
        let untitled = PageEntry {
            id: "p2".into(),
            properties: json!({"Stock": {"type": "title", "title": []}})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        };
        let wrong_type = PageEntry {
            id: "p3".into(),
            properties: json!({"Stock": {"type": "rich_text", "rich_text": []}})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        };
        let store = Arc::new(FakeStore::with_pages(vec![Ok(RecordPage {
            results: vec![page_entry("p1", "AAPL"), untitled, wrong_type, PageEntry::default()],
            has_more: false,
            next_cursor: None,
        })]));

        let records = source(&store, "").list_symbols().await;

        assert_eq!(records, vec![StockRecord::new("p1", "AAPL")]);
    }

    #[tokio::test]
    async fn query_error_returns_partial_listing() {
        let store = Arc::new(FakeStore::with_pages(vec![
            Ok(RecordPage {
                results: vec![page_entry("p1", "AAPL")],
                has_more: true,
                next_cursor: Some("c1".into()),
            }),
            Err(crate::error::AppError::SourceList("HTTP 502".into())),
        ]));

        let records = source(&store, "").list_symbols().await;

        assert_eq!(records, vec![StockRecord::new("p1", "AAPL")]);
    }

    #[tokio::test]
    async fn missing_cursor_ends_pagination() {
        let store = Arc::new(FakeStore::with_pages(vec![Ok(RecordPage {
            results: vec![page_entry("p1", "AAPL")],
            has_more: true,
            next_cursor: None,
        })]));

        let records = source(&store, "").list_symbols().await;

        assert_eq!(records.len(), 1);
        assert_eq!(store.cursors().len(), 1);
    }

    #[tokio::test]
    async fn repeated_cursor_ends_pagination() {
        let stuck = |id: &str, symbol: &str| -> crate::error::Result<RecordPage> {
            Ok(RecordPage {
                results: vec![page_entry(id, symbol)],
                has_more: true,
                next_cursor: Some("c1".into()),
            })
        };
        let store = Arc::new(FakeStore::with_pages(vec![
            stuck("p1", "AAPL"),
            stuck("p2", "MSFT"),
            stuck("p3", "GOOG"),
        ]));

        let records = source(&store, "").list_symbols().await;

        let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAPL", "MSFT"]);
        assert_eq!(store.cursors(), vec![None, Some("c1".to_string())]);
    }

    #[test]
    fn extracts_plain_text_when_content_missing() {
        let entry = PageEntry {
            id: "p1".into(),
            properties: json!({"Stock": {"type": "title", "title": [{"plain_text": " NVDA "}]}})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        };
        assert_eq!(extract_symbol(&entry, "Stock").as_deref(), Some("NVDA"));
        assert_eq!(extract_symbol(&entry, "Ticker"), None);
    }
}
