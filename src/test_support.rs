//! In-memory collaborators for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::error::{AppError, Result};
use crate::fetch::{QuoteApi, QuoteFailure, QuoteResponse};
use crate::notify::Messenger;
use crate::records::{DocumentStore, PageEntry, RecordPage};

pub fn page_entry(id: &str, symbol: &str) -> PageEntry {
    let properties = json!({
        "Stock": {
            "type": "title",
            "title": [{"type": "text", "text": {"content": symbol}, "plain_text": symbol}]
        },
        "Price": {"type": "number", "number": null}
    });
    PageEntry {
        id: id.to_string(),
        properties: properties.as_object().cloned().unwrap_or_default(),
    }
}

pub fn single_page(entries: Vec<PageEntry>) -> RecordPage {
    RecordPage {
        results: entries,
        has_more: false,
        next_cursor: None,
    }
}

pub fn close(price: f64) -> std::result::Result<QuoteResponse, QuoteFailure> {
    Ok(QuoteResponse::ok(json!({"values": [{"close": price.to_string()}]})))
}

pub fn message(text: &str) -> std::result::Result<QuoteResponse, QuoteFailure> {
    Ok(QuoteResponse::ok(json!({"message": text, "status": "error"})))
}

#[derive(Default)]
pub struct FakeStore {
    pages: Mutex<VecDeque<Result<RecordPage>>>,
    cursors: Mutex<Vec<Option<String>>>,
    updates: Mutex<Vec<(String, String, f64)>>,
    write_attempts: AtomicUsize,
    failing: HashSet<String>,
}

impl FakeStore {
    pub fn with_pages(pages: Vec<Result<RecordPage>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    pub fn failing_writes_for(mut self, record_id: &str) -> Self {
        self.failing.insert(record_id.to_string());
        self
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(String, String, f64)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn query_page(&self, cursor: Option<&str>) -> Result<RecordPage> {
        self.cursors
            .lock()
            .unwrap()
            .push(cursor.map(str::to_string));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RecordPage::default()))
    }

    async fn update_number(&self, record_id: &str, property: &str, value: f64) -> Result<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(record_id) {
            return Err(AppError::RecordWrite {
                record_id: record_id.to_string(),
                reason: "HTTP 409".to_string(),
            });
        }
        self.updates
            .lock()
            .unwrap()
            .push((record_id.to_string(), property.to_string(), value));
        Ok(())
    }
}

/// Scripted quote API keyed by the comma-joined symbol list.
///
/// The last scripted reply for a key repeats; unscripted keys get an empty body.
#[derive(Default)]
pub struct FakeQuoteApi {
    scripts: Mutex<HashMap<String, VecDeque<std::result::Result<QuoteResponse, QuoteFailure>>>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl FakeQuoteApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, symbols: &str, reply: std::result::Result<QuoteResponse, QuoteFailure>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(symbols.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(symbols, _)| symbols.clone())
            .collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl QuoteApi for FakeQuoteApi {
    async fn time_series(&self, symbols: &[String]) -> std::result::Result<QuoteResponse, QuoteFailure> {
        let key = symbols.join(",");
        self.calls.lock().unwrap().push((key.clone(), Instant::now()));

        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(QuoteResponse::ok(Value::Object(Default::default())))),
            None => Ok(QuoteResponse::ok(Value::Object(Default::default()))),
        }
    }
}

#[derive(Default)]
pub struct FakeMessenger {
    sent: Mutex<Vec<String>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl FakeMessenger {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn send(&self, text: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Notify("HTTP 401 Unauthorized".to_string()));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
