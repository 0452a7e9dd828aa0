use serde::Serialize;

use crate::records::OutcomeEntry;

pub const STATUS_OK: u16 = 200;

/// Result of one sync run, shaped like the handler response callers expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub status_code: u16,
    pub body: String,
    pub outcomes: Vec<OutcomeEntry>,
    pub notified: bool,
}

impl RunReport {
    pub fn no_symbols() -> Self {
        Self {
            status_code: STATUS_OK,
            body: "no stock symbols found".to_string(),
            outcomes: Vec::new(),
            notified: false,
        }
    }

    pub fn completed(outcomes: Vec<OutcomeEntry>, notified: bool) -> Self {
        let body = format!(
            "all stock prices updated ({}/{} priced)",
            count_succeeded(&outcomes),
            outcomes.len()
        );
        Self {
            status_code: STATUS_OK,
            body,
            outcomes,
            notified,
        }
    }

    pub fn dry_run(outcomes: Vec<OutcomeEntry>) -> Self {
        Self {
            status_code: STATUS_OK,
            body: "dry run finished".to_string(),
            outcomes,
            notified: false,
        }
    }

    pub fn succeeded(&self) -> usize {
        count_succeeded(&self.outcomes)
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

fn count_succeeded(outcomes: &[OutcomeEntry]) -> usize {
    outcomes.iter().filter(|entry| entry.succeeded()).count()
}
