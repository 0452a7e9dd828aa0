use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::records::OutcomeEntry;
use crate::utils::current_human_timestamp;

pub mod telegram;

pub use telegram::TelegramMessenger;

/// How many failed symbols the summary names before truncating.
pub const FAILED_SYMBOLS_SHOWN: usize = 5;
const FAILURE_HINT: &str =
    "Hint: check that the symbols are valid and that the quote API key still has credits.";

/// Push channel for the run summary.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Best-effort delivery of the end-of-run summary.
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    /// Send the summary; returns whether delivery succeeded. Never errors.
    pub async fn notify(&self, outcomes: &[OutcomeEntry]) -> bool {
        let message = build_summary(outcomes, &current_human_timestamp());
        match self.messenger.send(&message).await {
            Ok(()) => {
                log::info!("notification sent");
                log::debug!("notification body:\n{message}");
                true
            }
            Err(err) => {
                log::error!("{err}");
                false
            }
        }
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Two decimals unless that would hide digits of the stored value.
fn format_price(price: f64) -> String {
    let fixed = format!("{price:.2}");
    match fixed.parse::<f64>() {
        Ok(parsed) if parsed == price => fixed,
        _ => price.to_string(),
    }
}

/// Render the human-readable run summary.
pub fn build_summary(outcomes: &[OutcomeEntry], timestamp: &str) -> String {
    let total = outcomes.len();
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|entry| !entry.succeeded())
        .map(|entry| entry.symbol.as_str())
        .collect();
    let succeeded = total - failed.len();

    let mut result_line = format!(
        "Result: {succeeded}/{total} success, {}",
        plural(failed.len(), "failure")
    );
    if !failed.is_empty() {
        let shown = failed
            .iter()
            .take(FAILED_SYMBOLS_SHOWN)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        result_line.push_str(": ");
        result_line.push_str(&shown);
        if failed.len() > FAILED_SYMBOLS_SHOWN {
            result_line.push_str(&format!(" (+{} more)", failed.len() - FAILED_SYMBOLS_SHOWN));
        }
    }

    let mut lines = vec!["Stock price sync finished".to_string(), result_line, String::new()];
    lines.extend(outcomes.iter().map(|entry| match entry.price {
        Some(price) => format!("[ok] {}: {}", entry.symbol, format_price(price)),
        None => format!("[failed] {}: no price", entry.symbol),
    }));

    if !failed.is_empty() {
        lines.push(String::new());
        lines.push(FAILURE_HINT.to_string());
    }

    lines.push(String::new());
    lines.push(format!("Updated at: {timestamp}"));
    lines.join("\n")
}
