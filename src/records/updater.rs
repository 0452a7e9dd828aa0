use std::sync::Arc;

use super::{DocumentStore, StockRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    Written,
    Skipped,
    Failed,
}

/// Writes fetched prices back onto their records. Never fails the run.
pub struct RecordUpdater {
    store: Arc<dyn DocumentStore>,
    price_property: String,
}

impl RecordUpdater {
    pub fn new<P: Into<String>>(store: Arc<dyn DocumentStore>, price_property: P) -> Self {
        Self {
            store,
            price_property: price_property.into(),
        }
    }

    /// Write `price` when present; an absent price leaves the record untouched.
    pub async fn update(&self, record: &StockRecord, price: Option<f64>) -> UpdateStatus {
        let Some(price) = price else {
            log::info!(
                "skipping update of {} ({}): no valid price",
                record.record_id,
                record.symbol
            );
            return UpdateStatus::Skipped;
        };

        match self
            .store
            .update_number(&record.record_id, &self.price_property, price)
            .await
        {
            Ok(()) => {
                log::info!(
                    "updated {} ({}) to {price}",
                    record.record_id,
                    record.symbol
                );
                UpdateStatus::Written
            }
            Err(err) => {
                log::error!("could not update {}: {err}", record.symbol);
                UpdateStatus::Failed
            }
        }
    }
}
