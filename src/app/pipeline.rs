use futures::stream::{self, StreamExt};
use tokio::time::{sleep, Duration};

use crate::config::FetchStrategy;
use crate::fetch::{PriceFetcher, BATCH_SYMBOL_LIMIT};
use crate::notify::Notifier;
use crate::records::{OutcomeEntry, RecordUpdater, StockRecord, SymbolSource};

use super::RunReport;

/// Pause between consecutive symbols (or batches) in the serial strategies.
pub const SYMBOL_PAUSE: Duration = Duration::from_secs(2);

/// Drives one run: list, fetch, write back, aggregate, notify.
pub struct Pipeline {
    source: SymbolSource,
    fetcher: PriceFetcher,
    updater: RecordUpdater,
    notifier: Notifier,
    strategy: FetchStrategy,
    dry_run: bool,
}

impl Pipeline {
    pub fn new(
        source: SymbolSource,
        fetcher: PriceFetcher,
        updater: RecordUpdater,
        notifier: Notifier,
        strategy: FetchStrategy,
    ) -> Self {
        Self {
            source,
            fetcher,
            updater,
            notifier,
            strategy,
            dry_run: false,
        }
    }

    /// Fetch prices but skip record writes and the notification.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    pub async fn run(&self) -> RunReport {
        let records = self.source.list_symbols().await;
        if records.is_empty() {
            log::info!("no stock symbols found in the database");
            return RunReport::no_symbols();
        }

        log::info!(
            "syncing {} symbols using the {} strategy",
            records.len(),
            self.strategy
        );

        let mut outcomes = match self.strategy {
            FetchStrategy::Sequential => self.run_sequential(&records).await,
            FetchStrategy::Batched => self.run_batched(&records).await,
            FetchStrategy::Pooled { workers } => self.run_pooled(&records, workers).await,
        };
        outcomes.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        let priced = outcomes.iter().filter(|entry| entry.succeeded()).count();
        log::info!("priced {priced}/{} symbols", outcomes.len());

        if self.dry_run {
            return RunReport::dry_run(outcomes);
        }

        let notified = self.notifier.notify(&outcomes).await;
        RunReport::completed(outcomes, notified)
    }

    async fn settle(&self, record: &StockRecord, price: Option<f64>) -> OutcomeEntry {
        if !self.dry_run {
            self.updater.update(record, price).await;
        }
        OutcomeEntry::new(record.symbol.clone(), price)
    }

    async fn run_sequential(&self, records: &[StockRecord]) -> Vec<OutcomeEntry> {
        let mut outcomes = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if index > 0 {
                sleep(SYMBOL_PAUSE).await;
            }
            let result = self.fetcher.fetch(&record.symbol).await;
            outcomes.push(self.settle(record, result.price()).await);
        }
        outcomes
    }

    async fn run_batched(&self, records: &[StockRecord]) -> Vec<OutcomeEntry> {
        let mut outcomes = Vec::with_capacity(records.len());
        for (index, chunk) in records.chunks(BATCH_SYMBOL_LIMIT).enumerate() {
            if index > 0 {
                sleep(SYMBOL_PAUSE).await;
            }
            let symbols: Vec<String> = chunk.iter().map(|record| record.symbol.clone()).collect();
            let prices = self.fetcher.fetch_batch(&symbols).await;
            for record in chunk {
                let price = prices.get(&record.symbol).copied();
                outcomes.push(self.settle(record, price).await);
            }
        }
        outcomes
    }

    async fn run_pooled(&self, records: &[StockRecord], workers: usize) -> Vec<OutcomeEntry> {
        // Workers share the fetcher's limiter, so the call budget holds across them.
        stream::iter(records)
            .map(|record| async move {
                let result = self.fetcher.fetch(&record.symbol).await;
                self.settle(record, result.price()).await
            })
            .buffer_unordered(workers.max(1))
            .collect()
            .await
    }
}
