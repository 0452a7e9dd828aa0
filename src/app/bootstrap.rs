use std::sync::Arc;

use reqwest::Client;

use crate::config::{self, Config, FetchStrategy};
use crate::error::{Context, Result};
use crate::fetch::{PriceFetcher, RateLimiter, TwelveDataClient};
use crate::notify::{Notifier, TelegramMessenger};
use crate::records::{DocumentStore, NotionStore, RecordUpdater, SymbolSource};

use super::{Pipeline, RunReport};

/// Command-line overrides applied on top of the environment configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub strategy: Option<FetchStrategy>,
    pub workers: Option<usize>,
    pub dry_run: bool,
}

/// Entry point used by `main`: validate configuration, then run one sync.
pub async fn run(options: RunOptions) -> Result<RunReport> {
    let config = config::load_from_env()?;
    let pipeline = build_pipeline(&config, &options)?;
    Ok(pipeline.run().await)
}

/// Wire the HTTP-backed collaborators into a pipeline.
pub fn build_pipeline(config: &Config, options: &RunOptions) -> Result<Pipeline> {
    let client = Client::builder()
        .user_agent(concat!("stock-price-sync/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to construct HTTP client")?;

    let store: Arc<dyn DocumentStore> = Arc::new(NotionStore::new(client.clone(), &config.notion));
    let source = SymbolSource::new(
        Arc::clone(&store),
        config.notion.symbol_property.clone(),
        config.exclusions.clone(),
    );
    let updater = RecordUpdater::new(store, config.notion.price_property.clone());

    let quotes = Arc::new(TwelveDataClient::new(
        client.clone(),
        config.quotes.api_key.clone(),
    ));
    let fetcher = PriceFetcher::new(quotes, Arc::new(RateLimiter::new()));

    let notifier = Notifier::new(Arc::new(TelegramMessenger::new(client, &config.telegram)));

    let strategy = resolve_strategy(config.strategy, options);
    Ok(Pipeline::new(source, fetcher, updater, notifier, strategy).dry_run(options.dry_run))
}

/// Command-line strategy wins; a pooled override keeps the configured worker
/// count unless `--workers` is also given.
pub fn resolve_strategy(configured: FetchStrategy, options: &RunOptions) -> FetchStrategy {
    let strategy = match (options.strategy, configured) {
        (Some(FetchStrategy::Pooled { .. }), FetchStrategy::Pooled { workers }) => {
            FetchStrategy::Pooled { workers }
        }
        (Some(requested), _) => requested,
        (None, configured) => configured,
    };

    match options.workers {
        Some(workers) => strategy.with_workers(workers),
        None => strategy,
    }
}
