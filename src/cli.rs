use clap::Parser;

use stock_price_sync::app::RunOptions;
use stock_price_sync::config::FetchStrategy;

#[derive(Debug, Parser)]
#[command(name = "stock-price-sync")]
#[command(about = "Sync the latest stock closes from Twelve Data into a Notion database")]
#[command(version)]
pub struct Cli {
    /// Fetch strategy: sequential, batched or pooled (overrides FETCH_STRATEGY)
    #[arg(short, long)]
    pub strategy: Option<FetchStrategy>,

    /// Worker count for the pooled strategy (overrides FETCH_WORKERS)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Fetch prices without writing records or sending the notification
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            strategy: self.strategy,
            workers: self.workers,
            dry_run: self.dry_run,
        }
    }
}
