mod cli;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;
use stock_price_sync::app;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the real environment is used as-is.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match app::run(cli.run_options()).await {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(err) => log::error!("failed to render run report: {err}"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
