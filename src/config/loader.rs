use crate::error::Result;

use super::validator;
use super::{
    Config, ExclusionKeywords, FetchStrategy, NotionConfig, QuoteApiConfig, Secret,
    TelegramConfig, DEFAULT_PRICE_PROPERTY, DEFAULT_SYMBOL_PROPERTY,
};

/// Build the run configuration from the process environment.
pub fn load_from_env() -> Result<Config> {
    load_with(|name| std::env::var(name).ok())
}

/// Build the run configuration from an arbitrary variable lookup.
///
/// All problems are collected before failing so one run reports every
/// missing or malformed variable together.
pub fn load_with<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut issues = Vec::new();
    validator::check_required(&lookup, &mut issues);

    let strategy = validator::parse_strategy(lookup("FETCH_STRATEGY").as_deref(), &mut issues);
    let workers = validator::parse_workers(lookup("FETCH_WORKERS").as_deref(), &mut issues);
    let strategy = match strategy {
        FetchStrategy::Pooled { .. } => FetchStrategy::Pooled { workers },
        other => other,
    };

    validator::finish(issues)?;

    let required = |name: &str| lookup(name).unwrap_or_default().trim().to_string();
    let optional = |name: &str, default: &str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let config = Config {
        telegram: TelegramConfig {
            bot_token: Secret::new(required("BOT_TOKEN")),
            chat_id: required("CHAT_ID"),
        },
        notion: NotionConfig {
            token: Secret::new(required("NOTION_API_TOKEN")),
            database_id: required("DATABASE_ID"),
            symbol_property: optional("SYMBOL_PROPERTY", DEFAULT_SYMBOL_PROPERTY),
            price_property: optional("PRICE_PROPERTY", DEFAULT_PRICE_PROPERTY),
        },
        quotes: QuoteApiConfig {
            api_key: Secret::new(required("API_KEY")),
        },
        exclusions: ExclusionKeywords::parse(&lookup("EXCLUDE_KEYWORDS").unwrap_or_default()),
        strategy,
    };

    log::debug!(
        "configuration loaded: strategy={}, exclusions={:?}",
        config.strategy,
        config.exclusions.keywords()
    );

    Ok(config)
}
