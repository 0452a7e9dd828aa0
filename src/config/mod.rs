use std::fmt;
use std::str::FromStr;

pub mod loader;
pub mod validator;

pub use loader::{load_from_env, load_with};

pub const DEFAULT_SYMBOL_PROPERTY: &str = "Stock";
pub const DEFAULT_PRICE_PROPERTY: &str = "Price";
pub const DEFAULT_POOL_WORKERS: usize = 2;

/// Credential wrapper that keeps tokens out of `Debug` output and logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new<T: Into<String>>(value: T) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Secret,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub token: Secret,
    pub database_id: String,
    pub symbol_property: String,
    pub price_property: String,
}

#[derive(Debug, Clone)]
pub struct QuoteApiConfig {
    pub api_key: Secret,
}

/// Fully validated process configuration for one sync run.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub notion: NotionConfig,
    pub quotes: QuoteApiConfig,
    pub exclusions: ExclusionKeywords,
    pub strategy: FetchStrategy,
}

/// Substring filters applied to ticker text. Blank entries never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionKeywords {
    keywords: Vec<String>,
}

impl ExclusionKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords = keywords
            .into_iter()
            .map(|keyword| {
                let keyword: String = keyword.into();
                keyword.trim().to_string()
            })
            .filter(|keyword| !keyword.is_empty())
            .collect();
        Self { keywords }
    }

    /// Parse the comma-separated form used by `EXCLUDE_KEYWORDS`.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// First keyword contained in `symbol`, if any.
    pub fn matching(&self, symbol: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|keyword| symbol.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn excludes(&self, symbol: &str) -> bool {
        self.matching(symbol).is_some()
    }
}

/// How the pipeline spends its quote-API budget during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStrategy {
    /// One request per symbol with a pause between symbols.
    #[default]
    Sequential,
    /// Multi-symbol requests, one limiter charge per request.
    Batched,
    /// A fixed number of concurrent workers sharing one limiter.
    Pooled { workers: usize },
}

impl FetchStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            FetchStrategy::Sequential => "sequential",
            FetchStrategy::Batched => "batched",
            FetchStrategy::Pooled { .. } => "pooled",
        }
    }

    pub fn with_workers(self, workers: usize) -> Self {
        match self {
            FetchStrategy::Pooled { .. } => FetchStrategy::Pooled {
                workers: workers.max(1),
            },
            other => other,
        }
    }
}

impl FromStr for FetchStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequential" | "" => Ok(FetchStrategy::Sequential),
            "batched" | "batch" => Ok(FetchStrategy::Batched),
            "pooled" | "pool" => Ok(FetchStrategy::Pooled {
                workers: DEFAULT_POOL_WORKERS,
            }),
            other => Err(format!(
                "unknown fetch strategy `{other}` (expected sequential, batched or pooled)"
            )),
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStrategy::Pooled { workers } => write!(f, "pooled({workers})"),
            other => f.write_str(other.name()),
        }
    }
}
