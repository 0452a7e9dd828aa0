use crate::error::{AppError, Result};

use super::{FetchStrategy, DEFAULT_POOL_WORKERS};

/// Variables without which a run must not start.
pub const REQUIRED_VARS: [&str; 5] = [
    "BOT_TOKEN",
    "CHAT_ID",
    "API_KEY",
    "NOTION_API_TOKEN",
    "DATABASE_ID",
];

/// Record every required variable that is unset or blank.
pub fn check_required<F>(lookup: &F, issues: &mut Vec<String>)
where
    F: Fn(&str) -> Option<String>,
{
    let missing: Vec<&str> = REQUIRED_VARS
        .iter()
        .copied()
        .filter(|name| lookup(*name).map_or(true, |value| value.trim().is_empty()))
        .collect();

    if !missing.is_empty() {
        issues.push(format!(
            "missing required environment variables: {}",
            missing.join(", ")
        ));
    }
}

pub fn parse_strategy(raw: Option<&str>, issues: &mut Vec<String>) -> FetchStrategy {
    match raw {
        None => FetchStrategy::default(),
        Some(value) => value.parse().unwrap_or_else(|err: String| {
            issues.push(format!("FETCH_STRATEGY: {err}"));
            FetchStrategy::default()
        }),
    }
}

pub fn parse_workers(raw: Option<&str>, issues: &mut Vec<String>) -> usize {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return DEFAULT_POOL_WORKERS;
    };

    match value.parse::<usize>() {
        Ok(0) => {
            issues.push("FETCH_WORKERS must be at least 1".to_string());
            DEFAULT_POOL_WORKERS
        }
        Ok(workers) => workers,
        Err(_) => {
            issues.push(format!("FETCH_WORKERS `{value}` is not a positive integer"));
            DEFAULT_POOL_WORKERS
        }
    }
}

pub fn finish(issues: Vec<String>) -> Result<()> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::Configuration(issues))
    }
}
