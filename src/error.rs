use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Fatal: raised before any network call when the environment is incomplete.
    #[error("configuration error: {}", .0.join("; "))]
    Configuration(Vec<String>),
    #[error("failed to list stock records: {0}")]
    SourceList(String),
    #[error("failed to update record {record_id}: {reason}")]
    RecordWrite { record_id: String, reason: String },
    #[error("failed to deliver notification: {0}")]
    Notify(String),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_lists_every_issue() {
        let err = AppError::Configuration(vec!["missing BOT_TOKEN".into(), "bad FETCH_WORKERS".into()]);
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "configuration error: missing BOT_TOKEN; bad FETCH_WORKERS"
        );
    }

    #[test]
    fn decode_errors_convert_transparently() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let expected = parse.to_string();
        let err: AppError = parse.into();
        assert!(matches!(err, AppError::Json(_)));
        assert_eq!(err.to_string(), expected);
        assert!(!AppError::message("boom").is_configuration());
    }
}
