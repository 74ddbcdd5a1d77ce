use std::path::PathBuf;

use thiserror::Error;

/// Failures at the file boundary. The engine itself never fails.
#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidConfig(String),

    #[error("unknown grade category '{0}' (expected written_works, performance_task or quarterly_exam)")]
    UnknownCategory(String),

    #[error("grade item '{name}' on line {line}: {reason}")]
    InvalidGradeItem {
        name: String,
        line: u64,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, InsightsError>;
