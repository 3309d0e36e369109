use std::path::PathBuf;

use snapsheet_core::{ConfigError, SheetError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sheet error: {0}")]
    Sheet(#[from] SheetError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid script {name}: {message}")]
    InvalidScript { name: String, message: String },

    #[error("unsupported config format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("checksum mismatch for {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("tracing subscriber already installed: {0}")]
    Logging(String),
}

impl HarnessError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ChecksumMismatch { .. } => 2,
            Self::InvalidScript { .. } | Self::Config(_) | Self::UnsupportedFormat { .. } => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_mismatch_has_distinct_exit_code() {
        let err = HarnessError::ChecksumMismatch {
            name: "tap".into(),
            expected: "aa".into(),
            actual: "bb".into(),
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("expected aa, got bb"));
    }

    #[test]
    fn io_errors_exit_with_one() {
        let err = HarnessError::from(std::io::Error::other("boom"));
        assert_eq!(err.exit_code(), 1);
    }
}
