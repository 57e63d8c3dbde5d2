//! Operational errors.
//!
//! These never reach the binding report. The pipeline absorbs every
//! file-level failure; only configuration loading surfaces one to the caller.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FuseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid binding pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to serialize report: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl FuseError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FuseError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FuseError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FuseError>;
