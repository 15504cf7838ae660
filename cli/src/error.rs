//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The server did not answer `/ping` with a success status.
    #[error("no Sky server responding at {0}")]
    Unreachable(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(String),

    /// A command-line argument or input file was not valid JSON.
    #[error("invalid JSON in {what}: {reason}")]
    Json { what: String, reason: String },

    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error(transparent)]
    Sky(#[from] sky_core::SkyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn json(what: impl Into<String>, err: serde_json::Error) -> Self {
        Error::Json {
            what: what.into(),
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
