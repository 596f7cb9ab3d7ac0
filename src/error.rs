use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the ingestion and query pipelines.
#[derive(Debug, Error)]
pub enum AirQualityError {
    /// The source file is missing or could not be read.
    #[error("failed to read source file `{}`: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source file was readable but a record was structurally malformed.
    #[error("malformed source record at line {line}: {reason}")]
    SourceParse { line: u64, reason: String },

    /// Client supplied filters that failed validation.
    #[error("{0}")]
    InvalidFilter(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AirQualityError {
    /// True for errors caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AirQualityError::InvalidFilter(_))
    }
}

pub type Result<T, E = AirQualityError> = std::result::Result<T, E>;
