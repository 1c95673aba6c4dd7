use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No documents found in {0}")]
    NoDocuments(String),

    #[error("Invalid record {source_id}: {reason}")]
    InvalidRecord { source_id: String, reason: String },

    #[error("Failed to read corpus at {path}: {reason}")]
    Corpus { path: PathBuf, reason: String },

    #[error("Failed to load embedding model: {0}")]
    ModelLoad(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Got {vectors} vectors for {documents} documents")]
    LengthMismatch { vectors: usize, documents: usize },

    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("k must be between 1 and {max}, got {k}")]
    InvalidK { k: i64, max: usize },

    #[error("Engine is still initializing, try again shortly")]
    EngineInitializing,

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),
}

impl Error {
    /// Whether the error was caused by caller input rather than engine state.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::EmptyQuery | Error::InvalidK { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
