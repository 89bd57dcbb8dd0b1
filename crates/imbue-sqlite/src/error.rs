//! Error types for the storage engine

use std::io;

/// Errors raised by the storage engine.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness or other constraint rejected the statement.
    #[error("Constraint conflict: {0}")]
    Conflict(String),

    /// The seed dataset failed the engine's validity check.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Explicit persistence was requested on a database with no snapshot file.
    #[error("No backing snapshot for database: {0}")]
    NotPersistent(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}
