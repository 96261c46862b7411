//! Error types for the store module.

use certreg_core::CertificateId;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored certificate row exists but its fields no longer decode.
    #[error("certificate {id} is corrupted: {reason}")]
    Corrupted { id: CertificateId, reason: String },

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    /// The blocking task running a SQLite operation failed.
    #[error("blocking task failed: {0}")]
    Task(String),

    /// The id space of the registry is exhausted.
    #[error("certificate id space exhausted")]
    IdsExhausted,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
