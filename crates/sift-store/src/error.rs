//! Error types for store operations.

use thiserror::Error;

/// Errors raised by a store backend while enumerating or writing records.
///
/// The query executor passes these through unchanged; any retry policy
/// belongs to the backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A stored line is not a valid record.
    #[error("malformed record at line {line}: {source}")]
    Json {
        /// 1-based line number.
        line: u64,
        /// Decoder error.
        source: serde_json::Error,
    },
    /// A record could not be encoded for writing.
    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
    /// The final record was cut short (strict read mode).
    #[error("truncated record at line {line}")]
    Truncated {
        /// 1-based line number.
        line: u64,
    },
    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}
