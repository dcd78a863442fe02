//! Error types for the storage collaborator.

/// Errors reported by a [`KeyValueStore`](crate::KeyValueStore)
/// implementation.
///
/// Callers treat every variant the same way: log it and fall back to
/// in-memory state. The distinction exists for operators reading logs.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the operation.
    #[error("store operation failed: {0}")]
    Operation(String),
}
