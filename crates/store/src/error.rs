use snapkeep_core::NameError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from storage and snapshot-log operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested snapshot is not in the backend. Recoverable; the
    /// caller decides the fallback.
    #[error("snapshot {0:?} not found")]
    NotFound(String),

    /// An identifier failed the pattern or time parse.
    #[error(transparent)]
    Name(#[from] NameError),

    #[error("serialization failed: {0}")]
    Encode(String),

    #[error("deserialization failed: {0}")]
    Decode(String),

    /// I/O failures from the file backend, propagated unwrapped.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The in-memory backend lost the optimistic-update race too many
    /// times in a row. Hard failure; retrying is the caller's call.
    #[error("storage contention: gave up after {attempts} attempts")]
    Contention { attempts: u32 },
}
