use thiserror::Error;

/// Top-level error type for Stride.
#[derive(Debug, Error)]
pub enum StrideError {
    /// Priority outside the accepted `1..=10` range.
    #[error("priority {0} is out of range (expected 1-10)")]
    InvalidPriority(i64),

    /// Reminder text was empty after trimming.
    #[error("reminder text is empty")]
    EmptyText,

    /// The remote store rejected a reminder create. The optimistic insert
    /// has already been rolled back when this is returned.
    #[error("reminder create failed: {0}")]
    RemoteCreateFailure(String),

    /// Any other remote store failure (transport, status, decoding).
    #[error("remote error: {0}")]
    Remote(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
