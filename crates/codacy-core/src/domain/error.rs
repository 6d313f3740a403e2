//! Domain-level error taxonomy for snapshot handling.

/// Errors produced while loading or validating analysis snapshots.
///
/// Status evaluation itself is total and never produces one of these.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, StatusError>;
