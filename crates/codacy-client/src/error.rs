//! Error types for codacy-client

use thiserror::Error;

/// Errors that can occur while fetching analysis snapshots
#[derive(Error, Debug)]
pub enum ClientError {
    /// No API token configured
    #[error("Codacy API token is not configured (set CODACY_API_TOKEN)")]
    MissingToken,

    /// Client configuration could not be turned into a request
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Token rejected by the API
    #[error("Codacy API rejected the token")]
    Unauthorized,

    /// Resource does not exist or is not visible to the token
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other non-success response
    #[error("Codacy API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body did not match the expected shape
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Git remote host is not a supported provider
    #[error("Unsupported git remote: {0}")]
    UnsupportedRemote(String),

    /// Malformed `provider/organization/repository` reference
    #[error("Invalid repository reference: {0}")]
    InvalidRepository(String),

    /// Git command failed
    #[error("Git command failed: {0}")]
    Git(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err.to_string())
    }
}
