//! Client configuration
//!
//! Environment-first: every field has an environment variable and a
//! builder override.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://app.codacy.com/api/v3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Codacy API client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, e.g. `https://app.codacy.com/api/v3`
    pub base_url: String,
    /// Account or project API token
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl ClientConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific API root, ignoring the environment
    pub fn new(base_url: &str) -> Self {
        ClientConfig {
            base_url: base_url.to_string(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.api_token = Some(token.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let timeout = lookup("CODACY_API_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        ClientConfig {
            base_url: lookup("CODACY_API_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_token: lookup("CODACY_API_TOKEN").filter(|v| !v.trim().is_empty()),
            timeout: Duration::from_secs(timeout),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("codacy-client/{}", env!("CARGO_PKG_VERSION"))
}
