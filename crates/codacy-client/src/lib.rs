//! Codacy-Client: analysis snapshot provider
//!
//! Fetches commit and pull-request analysis snapshots from the Codacy v3
//! API and resolves which Codacy repository a local git checkout maps to.
//!
//! Only the handful of endpoints the status evaluator needs are covered.

pub mod client;
pub mod config;
pub mod error;
pub mod repository;
pub mod source;

pub use client::{CodacyClient, DataResponse, Page, Pagination};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use repository::{capture_remote_url, Provider, RepositoryRef};
pub use source::{AnalysisSource, MemoryAnalysisSource};

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
