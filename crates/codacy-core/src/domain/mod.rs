//! Domain models for Codacy analysis snapshots.
//!
//! Canonical definitions for the entities the status evaluator reads:
//! - `CommitWithAnalysis`: a commit plus its quality/coverage analysis
//! - `PullRequestWithAnalysis`: a pull request plus its quality/coverage analysis
//! - `CoveragePullRequestResponse`: coverage reports received for a pull request

pub mod analysis;
pub mod commit;
pub mod error;
pub mod pull_request;
pub mod snapshot;

// Re-export main types and errors
pub use analysis::{
    AnalysisMeta, CoverageAnalysis, DiffCoverage, DiffCoverageCause, ExpectedThreshold,
    PullRequestCoverage, QualityAnalysis, ResultReason,
};
pub use commit::{Commit, CommitWithAnalysis};
pub use error::{Result, StatusError};
pub use pull_request::{
    CoveragePullRequestData, CoveragePullRequestResponse, CoverageReport, CoverageReportList,
    PullRequest, PullRequestWithAnalysis,
};
pub use snapshot::{
    load_commit_snapshot, load_coverage_reports, load_pull_request_snapshot, parse_enveloped,
};
