//! Codacy Status Core Library
//!
//! Analysis snapshot model plus the evaluator that turns a commit or
//! pull-request snapshot into a traffic-light [`StatusResult`].

pub mod domain;
pub mod obs;
pub mod reporting;
pub mod status;
pub mod telemetry;

pub use domain::{
    load_commit_snapshot, load_coverage_reports, load_pull_request_snapshot, AnalysisMeta,
    Commit, CommitWithAnalysis, CoverageAnalysis, CoveragePullRequestData,
    CoveragePullRequestResponse, CoverageReport, CoverageReportList, DiffCoverage,
    DiffCoverageCause, PullRequest, PullRequestCoverage, PullRequestWithAnalysis,
    QualityAnalysis, ResultReason, Result, StatusError,
};

pub use status::combined::{
    quality_commit_status, quality_commit_status_at, quality_pr_status, quality_pr_status_at,
    resolve_combined_status_at, AnalysisContext, CombinedInputs,
};
pub use status::coverage::{
    coverage_commit_status, coverage_commit_status_at, coverage_pr_status, coverage_pr_status_at,
    is_pr_waiting_for_coverage, resolve_coverage_status, resolve_coverage_status_at,
    CoverageStatusKey, RECENCY_WINDOW,
};
pub use status::quality::{resolve_quality_status, QualityStatusKey};
pub use status::{is_commit_being_analysed, CoverageLike, StatusResult, StatusValue};

pub use obs::{emit_fetch_failed, emit_status_evaluated, SubjectSpan};
pub use reporting::{
    render_status_line, render_status_markdown, write_status_report_json, StatusReport,
};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
