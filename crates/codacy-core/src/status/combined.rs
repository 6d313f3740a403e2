//! Combined quality + coverage status.
//!
//! Quality decides the primary status. Coverage takes over only when it
//! failed and quality did not, so a quality failure always dominates.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::coverage::{
    coverage_commit_status_at, coverage_pr_status_at, resolve_coverage_status_at,
    CoverageStatusKey,
};
use super::quality::{resolve_quality_status, QualityStatusKey};
use super::{CoverageLike, StatusEntry, StatusResult, StatusValue};
use crate::domain::{
    AnalysisMeta, CommitWithAnalysis, CoveragePullRequestResponse, PullRequestWithAnalysis,
    QualityAnalysis,
};

/// Everything the combined status depends on, independent of whether the
/// subject is a commit or a pull request.
#[derive(Clone, Copy)]
pub struct CombinedInputs<'a> {
    pub quality: Option<&'a QualityAnalysis>,
    pub coverage: Option<&'a dyn CoverageLike>,
    pub meta: &'a AnalysisMeta,
    pub is_waiting_for_analysis: bool,
    pub is_waiting_for_coverage: bool,
    pub is_analyzable: bool,
    pub last_updated: DateTime<Utc>,
    pub expect_coverage: bool,
}

/// Which half of the status is displayed as the primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primary {
    Quality(QualityStatusKey),
    Coverage(CoverageStatusKey),
}

impl Primary {
    fn select(quality: QualityStatusKey, coverage: Option<CoverageStatusKey>) -> Self {
        match coverage {
            Some(CoverageStatusKey::Failed) if quality != QualityStatusKey::Failed => {
                Primary::Coverage(CoverageStatusKey::Failed)
            }
            _ => Primary::Quality(quality),
        }
    }

    fn entry(self) -> &'static StatusEntry {
        match self {
            Primary::Quality(key) => key.entry(),
            Primary::Coverage(key) => key.entry(),
        }
    }
}

struct DetailsContext<'a> {
    primary: Primary,
    coverage: Option<CoverageStatusKey>,
    reason: Option<&'a str>,
}

type DetailsRule = fn(&DetailsContext<'_>) -> Option<String>;

fn passed_quality_waiting_coverage(ctx: &DetailsContext<'_>) -> Option<String> {
    (ctx.primary == Primary::Quality(QualityStatusKey::Passed)
        && ctx.coverage == Some(CoverageStatusKey::Waiting))
    .then(|| "Waiting for coverage reports...".to_string())
}

fn passed_quality_missing_coverage(ctx: &DetailsContext<'_>) -> Option<String> {
    (ctx.primary == Primary::Quality(QualityStatusKey::Passed)
        && ctx.coverage == Some(CoverageStatusKey::NoCoverage))
    .then(|| "Missing coverage reports".to_string())
}

fn no_information_reason(ctx: &DetailsContext<'_>) -> Option<String> {
    if ctx.primary.entry().value != StatusValue::NoInformation {
        return None;
    }
    ctx.reason.map(str::to_string)
}

// Evaluated in order; first match wins.
const DETAILS_RULES: &[DetailsRule] = &[
    passed_quality_waiting_coverage,
    passed_quality_missing_coverage,
    no_information_reason,
];

/// Resolve the combined status as of `now`.
pub fn resolve_combined_status_at(now: DateTime<Utc>, inputs: &CombinedInputs<'_>) -> StatusResult {
    let quality_key = resolve_quality_status(
        inputs.is_waiting_for_analysis,
        inputs.is_analyzable,
        inputs.quality,
    );
    let coverage_key = inputs.expect_coverage.then(|| {
        resolve_coverage_status_at(
            now,
            inputs.is_waiting_for_coverage,
            inputs.last_updated,
            inputs.coverage,
        )
    });
    let primary = Primary::select(quality_key, coverage_key);

    let mut result = primary.entry().to_result();
    result.quality = Some(Box::new(quality_key.entry().to_result()));
    result.coverage = coverage_key.map(|key| Box::new(key.entry().to_result()));

    let ctx = DetailsContext {
        primary,
        coverage: coverage_key,
        reason: inputs.meta.reason.as_deref(),
    };
    result.details = DETAILS_RULES.iter().find_map(|rule| rule(&ctx));

    debug!(
        quality = quality_key.as_str(),
        coverage = coverage_key.map(CoverageStatusKey::as_str),
        value = %result.value,
        "resolved combined status"
    );
    result
}

/// Combined status of a commit as of `now`.
pub fn quality_commit_status_at(
    now: DateTime<Utc>,
    data: &CommitWithAnalysis,
    expect_coverage: bool,
) -> StatusResult {
    let commit = &data.commit;
    // Analysable once an analysis has started, whether or not it has ended.
    // Requiring an end as well would show in-flight commits as "No information."
    let has_analysis = commit.started_analysis.is_some();

    let inputs = CombinedInputs {
        quality: data.quality.as_ref(),
        coverage: data.coverage.as_ref().map(|c| c as &dyn CoverageLike),
        meta: &data.meta,
        is_waiting_for_analysis: commit.is_being_analysed(),
        is_waiting_for_coverage: data.is_waiting_for_coverage(),
        is_analyzable: data.meta.analyzable && has_analysis,
        last_updated: commit.commit_timestamp,
        expect_coverage,
    };
    resolve_combined_status_at(now, &inputs)
}

pub fn quality_commit_status(data: &CommitWithAnalysis, expect_coverage: bool) -> StatusResult {
    quality_commit_status_at(Utc::now(), data, expect_coverage)
}

/// Combined status of a pull request as of `now`.
pub fn quality_pr_status_at(
    now: DateTime<Utc>,
    data: &PullRequestWithAnalysis,
    expect_coverage: bool,
) -> StatusResult {
    let inputs = CombinedInputs {
        quality: data.quality.as_ref(),
        coverage: data.coverage.as_ref().map(|c| c as &dyn CoverageLike),
        meta: &data.meta,
        is_waiting_for_analysis: data.is_analysing,
        is_waiting_for_coverage: data.is_waiting_for_coverage(),
        is_analyzable: data.meta.analyzable,
        last_updated: data.pull_request.updated,
        expect_coverage,
    };
    resolve_combined_status_at(now, &inputs)
}

pub fn quality_pr_status(data: &PullRequestWithAnalysis, expect_coverage: bool) -> StatusResult {
    quality_pr_status_at(Utc::now(), data, expect_coverage)
}

/// The subject of a status evaluation.
#[derive(Debug, Clone, Copy)]
pub enum AnalysisContext<'a> {
    Commit(&'a CommitWithAnalysis),
    PullRequest(&'a PullRequestWithAnalysis),
}

impl<'a> AnalysisContext<'a> {
    /// Short human label, e.g. `commit 1a2b3c4` or `PR #12`.
    pub fn label(&self) -> String {
        match self {
            AnalysisContext::Commit(data) => format!("commit {}", data.commit.short_sha()),
            AnalysisContext::PullRequest(data) => format!("PR #{}", data.pull_request.number),
        }
    }

    pub fn quality_status_at(&self, now: DateTime<Utc>, expect_coverage: bool) -> StatusResult {
        match self {
            AnalysisContext::Commit(data) => quality_commit_status_at(now, data, expect_coverage),
            AnalysisContext::PullRequest(data) => quality_pr_status_at(now, data, expect_coverage),
        }
    }

    pub fn quality_status(&self, expect_coverage: bool) -> StatusResult {
        self.quality_status_at(Utc::now(), expect_coverage)
    }

    /// Coverage-only status. Coverage reports only refine pull requests.
    pub fn coverage_status_at(
        &self,
        now: DateTime<Utc>,
        reports: Option<&CoveragePullRequestResponse>,
    ) -> StatusResult {
        match self {
            AnalysisContext::Commit(data) => coverage_commit_status_at(now, data),
            AnalysisContext::PullRequest(data) => coverage_pr_status_at(now, data, reports),
        }
    }

    pub fn coverage_status(&self, reports: Option<&CoveragePullRequestResponse>) -> StatusResult {
        self.coverage_status_at(Utc::now(), reports)
    }
}

impl<'a> From<&'a CommitWithAnalysis> for AnalysisContext<'a> {
    fn from(data: &'a CommitWithAnalysis) -> Self {
        AnalysisContext::Commit(data)
    }
}

impl<'a> From<&'a PullRequestWithAnalysis> for AnalysisContext<'a> {
    fn from(data: &'a PullRequestWithAnalysis) -> Self {
        AnalysisContext::PullRequest(data)
    }
}
