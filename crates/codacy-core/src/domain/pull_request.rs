//! Pull requests, their analysis snapshots and coverage report listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisMeta, DiffCoverageCause, PullRequestCoverage, QualityAnalysis};

/// A pull request as reported by the analysis platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: i64,
    pub number: u64,

    #[serde(default)]
    pub title: String,

    pub updated: DateTime<Utc>,

    /// `open`, `closed` or `merged`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_commit_sha: Option<String>,
}

impl PullRequest {
    pub fn new(id: i64, number: u64, title: &str, updated: DateTime<Utc>) -> Self {
        Self {
            id,
            number,
            title: title.to_string(),
            updated,
            status: None,
            origin_branch: None,
            target_branch: None,
            head_commit_sha: None,
        }
    }
}

/// A pull request bundled with its quality and coverage analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestWithAnalysis {
    pub pull_request: PullRequest,

    #[serde(default)]
    pub is_analysing: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<PullRequestCoverage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityAnalysis>,

    #[serde(default)]
    pub meta: AnalysisMeta,
}

impl PullRequestWithAnalysis {
    pub fn new(pull_request: PullRequest, meta: AnalysisMeta) -> Self {
        Self {
            pull_request,
            is_analysing: false,
            coverage: None,
            quality: None,
            meta,
        }
    }

    pub fn analysing(mut self, is_analysing: bool) -> Self {
        self.is_analysing = is_analysing;
        self
    }

    pub fn with_coverage(mut self, coverage: PullRequestCoverage) -> Self {
        self.coverage = Some(coverage);
        self
    }

    pub fn with_quality(mut self, quality: QualityAnalysis) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Whether coverage for this pull request has not been computed yet.
    ///
    /// Holds while the PR is being analysed, or while neither a delta nor a
    /// diff coverage is known. A diff coverage with no value only counts as
    /// pending when its cause is missing requirements.
    pub fn is_waiting_for_coverage(&self) -> bool {
        if self.is_analysing {
            return true;
        }
        let coverage = self.coverage.as_ref();
        let delta = coverage.and_then(|c| c.delta_coverage);
        let diff = coverage.and_then(|c| c.diff_coverage.as_ref());

        delta.is_none()
            && match diff {
                None => true,
                Some(d) => {
                    d.value.is_none() && d.cause == Some(DiffCoverageCause::MissingRequirements)
                }
            }
    }
}

/// A single uploaded coverage report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
}

/// Reports received for one commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReportList {
    #[serde(default)]
    pub reports: Vec<CoverageReport>,
}

impl CoverageReportList {
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// Coverage reports of a pull request's head and common-ancestor commits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoveragePullRequestData {
    #[serde(default)]
    pub head_commit: CoverageReportList,
    #[serde(default)]
    pub common_ancestor_commit: CoverageReportList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoveragePullRequestResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CoveragePullRequestData>,
}

impl CoveragePullRequestResponse {
    pub fn new(head: Vec<CoverageReport>, common_ancestor: Vec<CoverageReport>) -> Self {
        Self {
            data: Some(CoveragePullRequestData {
                head_commit: CoverageReportList { reports: head },
                common_ancestor_commit: CoverageReportList {
                    reports: common_ancestor,
                },
            }),
        }
    }
}
