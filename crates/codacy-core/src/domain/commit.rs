//! Commits and their analysis snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisMeta, CoverageAnalysis, QualityAnalysis};

/// A commit as reported by the analysis platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub sha: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub commit_timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_analysis: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_analysis: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl Commit {
    /// Create a commit with no analysis timestamps.
    pub fn new(sha: &str, commit_timestamp: DateTime<Utc>) -> Self {
        Self {
            sha: sha.to_string(),
            id: None,
            commit_timestamp,
            started_analysis: None,
            ended_analysis: None,
            message: None,
            author_name: None,
            author_email: None,
            branch: None,
        }
    }

    pub fn with_analysis_window(
        mut self,
        started: Option<DateTime<Utc>>,
        ended: Option<DateTime<Utc>>,
    ) -> Self {
        self.started_analysis = started;
        self.ended_analysis = ended;
        self
    }

    /// True while an analysis is in flight.
    ///
    /// A start time later than the recorded end means a re-analysis began
    /// before the previous end was overwritten.
    pub fn is_being_analysed(&self) -> bool {
        match (self.started_analysis, self.ended_analysis) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(started), Some(ended)) => started > ended,
        }
    }

    /// First 7 characters of the SHA.
    pub fn short_sha(&self) -> &str {
        let end = self
            .sha
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.sha.len());
        &self.sha[..end]
    }
}

/// A commit bundled with its quality and coverage analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitWithAnalysis {
    pub commit: Commit,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageAnalysis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityAnalysis>,

    #[serde(default)]
    pub meta: AnalysisMeta,
}

impl CommitWithAnalysis {
    pub fn new(commit: Commit, meta: AnalysisMeta) -> Self {
        Self {
            commit,
            coverage: None,
            quality: None,
            meta,
        }
    }

    pub fn with_coverage(mut self, coverage: CoverageAnalysis) -> Self {
        self.coverage = Some(coverage);
        self
    }

    pub fn with_quality(mut self, quality: QualityAnalysis) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Whether the commit still lacks a computed total coverage figure.
    pub fn is_waiting_for_coverage(&self) -> bool {
        !self
            .coverage
            .as_ref()
            .is_some_and(CoverageAnalysis::has_total_coverage)
    }
}
