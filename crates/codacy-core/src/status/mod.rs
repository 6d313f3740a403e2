//! Traffic-light status evaluation for commits and pull requests.
//!
//! Every function here is total: missing data resolves to a "waiting" or
//! "no information" status rather than an error. Functions suffixed `_at`
//! take the evaluation instant explicitly; their unsuffixed twins read the
//! wall clock.

pub mod combined;
pub mod coverage;
pub mod quality;

use serde::{Deserialize, Serialize};

use crate::domain::{Commit, CoverageAnalysis, PullRequestCoverage, QualityAnalysis, ResultReason};

/// Rendered status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusValue {
    Loading,
    Passed,
    Failed,
    NoInformation,
}

impl StatusValue {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::NoInformation => "noInformation",
        }
    }
}

impl std::fmt::Display for StatusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static display record behind each status key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEntry {
    pub value: StatusValue,
    pub message: &'static str,
    pub icon: Option<&'static str>,
    pub color_id: Option<&'static str>,
}

impl StatusEntry {
    pub fn to_result(&self) -> StatusResult {
        StatusResult {
            value: self.value,
            message: self.message.to_string(),
            icon: self.icon.map(str::to_string),
            color_id: self.color_id.map(str::to_string),
            details: None,
            quality: None,
            coverage: None,
        }
    }
}

/// Status handed to presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
    pub value: StatusValue,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Quality half of a combined status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Box<StatusResult>>,

    /// Coverage half of a combined status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Box<StatusResult>>,
}

impl StatusResult {
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Shared shape of quality and coverage analyses: an overall flag plus
/// per-gate reasons.
pub trait CoverageLike {
    fn is_up_to_standards(&self) -> Option<bool>;
    fn result_reasons(&self) -> Option<&[ResultReason]>;
}

macro_rules! impl_coverage_like {
    ($($ty:ty),*) => {
        $(impl CoverageLike for $ty {
            fn is_up_to_standards(&self) -> Option<bool> {
                self.is_up_to_standards
            }

            fn result_reasons(&self) -> Option<&[ResultReason]> {
                self.result_reasons.as_deref()
            }
        })*
    };
}

impl_coverage_like!(CoverageAnalysis, PullRequestCoverage, QualityAnalysis);

/// "No negative evidence" pass rule shared by quality and coverage.
///
/// Passes when the analysis is flagged up to standards, when it carries no
/// reasons (absent or empty), or when none of its reasons fails. An absent
/// analysis therefore passes.
pub(crate) fn passes_unless_reason_fails<C: CoverageLike + ?Sized>(analysis: Option<&C>) -> bool {
    if analysis.and_then(|a| a.is_up_to_standards()) == Some(true) {
        return true;
    }
    match analysis.and_then(|a| a.result_reasons()) {
        None => true,
        Some([]) => true,
        Some(reasons) => !reasons.iter().any(|r| !r.is_up_to_standards),
    }
}

/// Whether an analysis of `commit` is currently running.
pub fn is_commit_being_analysed(commit: &Commit) -> bool {
    commit.is_being_analysed()
}
