//! Coverage status for commits and pull requests.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{passes_unless_reason_fails, CoverageLike, StatusEntry, StatusResult, StatusValue};
use crate::domain::{
    CommitWithAnalysis, CoveragePullRequestData, CoveragePullRequestResponse,
    PullRequestWithAnalysis,
};

/// How long after the last update coverage is still expected to arrive.
pub const RECENCY_WINDOW: Duration = Duration::from_secs(3 * 60 * 60);

/// Resolved coverage status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoverageStatusKey {
    Waiting,
    Passed,
    Failed,
    NoCoverage,
}

const COVERAGE_WAITING: StatusEntry = StatusEntry {
    value: StatusValue::Loading,
    message: "Pending...",
    icon: Some("loading~spin"),
    color_id: None,
};

const COVERAGE_PASSED: StatusEntry = StatusEntry {
    value: StatusValue::Passed,
    message: "Up to coverage standards.",
    icon: Some("pass"),
    color_id: Some("testing.iconPassed"),
};

const COVERAGE_FAILED: StatusEntry = StatusEntry {
    value: StatusValue::Failed,
    message: "Not up to coverage standards.",
    icon: Some("error"),
    color_id: Some("testing.iconFailed"),
};

const COVERAGE_NO_INFORMATION: StatusEntry = StatusEntry {
    value: StatusValue::NoInformation,
    message: "No information.",
    icon: Some("circle-slash"),
    color_id: Some("disabledForeground"),
};

impl CoverageStatusKey {
    pub fn entry(self) -> &'static StatusEntry {
        match self {
            Self::Waiting => &COVERAGE_WAITING,
            Self::Passed => &COVERAGE_PASSED,
            Self::Failed => &COVERAGE_FAILED,
            Self::NoCoverage => &COVERAGE_NO_INFORMATION,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::NoCoverage => "noCoverage",
        }
    }
}

fn is_recently_updated(now: DateTime<Utc>, last_updated: DateTime<Utc>) -> bool {
    // Negative elapsed time (clock skew) converts to an error and counts as recent.
    match (now - last_updated).to_std() {
        Ok(elapsed) => elapsed <= RECENCY_WINDOW,
        Err(_) => true,
    }
}

/// Resolve a coverage status key as of `now`.
///
/// While waiting, coverage is `Waiting` inside the recency window and
/// `NoCoverage` once it has elapsed. Otherwise the pass rule of
/// [`passes_unless_reason_fails`] applies, so an absent `coverage` resolves
/// to `Passed`.
pub fn resolve_coverage_status_at<C: CoverageLike + ?Sized>(
    now: DateTime<Utc>,
    is_waiting_for_analysis: bool,
    last_updated: DateTime<Utc>,
    coverage: Option<&C>,
) -> CoverageStatusKey {
    let key = if is_waiting_for_analysis {
        if is_recently_updated(now, last_updated) {
            CoverageStatusKey::Waiting
        } else {
            CoverageStatusKey::NoCoverage
        }
    } else if passes_unless_reason_fails(coverage) {
        CoverageStatusKey::Passed
    } else {
        CoverageStatusKey::Failed
    };

    debug!(
        status = key.as_str(),
        waiting = is_waiting_for_analysis,
        "resolved coverage status"
    );
    key
}

/// [`resolve_coverage_status_at`] against the wall clock.
pub fn resolve_coverage_status<C: CoverageLike + ?Sized>(
    is_waiting_for_analysis: bool,
    last_updated: DateTime<Utc>,
    coverage: Option<&C>,
) -> CoverageStatusKey {
    resolve_coverage_status_at(Utc::now(), is_waiting_for_analysis, last_updated, coverage)
}

/// Coverage status of a commit as of `now`.
///
/// Coverage is pending until the analysis has ended and a total coverage
/// figure exists.
pub fn coverage_commit_status_at(now: DateTime<Utc>, data: &CommitWithAnalysis) -> StatusResult {
    let is_waiting = data.commit.ended_analysis.is_none() || data.is_waiting_for_coverage();
    resolve_coverage_status_at(
        now,
        is_waiting,
        data.commit.commit_timestamp,
        data.coverage.as_ref(),
    )
    .entry()
    .to_result()
}

pub fn coverage_commit_status(data: &CommitWithAnalysis) -> StatusResult {
    coverage_commit_status_at(Utc::now(), data)
}

/// Whether a pull request's coverage is still pending.
pub fn is_pr_waiting_for_coverage(data: &PullRequestWithAnalysis) -> bool {
    data.is_waiting_for_coverage()
}

struct ReportsContext<'a> {
    key: CoverageStatusKey,
    data: &'a CoveragePullRequestData,
}

impl ReportsContext<'_> {
    fn head_empty(&self) -> bool {
        self.data.head_commit.is_empty()
    }

    fn ancestor_empty(&self) -> bool {
        self.data.common_ancestor_commit.is_empty()
    }
}

struct ReportsRule {
    applies: fn(&ReportsContext<'_>) -> bool,
    details: &'static str,
}

fn waiting_without_head_reports(ctx: &ReportsContext<'_>) -> bool {
    ctx.key == CoverageStatusKey::Waiting && ctx.head_empty()
}

fn waiting_with_all_reports(ctx: &ReportsContext<'_>) -> bool {
    ctx.key == CoverageStatusKey::Waiting && !ctx.head_empty() && !ctx.ancestor_empty()
}

fn no_coverage_missing_reports(ctx: &ReportsContext<'_>) -> bool {
    ctx.key == CoverageStatusKey::NoCoverage && (ctx.head_empty() || ctx.ancestor_empty())
}

fn no_coverage_unprocessed(ctx: &ReportsContext<'_>) -> bool {
    ctx.key == CoverageStatusKey::NoCoverage
}

// Evaluated in order; first match wins.
const REPORTS_RULES: &[ReportsRule] = &[
    ReportsRule {
        applies: waiting_without_head_reports,
        details: "Waiting for coverage reports...",
    },
    ReportsRule {
        applies: waiting_with_all_reports,
        details: "Processing coverage reports...",
    },
    ReportsRule {
        applies: no_coverage_missing_reports,
        details: "Missing coverage reports",
    },
    ReportsRule {
        applies: no_coverage_unprocessed,
        details: "Couldn't process coverage",
    },
];

fn reports_details(key: CoverageStatusKey, data: &CoveragePullRequestData) -> Option<&'static str> {
    let ctx = ReportsContext { key, data };
    REPORTS_RULES
        .iter()
        .find(|rule| (rule.applies)(&ctx))
        .map(|rule| rule.details)
}

/// Coverage status of a pull request as of `now`.
///
/// When a coverage reports response with data is supplied, `details`
/// explains what the pending or missing coverage is waiting on.
pub fn coverage_pr_status_at(
    now: DateTime<Utc>,
    data: &PullRequestWithAnalysis,
    reports: Option<&CoveragePullRequestResponse>,
) -> StatusResult {
    let key = resolve_coverage_status_at(
        now,
        is_pr_waiting_for_coverage(data),
        data.pull_request.updated,
        data.coverage.as_ref(),
    );

    let mut result = key.entry().to_result();
    if let Some(reports_data) = reports.and_then(|r| r.data.as_ref()) {
        result.details = reports_details(key, reports_data).map(str::to_string);
    }
    result
}

pub fn coverage_pr_status(
    data: &PullRequestWithAnalysis,
    reports: Option<&CoveragePullRequestResponse>,
) -> StatusResult {
    coverage_pr_status_at(Utc::now(), data, reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AnalysisMeta, Commit, CoverageAnalysis, CoverageReport, PullRequest,
        PullRequestCoverage, ResultReason,
    };
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn report() -> CoverageReport {
        CoverageReport {
            commit_uuid: Some("c0ffee".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_waiting_inside_recency_window() {
        let key = resolve_coverage_status_at::<CoverageAnalysis>(
            now(),
            true,
            now() - ChronoDuration::hours(1),
            None,
        );
        assert_eq!(key, CoverageStatusKey::Waiting);
    }

    #[test]
    fn test_recency_window_boundary() {
        let exactly = now() - ChronoDuration::hours(3);
        assert_eq!(
            resolve_coverage_status_at::<CoverageAnalysis>(now(), true, exactly, None),
            CoverageStatusKey::Waiting
        );

        let past = exactly - ChronoDuration::seconds(1);
        assert_eq!(
            resolve_coverage_status_at::<CoverageAnalysis>(now(), true, past, None),
            CoverageStatusKey::NoCoverage
        );
    }

    #[test]
    fn test_recency_window_sub_millisecond_overshoot() {
        let overshoot = now() - ChronoDuration::hours(3) - ChronoDuration::microseconds(500);
        assert_eq!(
            resolve_coverage_status_at::<CoverageAnalysis>(now(), true, overshoot, None),
            CoverageStatusKey::NoCoverage
        );

        let one_nanosecond = now() - ChronoDuration::hours(3) - ChronoDuration::nanoseconds(1);
        assert_eq!(
            resolve_coverage_status_at::<CoverageAnalysis>(now(), true, one_nanosecond, None),
            CoverageStatusKey::NoCoverage
        );
    }

    #[test]
    fn test_update_in_the_future_is_recent() {
        let ahead = now() + ChronoDuration::minutes(5);
        assert_eq!(
            resolve_coverage_status_at::<CoverageAnalysis>(now(), true, ahead, None),
            CoverageStatusKey::Waiting
        );
    }

    #[test]
    fn test_missing_coverage_resolves_passed() {
        let key = resolve_coverage_status_at::<CoverageAnalysis>(now(), false, now(), None);
        assert_eq!(key, CoverageStatusKey::Passed);
    }

    #[test]
    fn test_failing_reason_resolves_failed() {
        let coverage = CoverageAnalysis {
            is_up_to_standards: Some(false),
            result_reasons: Some(vec![ResultReason::new(false)]),
            ..Default::default()
        };
        let key = resolve_coverage_status_at(now(), false, now(), Some(&coverage));
        assert_eq!(key, CoverageStatusKey::Failed);
    }

    #[test]
    fn test_table_messages() {
        assert_eq!(CoverageStatusKey::Waiting.entry().message, "Pending...");
        assert_eq!(
            CoverageStatusKey::Passed.entry().message,
            "Up to coverage standards."
        );
        assert_eq!(
            CoverageStatusKey::Failed.entry().message,
            "Not up to coverage standards."
        );
        assert_eq!(
            CoverageStatusKey::NoCoverage.entry().value,
            StatusValue::NoInformation
        );
    }

    #[test]
    fn test_commit_waits_until_analysis_ended() {
        let commit = Commit::new("abc", now() - ChronoDuration::minutes(5))
            .with_analysis_window(Some(now() - ChronoDuration::minutes(4)), None);
        let data = CommitWithAnalysis::new(commit, AnalysisMeta::analyzable()).with_coverage(
            CoverageAnalysis {
                total_coverage_percentage: Some(80.0),
                ..Default::default()
            },
        );

        let status = coverage_commit_status_at(now(), &data);
        assert_eq!(status.value, StatusValue::Loading);
        assert_eq!(status.message, "Pending...");
    }

    #[test]
    fn test_commit_with_total_coverage_passes() {
        let commit = Commit::new("abc", now() - ChronoDuration::hours(10)).with_analysis_window(
            Some(now() - ChronoDuration::hours(9)),
            Some(now() - ChronoDuration::hours(8)),
        );
        let data = CommitWithAnalysis::new(commit, AnalysisMeta::analyzable()).with_coverage(
            CoverageAnalysis {
                total_coverage_percentage: Some(80.0),
                is_up_to_standards: Some(true),
                ..Default::default()
            },
        );

        let status = coverage_commit_status_at(now(), &data);
        assert_eq!(status.value, StatusValue::Passed);
        assert!(status.details.is_none());
    }

    #[test]
    fn test_old_commit_without_coverage_has_no_information() {
        let commit = Commit::new("abc", now() - ChronoDuration::days(2)).with_analysis_window(
            Some(now() - ChronoDuration::days(2)),
            Some(now() - ChronoDuration::days(2)),
        );
        let data = CommitWithAnalysis::new(commit, AnalysisMeta::analyzable());

        let status = coverage_commit_status_at(now(), &data);
        assert_eq!(status.value, StatusValue::NoInformation);
        assert_eq!(status.message, "No information.");
    }

    fn pr_updated(ago: ChronoDuration) -> PullRequestWithAnalysis {
        PullRequestWithAnalysis::new(
            PullRequest::new(1, 3, "Refactor", now() - ago),
            AnalysisMeta::analyzable(),
        )
    }

    #[test]
    fn test_pr_waiting_for_head_reports() {
        let data = pr_updated(ChronoDuration::minutes(10));
        let reports = CoveragePullRequestResponse::new(vec![], vec![report()]);

        let status = coverage_pr_status_at(now(), &data, Some(&reports));
        assert_eq!(status.value, StatusValue::Loading);
        assert_eq!(status.details.as_deref(), Some("Waiting for coverage reports..."));
    }

    #[test]
    fn test_pr_processing_reports() {
        let data = pr_updated(ChronoDuration::minutes(10));
        let reports = CoveragePullRequestResponse::new(vec![report()], vec![report()]);

        let status = coverage_pr_status_at(now(), &data, Some(&reports));
        assert_eq!(status.details.as_deref(), Some("Processing coverage reports..."));
    }

    #[test]
    fn test_pr_waiting_with_head_but_no_ancestor_has_no_details() {
        let data = pr_updated(ChronoDuration::minutes(10));
        let reports = CoveragePullRequestResponse::new(vec![report()], vec![]);

        let status = coverage_pr_status_at(now(), &data, Some(&reports));
        assert_eq!(status.value, StatusValue::Loading);
        assert!(status.details.is_none());
    }

    #[test]
    fn test_pr_missing_reports_after_window() {
        let data = pr_updated(ChronoDuration::hours(5));
        let reports = CoveragePullRequestResponse::new(vec![report()], vec![]);

        let status = coverage_pr_status_at(now(), &data, Some(&reports));
        assert_eq!(status.value, StatusValue::NoInformation);
        assert_eq!(status.details.as_deref(), Some("Missing coverage reports"));
    }

    #[test]
    fn test_pr_reports_present_but_unprocessed() {
        let data = pr_updated(ChronoDuration::hours(5));
        let reports = CoveragePullRequestResponse::new(vec![report()], vec![report()]);

        let status = coverage_pr_status_at(now(), &data, Some(&reports));
        assert_eq!(status.details.as_deref(), Some("Couldn't process coverage"));
    }

    #[test]
    fn test_pr_reports_without_data_leave_details_unset() {
        let data = pr_updated(ChronoDuration::hours(5));
        let reports = CoveragePullRequestResponse { data: None };

        let status = coverage_pr_status_at(now(), &data, Some(&reports));
        assert_eq!(status.value, StatusValue::NoInformation);
        assert!(status.details.is_none());
    }

    #[test]
    fn test_pr_with_delta_coverage_is_evaluated() {
        let data = pr_updated(ChronoDuration::hours(5)).with_coverage(PullRequestCoverage {
            delta_coverage: Some(-2.5),
            is_up_to_standards: Some(false),
            result_reasons: Some(vec![ResultReason::new(false).with_gate("diffCoverageThreshold")]),
            ..Default::default()
        });

        let status = coverage_pr_status_at(now(), &data, None);
        assert_eq!(status.value, StatusValue::Failed);
        assert_eq!(status.color_id.as_deref(), Some("testing.iconFailed"));
    }
}
