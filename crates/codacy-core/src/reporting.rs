use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::CoveragePullRequestResponse;
use crate::status::combined::AnalysisContext;
use crate::status::StatusResult;

/// Combined and coverage status of one subject, as written for CI or PR
/// reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub label: String,
    pub generated_at: DateTime<Utc>,
    pub status: StatusResult,
    pub coverage: StatusResult,
}

impl StatusReport {
    /// Evaluate both statuses of `context` as of `now`.
    pub fn evaluate_at(
        context: &AnalysisContext<'_>,
        now: DateTime<Utc>,
        expect_coverage: bool,
        reports: Option<&CoveragePullRequestResponse>,
    ) -> Self {
        Self {
            label: context.label(),
            generated_at: now,
            status: context.quality_status_at(now, expect_coverage),
            coverage: context.coverage_status_at(now, reports),
        }
    }
}

/// One-line rendering: `[passed] PR #3: Up to quality standards.`
///
/// Details, when present, are appended in parentheses.
pub fn render_status_line(label: &str, status: &StatusResult) -> String {
    let mut line = format!("[{}] {}: {}", status.value, label, status.message);
    if let Some(details) = &status.details {
        line.push_str(&format!(" ({})", details));
    }
    line
}

/// Render a markdown block with the quality and coverage halves as rows.
pub fn render_status_markdown(label: &str, status: &StatusResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("### {}\n\n", label));
    out.push_str(&format!("**{}**: {}\n", status.value, status.message));
    if let Some(details) = &status.details {
        out.push_str(&format!("\n> {}\n", details));
    }

    let halves = [("Quality", &status.quality), ("Coverage", &status.coverage)];
    if halves.iter().any(|(_, half)| half.is_some()) {
        out.push_str("\n| Check | Status | Message |\n|---|---|---|\n");
        for (name, half) in halves {
            if let Some(half) = half {
                out.push_str(&format!("| {} | {} | {} |\n", name, half.value, half.message));
            }
        }
    }
    out
}

/// Write a status report as pretty JSON.
pub fn write_status_report_json(path: &Path, report: &StatusReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize status report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisMeta, Commit, CommitWithAnalysis, QualityAnalysis};
    use crate::status::quality::QualityStatusKey;
    use crate::status::StatusValue;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_status_line_with_details() {
        let status = QualityStatusKey::NoInfo
            .entry()
            .to_result()
            .with_details("Repository is archived");
        assert_eq!(
            render_status_line("PR #3", &status),
            "[noInformation] PR #3: No information. (Repository is archived)"
        );
    }

    #[test]
    fn test_status_line_without_details() {
        let status = QualityStatusKey::Passed.entry().to_result();
        assert_eq!(
            render_status_line("commit abc1234", &status),
            "[passed] commit abc1234: Up to quality standards."
        );
    }

    #[test]
    fn test_markdown_lists_halves() {
        let mut status = QualityStatusKey::Passed.entry().to_result();
        status.quality = Some(Box::new(QualityStatusKey::Passed.entry().to_result()));
        let md = render_status_markdown("PR #3", &status);

        assert!(md.starts_with("### PR #3"));
        assert!(md.contains("| Quality | passed | Up to quality standards. |"));
        assert!(!md.contains("| Coverage |"));
    }

    #[test]
    fn test_report_roundtrip_through_file() {
        let commit = Commit::new("abcdef0123", now() - chrono::Duration::days(1))
            .with_analysis_window(
                Some(now() - chrono::Duration::days(1)),
                Some(now() - chrono::Duration::hours(23)),
            );
        let data = CommitWithAnalysis::new(commit, AnalysisMeta::analyzable()).with_quality(
            QualityAnalysis {
                is_up_to_standards: Some(true),
                ..Default::default()
            },
        );
        let report = StatusReport::evaluate_at(&AnalysisContext::from(&data), now(), false, None);
        assert_eq!(report.status.value, StatusValue::Passed);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        write_status_report_json(&path, &report).unwrap();

        let read: StatusReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, report);
    }
}
