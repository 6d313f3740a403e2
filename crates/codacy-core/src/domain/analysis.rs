//! Quality and coverage analysis payloads attached to commits and pull requests.

use serde::{Deserialize, Serialize};

/// Threshold a gate was evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedThreshold {
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_severity: Option<String>,
}

/// One sub-check of a quality or coverage gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultReason {
    pub is_up_to_standards: bool,

    /// Gate name, e.g. `coverageThresholdWithDecimals`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_threshold: Option<ExpectedThreshold>,
}

impl ResultReason {
    /// A bare reason with only the pass/fail flag set.
    pub fn new(is_up_to_standards: bool) -> Self {
        Self {
            is_up_to_standards,
            gate: None,
            expected: None,
            expected_threshold: None,
        }
    }

    pub fn with_gate(mut self, gate: &str) -> Self {
        self.gate = Some(gate.to_string());
        self
    }
}

/// Why diff coverage has no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DiffCoverageCause {
    ValueIsPresent,
    NoCoverageData,
    MissingRequirements,
    NoCoverableLines,
    Other(String),
}

impl From<String> for DiffCoverageCause {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ValueIsPresent" => Self::ValueIsPresent,
            "NoCoverageData" => Self::NoCoverageData,
            "MissingRequirements" => Self::MissingRequirements,
            "NoCoverableLines" => Self::NoCoverableLines,
            _ => Self::Other(s),
        }
    }
}

impl From<DiffCoverageCause> for String {
    fn from(cause: DiffCoverageCause) -> Self {
        match cause {
            DiffCoverageCause::ValueIsPresent => "ValueIsPresent".to_string(),
            DiffCoverageCause::NoCoverageData => "NoCoverageData".to_string(),
            DiffCoverageCause::MissingRequirements => "MissingRequirements".to_string(),
            DiffCoverageCause::NoCoverableLines => "NoCoverableLines".to_string(),
            DiffCoverageCause::Other(s) => s,
        }
    }
}

/// Coverage of the lines changed by a pull request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffCoverage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<DiffCoverageCause>,
}

/// Coverage analysis of a single commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_up_to_standards: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_reasons: Option<Vec<ResultReason>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_coverage_percentage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_coverage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_coverage: Option<DiffCoverage>,
}

impl CoverageAnalysis {
    /// Whether a non-zero total coverage figure has been computed.
    ///
    /// Zero counts as "not computed yet".
    pub fn has_total_coverage(&self) -> bool {
        matches!(self.total_coverage_percentage, Some(v) if v != 0.0 && !v.is_nan())
    }
}

/// Coverage analysis of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestCoverage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_up_to_standards: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_reasons: Option<Vec<ResultReason>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_coverage_percentage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_coverage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_coverage: Option<DiffCoverage>,
}

/// Quality analysis of a commit or pull request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_up_to_standards: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_reasons: Option<Vec<ResultReason>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_issues: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_issues: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_complexity: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_clones_count: Option<i64>,
}

/// Whether the platform could analyse the subject at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMeta {
    pub analyzable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AnalysisMeta {
    pub fn analyzable() -> Self {
        Self {
            analyzable: true,
            reason: None,
        }
    }

    pub fn not_analyzable(reason: &str) -> Self {
        Self {
            analyzable: false,
            reason: Some(reason.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_analysis_from_camel_case() {
        let json = r#"{
            "isUpToStandards": false,
            "resultReasons": [
                { "isUpToStandards": false, "gate": "coverageThresholdWithDecimals", "expected": 80.0 }
            ],
            "totalCoveragePercentage": 71.5,
            "diffCoverage": { "cause": "MissingRequirements" }
        }"#;
        let coverage: CoverageAnalysis = serde_json::from_str(json).expect("deserialize");

        assert_eq!(coverage.is_up_to_standards, Some(false));
        let reasons = coverage.result_reasons.as_ref().expect("reasons");
        assert_eq!(reasons[0].gate.as_deref(), Some("coverageThresholdWithDecimals"));
        assert_eq!(coverage.total_coverage_percentage, Some(71.5));
        assert_eq!(
            coverage.diff_coverage.and_then(|d| d.cause),
            Some(DiffCoverageCause::MissingRequirements)
        );
    }

    #[test]
    fn test_unknown_cause_is_preserved() {
        let cause: DiffCoverageCause = serde_json::from_str("\"SomethingNew\"").unwrap();
        assert_eq!(cause, DiffCoverageCause::Other("SomethingNew".to_string()));
        assert_eq!(serde_json::to_string(&cause).unwrap(), "\"SomethingNew\"");
    }

    #[test]
    fn test_zero_total_coverage_is_not_computed() {
        let mut coverage = CoverageAnalysis::default();
        assert!(!coverage.has_total_coverage());

        coverage.total_coverage_percentage = Some(0.0);
        assert!(!coverage.has_total_coverage());

        coverage.total_coverage_percentage = Some(0.1);
        assert!(coverage.has_total_coverage());
    }

    #[test]
    fn test_meta_defaults_reason_to_none() {
        let meta: AnalysisMeta = serde_json::from_str(r#"{"analyzable": true}"#).unwrap();
        assert_eq!(meta, AnalysisMeta::analyzable());
    }
}
