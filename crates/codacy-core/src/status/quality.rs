//! Quality status resolution.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{passes_unless_reason_fails, CoverageLike, StatusEntry, StatusValue};
use crate::domain::QualityAnalysis;

/// Resolved quality status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualityStatusKey {
    Waiting,
    Passed,
    Failed,
    NoInfo,
}

const QUALITY_WAITING: StatusEntry = StatusEntry {
    value: StatusValue::Loading,
    message: "Analysing...",
    icon: Some("loading~spin"),
    color_id: None,
};

const QUALITY_PASSED: StatusEntry = StatusEntry {
    value: StatusValue::Passed,
    message: "Up to quality standards.",
    icon: Some("pass"),
    color_id: Some("testing.iconPassed"),
};

const QUALITY_FAILED: StatusEntry = StatusEntry {
    value: StatusValue::Failed,
    message: "Not up to quality standards.",
    icon: Some("error"),
    color_id: Some("testing.iconFailed"),
};

const QUALITY_NO_INFORMATION: StatusEntry = StatusEntry {
    value: StatusValue::NoInformation,
    message: "No information.",
    icon: Some("circle-slash"),
    color_id: Some("disabledForeground"),
};

impl QualityStatusKey {
    pub fn entry(self) -> &'static StatusEntry {
        match self {
            Self::Waiting => &QUALITY_WAITING,
            Self::Passed => &QUALITY_PASSED,
            Self::Failed => &QUALITY_FAILED,
            Self::NoInfo => &QUALITY_NO_INFORMATION,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::NoInfo => "noInfo",
        }
    }
}

/// Resolve a quality status key.
///
/// Subjects that cannot be analysed always resolve to `NoInfo`. A finished
/// analysis without an overall verdict also resolves to `NoInfo`.
pub fn resolve_quality_status(
    is_waiting_for_analysis: bool,
    is_analyzable: bool,
    quality: Option<&QualityAnalysis>,
) -> QualityStatusKey {
    let key = if is_waiting_for_analysis {
        if is_analyzable {
            QualityStatusKey::Waiting
        } else {
            QualityStatusKey::NoInfo
        }
    } else if !is_analyzable || quality.and_then(CoverageLike::is_up_to_standards).is_none() {
        QualityStatusKey::NoInfo
    } else if passes_unless_reason_fails(quality) {
        QualityStatusKey::Passed
    } else {
        QualityStatusKey::Failed
    };

    debug!(
        status = key.as_str(),
        waiting = is_waiting_for_analysis,
        analyzable = is_analyzable,
        "resolved quality status"
    );
    key
}
