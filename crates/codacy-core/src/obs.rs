//! Structured observability hooks for status evaluation.
//!
//! This module provides:
//! - Subject-scoped tracing spans via the `SubjectSpan` RAII guard
//! - Emission functions for evaluated statuses and failed snapshot fetches
//!
//! Events are emitted at `info!` level unless noted. For JSON output pass
//! `json = true` to [`crate::init_tracing`].

use tracing::info;

use crate::status::StatusResult;

/// RAII guard that enters a span tagged with the evaluated subject.
///
/// # Example
///
/// ```ignore
/// let _span = SubjectSpan::enter("PR #12");
/// // every event until the guard drops carries subject = "PR #12"
/// ```
pub struct SubjectSpan {
    _span: tracing::span::EnteredSpan,
}

impl SubjectSpan {
    pub fn enter(subject: &str) -> Self {
        let span = tracing::info_span!("codacy.status", subject = %subject);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a status was evaluated for a subject.
pub fn emit_status_evaluated(subject: &str, kind: &str, status: &StatusResult) {
    info!(
        event = "status.evaluated",
        subject = %subject,
        kind = %kind,
        value = %status.value,
        details = status.details.as_deref().unwrap_or(""),
    );
}

/// Emit event: fetching a snapshot failed (warning level).
pub fn emit_fetch_failed(subject: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "snapshot.fetch_failed", subject = %subject, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_span_create() {
        let _span = SubjectSpan::enter("commit abc1234");
    }
}
