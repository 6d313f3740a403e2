//! Loading analysis snapshots from JSON documents on disk.
//!
//! The API wraps single resources as `{ "data": ... }`; files saved from
//! either a raw payload or a full API response are both accepted.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::commit::CommitWithAnalysis;
use super::error::{Result, StatusError};
use super::pull_request::{CoveragePullRequestResponse, PullRequestWithAnalysis};

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

fn read_document(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(StatusError::InvalidSnapshot(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(content)
}

/// Parse a possibly `data`-wrapped document.
pub fn parse_enveloped<T: DeserializeOwned>(content: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(content)?;
    Ok(envelope.into_inner())
}

/// Load a [`CommitWithAnalysis`] snapshot.
pub fn load_commit_snapshot(path: &Path) -> Result<CommitWithAnalysis> {
    debug!(path = %path.display(), "loading commit snapshot");
    parse_enveloped(&read_document(path)?)
}

/// Load a [`PullRequestWithAnalysis`] snapshot.
pub fn load_pull_request_snapshot(path: &Path) -> Result<PullRequestWithAnalysis> {
    debug!(path = %path.display(), "loading pull request snapshot");
    parse_enveloped(&read_document(path)?)
}

/// Load a coverage reports response. The document is the response itself.
pub fn load_coverage_reports(path: &Path) -> Result<CoveragePullRequestResponse> {
    debug!(path = %path.display(), "loading coverage reports");
    let response = serde_json::from_str(&read_document(path)?)?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const COMMIT: &str = r#"{
        "commit": { "sha": "abc1234", "commitTimestamp": "2024-03-01T12:00:00Z" },
        "meta": { "analyzable": true }
    }"#;

    #[test]
    fn test_load_bare_commit_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commit.json");
        std::fs::write(&path, COMMIT).unwrap();

        let snapshot = load_commit_snapshot(&path).expect("load");
        assert_eq!(snapshot.commit.sha, "abc1234");
        assert!(snapshot.meta.analyzable);
    }

    #[test]
    fn test_load_wrapped_commit_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commit.json");
        std::fs::write(&path, format!("{{ \"data\": {COMMIT} }}")).unwrap();

        let snapshot = load_commit_snapshot(&path).expect("load");
        assert_eq!(snapshot.commit.sha, "abc1234");
    }

    #[test]
    fn test_load_pull_request_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pr.json");
        std::fs::write(
            &path,
            r#"{ "data": {
                "pullRequest": { "id": 9, "number": 12, "title": "Fix", "updated": "2024-03-01T12:00:00Z" },
                "isAnalysing": true,
                "meta": { "analyzable": true }
            } }"#,
        )
        .unwrap();

        let snapshot = load_pull_request_snapshot(&path).expect("load");
        assert_eq!(snapshot.pull_request.number, 12);
        assert!(snapshot.is_analysing);
    }

    #[test]
    fn test_empty_file_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "  \n").unwrap();

        let err = load_commit_snapshot(&path).unwrap_err();
        assert!(matches!(err, StatusError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_coverage_reports(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, StatusError::Io(_)));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ \"commit\": ").unwrap();

        let err = load_commit_snapshot(&path).unwrap_err();
        assert!(matches!(err, StatusError::Serialization(_)));
    }
}
