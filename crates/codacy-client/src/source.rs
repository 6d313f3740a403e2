//! The seam between status evaluation and wherever snapshots come from.
//!
//! [`CodacyClient`] implements [`AnalysisSource`] over HTTP;
//! [`MemoryAnalysisSource`] serves pre-loaded snapshots for tests and
//! offline use.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use codacy_core::{CommitWithAnalysis, CoveragePullRequestResponse, PullRequestWithAnalysis};

use crate::client::CodacyClient;
use crate::error::ClientError;
use crate::repository::RepositoryRef;
use crate::Result;

/// Supplier of analysis snapshots.
#[async_trait]
pub trait AnalysisSource: Send + Sync {
    async fn fetch_commit_analysis(
        &self,
        repo: &RepositoryRef,
        sha: &str,
    ) -> Result<CommitWithAnalysis>;

    async fn fetch_pull_request_analysis(
        &self,
        repo: &RepositoryRef,
        number: u64,
    ) -> Result<PullRequestWithAnalysis>;

    async fn fetch_pull_request_coverage_reports(
        &self,
        repo: &RepositoryRef,
        number: u64,
    ) -> Result<CoveragePullRequestResponse>;
}

#[async_trait]
impl AnalysisSource for CodacyClient {
    async fn fetch_commit_analysis(
        &self,
        repo: &RepositoryRef,
        sha: &str,
    ) -> Result<CommitWithAnalysis> {
        CodacyClient::fetch_commit_analysis(self, repo, sha).await
    }

    async fn fetch_pull_request_analysis(
        &self,
        repo: &RepositoryRef,
        number: u64,
    ) -> Result<PullRequestWithAnalysis> {
        CodacyClient::fetch_pull_request_analysis(self, repo, number).await
    }

    async fn fetch_pull_request_coverage_reports(
        &self,
        repo: &RepositoryRef,
        number: u64,
    ) -> Result<CoveragePullRequestResponse> {
        CodacyClient::fetch_pull_request_coverage_reports(self, repo, number).await
    }
}

// ---------------------------------------------------------------------------
// MemoryAnalysisSource
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Snapshots {
    commits: HashMap<(RepositoryRef, String), CommitWithAnalysis>,
    pull_requests: HashMap<(RepositoryRef, u64), PullRequestWithAnalysis>,
    reports: HashMap<(RepositoryRef, u64), CoveragePullRequestResponse>,
}

/// In-memory snapshot source backed by `HashMap`s.
#[derive(Debug, Default)]
pub struct MemoryAnalysisSource {
    snapshots: RwLock<Snapshots>,
}

impl MemoryAnalysisSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_commit(&self, repo: &RepositoryRef, snapshot: CommitWithAnalysis) {
        let key = (repo.clone(), snapshot.commit.sha.clone());
        self.snapshots.write().await.commits.insert(key, snapshot);
    }

    pub async fn insert_pull_request(&self, repo: &RepositoryRef, snapshot: PullRequestWithAnalysis) {
        let key = (repo.clone(), snapshot.pull_request.number);
        self.snapshots.write().await.pull_requests.insert(key, snapshot);
    }

    pub async fn insert_coverage_reports(
        &self,
        repo: &RepositoryRef,
        number: u64,
        reports: CoveragePullRequestResponse,
    ) {
        self.snapshots
            .write()
            .await
            .reports
            .insert((repo.clone(), number), reports);
    }
}

#[async_trait]
impl AnalysisSource for MemoryAnalysisSource {
    async fn fetch_commit_analysis(
        &self,
        repo: &RepositoryRef,
        sha: &str,
    ) -> Result<CommitWithAnalysis> {
        self.snapshots
            .read()
            .await
            .commits
            .get(&(repo.clone(), sha.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("{repo} commit {sha}")))
    }

    async fn fetch_pull_request_analysis(
        &self,
        repo: &RepositoryRef,
        number: u64,
    ) -> Result<PullRequestWithAnalysis> {
        self.snapshots
            .read()
            .await
            .pull_requests
            .get(&(repo.clone(), number))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("{repo} pull request {number}")))
    }

    /// Missing reports read as an empty response, like a PR nobody has
    /// uploaded coverage for.
    async fn fetch_pull_request_coverage_reports(
        &self,
        repo: &RepositoryRef,
        number: u64,
    ) -> Result<CoveragePullRequestResponse> {
        Ok(self
            .snapshots
            .read()
            .await
            .reports
            .get(&(repo.clone(), number))
            .cloned()
            .unwrap_or_default())
    }
}
