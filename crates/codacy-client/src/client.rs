//! Codacy v3 REST client
//!
//! Covers only the resources the status evaluator consumes: commit and
//! pull-request analysis, pull-request coverage reports, and the paginated
//! pull-request listing.

use std::collections::HashSet;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use codacy_core::{CommitWithAnalysis, CoveragePullRequestResponse, PullRequestWithAnalysis};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::repository::RepositoryRef;
use crate::Result;

/// Single-resource response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Cursor pagination block of list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> Page<T> {
    /// Cursor of the following page, if any.
    pub fn next_cursor(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.cursor.as_deref())
            .filter(|c| !c.is_empty())
    }
}

/// Cursor to request after `page`, or `None` once the listing is exhausted.
///
/// A cursor already in `seen` ends the listing, so a server cycling through
/// cursors cannot loop forever.
pub(crate) fn advance_cursor<T>(page: &Page<T>, seen: &mut HashSet<String>) -> Option<String> {
    if page.data.is_empty() {
        return None;
    }
    let next = page.next_cursor()?;
    if !seen.insert(next.to_string()) {
        warn!(cursor = next, "pagination cursor repeated; stopping");
        return None;
    }
    Some(next.to_string())
}

/// Map a non-success status to a [`ClientError`].
pub(crate) fn status_error(status: StatusCode, path: &str, body: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound(path.to_string()),
        _ => ClientError::Api {
            status: status.as_u16(),
            body,
        },
    }
}

/// Client for the Codacy v3 API
pub struct CodacyClient {
    base_url: Url,
    http_client: reqwest::Client,
}

impl CodacyClient {
    /// Create a new client. Fails without an API token.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let token = config
            .api_token
            .as_deref()
            .ok_or(ClientError::MissingToken)?;

        let mut token_value = HeaderValue::from_str(token)
            .map_err(|_| ClientError::InvalidConfig("API token is not a valid header".into()))?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("api-token", token_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidConfig(format!("base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidConfig(format!(
                "base url cannot carry paths: {}",
                config.base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(CodacyClient {
            base_url,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Build an endpoint URL under the API root. Segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn repository_endpoint(&self, area: &str, repo: &RepositoryRef, tail: &[&str]) -> Url {
        let mut segments = vec![
            area,
            "organizations",
            repo.provider.code(),
            repo.organization.as_str(),
            "repositories",
            repo.repository.as_str(),
        ];
        segments.extend_from_slice(tail);
        self.endpoint(&segments)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        debug!(url = %url, "GET");
        let response = self.http_client.get(url.clone()).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Codacy API request failed");
            return Err(status_error(status, url.path(), body));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch a commit with its quality and coverage analysis
    pub async fn fetch_commit_analysis(
        &self,
        repo: &RepositoryRef,
        sha: &str,
    ) -> Result<CommitWithAnalysis> {
        let url = self.repository_endpoint("analysis", repo, &["commits", sha]);
        let response: DataResponse<CommitWithAnalysis> = self.get_json(url, &[]).await?;
        Ok(response.data)
    }

    /// Fetch a pull request with its quality and coverage analysis
    pub async fn fetch_pull_request_analysis(
        &self,
        repo: &RepositoryRef,
        number: u64,
    ) -> Result<PullRequestWithAnalysis> {
        let number = number.to_string();
        let url = self.repository_endpoint("analysis", repo, &["pull-requests", &number]);
        let response: DataResponse<PullRequestWithAnalysis> = self.get_json(url, &[]).await?;
        Ok(response.data)
    }

    /// Fetch the coverage reports received for a pull request's head and
    /// common-ancestor commits
    pub async fn fetch_pull_request_coverage_reports(
        &self,
        repo: &RepositoryRef,
        number: u64,
    ) -> Result<CoveragePullRequestResponse> {
        let number = number.to_string();
        let url = self.repository_endpoint("coverage", repo, &["pull-requests", &number]);
        self.get_json(url, &[]).await
    }

    /// Fetch one page of the repository's pull requests
    pub async fn list_pull_requests(
        &self,
        repo: &RepositoryRef,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<PullRequestWithAnalysis>> {
        let url = self.repository_endpoint("analysis", repo, &["pull-requests"]);
        let mut query = vec![("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.get_json(url, &query).await
    }

    /// Follow cursors until the listing is exhausted
    pub async fn list_all_pull_requests(
        &self,
        repo: &RepositoryRef,
        page_limit: u32,
    ) -> Result<Vec<PullRequestWithAnalysis>> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let page = self
                .list_pull_requests(repo, cursor.as_deref(), page_limit)
                .await?;
            let next = advance_cursor(&page, &mut seen);
            all.extend(page.data);
            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(repo = %repo, count = all.len(), "listed pull requests");
        Ok(all)
    }
}
