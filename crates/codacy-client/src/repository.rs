//! Repository identity: which provider, organization and repository a
//! snapshot belongs to.

use std::fmt;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::Result;

/// Git hosting provider, by its Codacy short code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "gh")]
    GitHub,
    #[serde(rename = "gl")]
    GitLab,
    #[serde(rename = "bb")]
    Bitbucket,
}

impl Provider {
    pub fn code(self) -> &'static str {
        match self {
            Provider::GitHub => "gh",
            Provider::GitLab => "gl",
            Provider::Bitbucket => "bb",
        }
    }

    fn from_host(host: &str) -> Option<Self> {
        match host.to_ascii_lowercase().as_str() {
            "github.com" => Some(Provider::GitHub),
            "gitlab.com" => Some(Provider::GitLab),
            "bitbucket.org" => Some(Provider::Bitbucket),
            _ => None,
        }
    }
}

impl FromStr for Provider {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gh" | "github" => Ok(Provider::GitHub),
            "gl" | "gitlab" => Ok(Provider::GitLab),
            "bb" | "bitbucket" => Ok(Provider::Bitbucket),
            other => Err(ClientError::InvalidRepository(format!(
                "unknown provider '{other}'"
            ))),
        }
    }
}

/// `provider/organization/repository` triple addressing a Codacy repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub provider: Provider,
    pub organization: String,
    pub repository: String,
}

impl RepositoryRef {
    pub fn new(provider: Provider, organization: &str, repository: &str) -> Self {
        Self {
            provider,
            organization: organization.to_string(),
            repository: repository.to_string(),
        }
    }

    /// Parse an https/ssh URL or scp-style remote such as
    /// `git@github.com:org/repo.git`.
    pub fn from_remote_url(url: &str) -> Result<Self> {
        let url = url.trim();
        let caps = url_remote_re()
            .captures(url)
            .or_else(|| scp_remote_re().captures(url))
            .ok_or_else(|| ClientError::UnsupportedRemote(url.to_string()))?;

        let provider = Provider::from_host(&caps["host"])
            .ok_or_else(|| ClientError::UnsupportedRemote(url.to_string()))?;

        Ok(Self::new(provider, &caps["org"], &caps["repo"]))
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.provider.code(),
            self.organization,
            self.repository
        )
    }
}

impl FromStr for RepositoryRef {
    type Err = ClientError;

    /// Parse the short form `gh/org/repo`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        match parts.as_slice() {
            [provider, org, repo] if !org.is_empty() && !repo.is_empty() => {
                Ok(Self::new(provider.parse()?, org, repo))
            }
            _ => Err(ClientError::InvalidRepository(format!(
                "expected provider/organization/repository, got '{s}'"
            ))),
        }
    }
}

fn url_remote_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:https?|ssh|git)://(?:[^@/]+@)?(?P<host>[^/:]+)(?::\d+)?/(?P<org>.+)/(?P<repo>[^/]+?)(?:\.git)?/?$",
        )
        .expect("remote url pattern is valid")
    })
}

fn scp_remote_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[^@/]+@)?(?P<host>[^:/]+):(?P<org>[^/].*)/(?P<repo>[^/]+?)(?:\.git)?/?$")
            .expect("scp remote pattern is valid")
    })
}

/// Read the URL of a git remote.
///
/// Runs `git remote get-url <remote>` in `repo_dir`.
pub fn capture_remote_url(repo_dir: &Path, remote: &str) -> Result<String> {
    let output = Command::new("git")
        .args(["remote", "get-url", remote])
        .current_dir(repo_dir)
        .output()
        .map_err(|e| ClientError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClientError::Git(format!(
            "git remote get-url {remote} failed: {}",
            stderr.trim()
        )));
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if url.is_empty() {
        return Err(ClientError::Git(format!(
            "remote '{remote}' has an empty URL"
        )));
    }
    Ok(url)
}
