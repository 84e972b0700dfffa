pub mod client;
pub mod pagination;

use crate::error::{ReportError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// A GitHub repository given as `owner/repo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Parse an `owner/repo` argument
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ReportError::InvalidRepo(input.to_string())),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A user reference as returned by the REST API
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub login: String,
    #[serde(default)]
    pub html_url: String,
}

/// A pull request from `GET /repos/{owner}/{repo}/pulls`
#[derive(Debug, Clone, Deserialize)]
pub struct RawPullRequest {
    pub number: u64,
    pub state: String,
    pub title: String,
    pub html_url: String,
    pub user: Option<RawUser>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Not part of the list payload, only of single-PR responses
    pub merged: Option<bool>,
    pub merged_at: Option<DateTime<Utc>>,
    pub merged_by: Option<RawUser>,
}

impl RawPullRequest {
    /// True if nothing happened to this PR since `cutoff`. Absent
    /// timestamps count as before the cutoff.
    pub fn is_stale(&self, cutoff: &DateTime<Utc>) -> bool {
        let before = |t: Option<&DateTime<Utc>>| t.map_or(true, |t| t < cutoff);
        &self.created_at < cutoff
            && before(self.updated_at.as_ref())
            && before(self.closed_at.as_ref())
    }
}

/// An issue from `GET /repos/{owner}/{repo}/issues`
#[derive(Debug, Clone, Deserialize)]
pub struct RawIssue {
    pub number: u64,
    pub state: String,
    pub title: String,
    pub html_url: String,
    pub user: Option<RawUser>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub pull_request: Option<serde_json::Value>,
}

impl RawIssue {
    /// The issues endpoint also lists pull requests
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// An issue comment or an inline PR review comment
#[derive(Debug, Clone, Deserialize)]
pub struct RawComment {
    pub user: Option<RawUser>,
    pub created_at: DateTime<Utc>,
}

/// A PR review. Pending reviews have no submission time.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReview {
    pub user: Option<RawUser>,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Source of raw issue and pull request records
#[allow(async_fn_in_trait)]
pub trait ActivitySource {
    /// PRs ordered by most recently updated. Listing stops at the first PR
    /// untouched since `since`, or after `limit` records.
    async fn pull_requests(
        &self,
        repo: &RepoId,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<RawPullRequest>>;

    /// Issues updated since `since`, excluding pull requests
    async fn issues(
        &self,
        repo: &RepoId,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<RawIssue>>;

    /// Inline review comments on a PR diff
    async fn pull_request_comments(&self, repo: &RepoId, number: u64) -> Result<Vec<RawComment>>;

    async fn pull_request_reviews(&self, repo: &RepoId, number: u64) -> Result<Vec<RawReview>>;

    /// Conversation comments of an issue or PR
    async fn issue_comments(&self, repo: &RepoId, number: u64) -> Result<Vec<RawComment>>;
}
