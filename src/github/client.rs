use crate::config::Config;
use crate::error::{ReportError, Result};
use crate::github::pagination::{next_link_pattern, next_page_url, RateLimit};
use crate::github::{ActivitySource, RawComment, RawIssue, RawPullRequest, RawReview, RepoId};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use reqwest::header::{ACCEPT, LINK};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::ops::ControlFlow;
use std::time::Duration;
use tracing::{debug, warn};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// GitHub REST API client
pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: String,
    per_page: u32,
    grace: Duration,
    next_link: Regex,
}

impl GitHubClient {
    /// Create a new GitHub API client
    pub fn new(config: &Config, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            per_page: config.per_page,
            grace: Duration::from_secs(config.rate_limit_grace_secs),
            next_link: next_link_pattern()?,
        })
    }

    fn repo_url(&self, repo: &RepoId, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}?per_page={}",
            self.api_url, repo.owner, repo.name, path, self.per_page
        )
    }

    /// Fetch one page and the URL of the page after it. Sleeps through an
    /// exhausted quota instead of failing.
    async fn fetch_page<T: DeserializeOwned>(&self, url: &str) -> Result<(Vec<T>, Option<String>)> {
        loop {
            let response = self
                .client
                .get(url)
                .bearer_auth(&self.token)
                .header(ACCEPT, GITHUB_ACCEPT)
                .send()
                .await?;

            let status = response.status();
            let rate = RateLimit::from_headers(response.headers());
            if let Some(rate) = rate {
                debug!(
                    url,
                    limit = rate.limit,
                    remaining = rate.remaining,
                    reset = %rate.reset,
                    "Fetched page"
                );
            }

            // Rejected because of the quota: retry the same page after the reset
            if let Some(rate) = rate.filter(|r| r.is_exhausted() && is_rate_limited(status)) {
                self.wait_for_reset(&rate).await;
                continue;
            }

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(ReportError::api(status.as_u16(), error_text));
            }

            let next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(|link| next_page_url(&self.next_link, link));
            let page: Vec<T> = response.json().await?;

            if let Some(rate) = rate.filter(RateLimit::is_exhausted) {
                self.wait_for_reset(&rate).await;
            }

            return Ok((page, next));
        }
    }

    async fn wait_for_reset(&self, rate: &RateLimit) {
        let wait = rate.wait_time(Utc::now(), self.grace);
        warn!(
            limit = rate.limit,
            reset = %rate.reset,
            "No more requests this period, sleeping for {}s",
            wait.as_secs()
        );
        tokio::time::sleep(wait).await;
    }

    /// Walk every page starting at `url`, handing each record to `visit`
    /// until it breaks.
    async fn list<T, F>(&self, url: String, mut visit: F) -> Result<()>
    where
        T: DeserializeOwned,
        F: FnMut(T) -> ControlFlow<()>,
    {
        let mut next = Some(url);
        while let Some(url) = next {
            let (page, following) = self.fetch_page::<T>(&url).await?;
            for record in page {
                if visit(record).is_break() {
                    return Ok(());
                }
            }
            next = following;
        }
        Ok(())
    }

    async fn list_all<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>> {
        let mut records = Vec::new();
        self.list(url, |record| {
            records.push(record);
            ControlFlow::Continue(())
        })
        .await?;
        Ok(records)
    }
}

fn is_rate_limited(status: StatusCode) -> bool {
    status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS
}

fn limit_reached(count: usize, limit: Option<usize>) -> ControlFlow<()> {
    if limit.is_some_and(|n| count >= n) {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}

impl ActivitySource for GitHubClient {
    async fn pull_requests(
        &self,
        repo: &RepoId,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<RawPullRequest>> {
        // The pulls endpoint has no `since` filter, so stop at the first
        // PR that is older than the cutoff.
        let url = format!(
            "{}&state=all&sort=updated&direction=desc",
            self.repo_url(repo, "pulls")
        );

        let mut prs = Vec::new();
        self.list(url, |pr: RawPullRequest| {
            if since.as_ref().is_some_and(|cutoff| pr.is_stale(cutoff)) {
                debug!(repo = %repo, number = pr.number, "Reached PRs older than cutoff");
                return ControlFlow::Break(());
            }
            prs.push(pr);
            limit_reached(prs.len(), limit)
        })
        .await?;

        Ok(prs)
    }

    async fn issues(
        &self,
        repo: &RepoId,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<RawIssue>> {
        let mut url = format!(
            "{}&state=all&sort=updated&direction=desc",
            self.repo_url(repo, "issues")
        );
        if let Some(cutoff) = since {
            url.push_str("&since=");
            url.push_str(&cutoff.to_rfc3339_opts(SecondsFormat::Secs, true));
        }

        let mut issues = Vec::new();
        self.list(url, |issue: RawIssue| {
            if issue.is_pull_request() {
                return ControlFlow::Continue(());
            }
            issues.push(issue);
            limit_reached(issues.len(), limit)
        })
        .await?;

        Ok(issues)
    }

    async fn pull_request_comments(&self, repo: &RepoId, number: u64) -> Result<Vec<RawComment>> {
        self.list_all(self.repo_url(repo, &format!("pulls/{}/comments", number)))
            .await
    }

    async fn pull_request_reviews(&self, repo: &RepoId, number: u64) -> Result<Vec<RawReview>> {
        self.list_all(self.repo_url(repo, &format!("pulls/{}/reviews", number)))
            .await
    }

    async fn issue_comments(&self, repo: &RepoId, number: u64) -> Result<Vec<RawComment>> {
        self.list_all(self.repo_url(repo, &format!("issues/{}/comments", number)))
            .await
    }
}
