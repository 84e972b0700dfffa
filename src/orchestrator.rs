use crate::activity::item::{Item, Items};
use crate::activity::users::Users;
use crate::error::Result;
use crate::github::{ActivitySource, RepoId};
use crate::period::Window;
use tracing::{debug, error, info, warn};

/// Orchestrator for the fetch phase: pulls raw records from the source
/// and turns them into items, resolving every user through one registry.
pub struct Orchestrator<S> {
    source: S,
    users: Users,
}

impl<S: ActivitySource> Orchestrator<S> {
    /// Create a new orchestrator
    pub fn new(source: S) -> Self {
        Self {
            source,
            users: Users::new(),
        }
    }

    /// Fetch PRs and issues of every repository. Failing repositories are
    /// logged and left out.
    pub async fn collect(&mut self, repos: &[RepoId], window: &Window) -> Items {
        let mut items = Items::new();

        for repo in repos {
            info!(repo = %repo, "Handling PRs");
            if let Err(e) = self.collect_pull_requests(repo, window, &mut items).await {
                error!(repo = %repo, "Error getting PRs: {}", e);
            }

            info!(repo = %repo, "Handling issues");
            if let Err(e) = self.collect_issues(repo, window, &mut items).await {
                error!(repo = %repo, "Error getting issues: {}", e);
            }
        }

        items
    }

    async fn collect_pull_requests(
        &mut self,
        repo: &RepoId,
        window: &Window,
        items: &mut Items,
    ) -> Result<()> {
        let prs = self
            .source
            .pull_requests(repo, window.since(), window.limit())
            .await?;

        for raw in &prs {
            let mut item = Item::from_pull_request(raw, repo, &mut self.users);
            info!("Handle PR: {} {} ({})", item.id, item.title, item.state);
            debug!(
                updated_at = ?item.updated_at,
                merged = item.merged,
                merged_at = ?item.merged_at,
                "PR details"
            );

            let comments = or_empty(
                self.source.pull_request_comments(repo, raw.number).await,
                "review comments",
                &item.id,
            );
            item.add_comments(&comments, &mut self.users);

            let conversation = or_empty(
                self.source.issue_comments(repo, raw.number).await,
                "comments",
                &item.id,
            );
            item.add_comments(&conversation, &mut self.users);

            let reviews = or_empty(
                self.source.pull_request_reviews(repo, raw.number).await,
                "reviews",
                &item.id,
            );
            item.add_reviews(&reviews, &mut self.users);

            items.push(item);
        }

        Ok(())
    }

    async fn collect_issues(&mut self, repo: &RepoId, window: &Window, items: &mut Items) -> Result<()> {
        let issues = self
            .source
            .issues(repo, window.since(), window.limit())
            .await?;

        for raw in issues.iter().filter(|i| !i.is_pull_request()) {
            let mut item = Item::from_issue(raw, repo, &mut self.users);
            info!("Handle Issue: {} {} ({})", item.id, item.title, item.state);
            debug!(updated_at = ?item.updated_at, "Issue details");

            let comments = or_empty(
                self.source.issue_comments(repo, raw.number).await,
                "comments",
                &item.id,
            );
            item.add_comments(&comments, &mut self.users);

            items.push(item);
        }

        Ok(())
    }

    /// The identity registry built while collecting
    pub fn users(&self) -> &Users {
        &self.users
    }
}

/// A sub-list that failed to load is treated as empty
fn or_empty<T>(result: Result<Vec<T>>, what: &str, id: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Error getting {} for {}: {}", what, id, e);
        Vec::new()
    })
}

/// Parse `owner/repo` arguments, skipping malformed ones with a warning
pub fn parse_repos(args: &[String]) -> Vec<RepoId> {
    args.iter()
        .filter_map(|arg| match RepoId::parse(arg) {
            Ok(repo) => Some(repo),
            Err(e) => {
                warn!("{}, skipping", e);
                None
            }
        })
        .collect()
}
