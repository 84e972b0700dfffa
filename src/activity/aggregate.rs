//! Classification of items relative to a reporting period.
//!
//! Both modes are pure functions over already fetched items: the same
//! input always yields the same buckets and counters.

use crate::activity::item::Item;
use crate::activity::users::UserSet;
use crate::period::Period;

/// Scalar counters of a repository-mode summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Item creations plus comments inside the period
    pub contributions: usize,
    /// Distinct users who created, commented on or merged something
    pub contributors: usize,
    pub prs_opened: usize,
    pub prs_merged: usize,
    pub issues_opened: usize,
    pub issues_closed: usize,
}

/// Repository-mode result. An item lands in at most one of
/// `merged_prs`, `closed_issues` and `updated`.
#[derive(Debug, Default)]
pub struct RepositorySummary<'a> {
    pub merged_prs: Vec<&'a Item>,
    pub closed_issues: Vec<&'a Item>,
    /// Touched in the period but not closed, or closed without merging
    pub updated: Vec<&'a Item>,
    pub contributors: UserSet,
    /// Every user seen on any item, in period or not
    pub users: UserSet,
    pub counters: Counters,
}

/// Classify every item for a repository-mode report
pub fn summarize_repositories<'a>(items: &'a [Item], period: &Period) -> RepositorySummary<'a> {
    let mut summary = RepositorySummary::default();
    let mut counters = Counters::default();

    for item in items {
        let mut touched = false;

        if let Some(creator) = &item.created_by {
            summary.users.insert(creator);
        }

        for comment in &item.comments {
            if period.contains(&comment.created_at) {
                counters.contributions += 1;
                touched = true;
                if let Some(author) = &comment.user {
                    summary.contributors.insert(author);
                }
            }
            if let Some(author) = &comment.user {
                summary.users.insert(author);
            }
        }

        if period.contains(&item.created_at) {
            touched = true;
            counters.contributions += 1;
            if let Some(creator) = &item.created_by {
                summary.contributors.insert(creator);
            }
            if item.is_pr {
                counters.prs_opened += 1;
            } else {
                counters.issues_opened += 1;
            }
        }

        if period.contains_opt(item.closed_at.as_ref()) {
            if item.is_pr && item.merged {
                // The merge itself is not counted as a contribution
                if let Some(merger) = &item.merged_by {
                    summary.users.insert(merger);
                    summary.contributors.insert(merger);
                }
                summary.merged_prs.push(item);
            } else if item.is_pr {
                summary.updated.push(item);
            } else {
                summary.closed_issues.push(item);
            }
        } else if touched {
            summary.updated.push(item);
        }
    }

    counters.contributors = summary.contributors.len();
    counters.prs_merged = summary.merged_prs.len();
    counters.issues_closed = summary.closed_issues.len();
    summary.counters = counters;
    summary
}

/// User-mode result for a single login
#[derive(Debug, Default)]
pub struct UserSummary<'a> {
    /// PRs the user opened in the period
    pub prs: Vec<&'a Item>,
    /// PRs the user merged or reviewed/commented on in the period
    pub reviewed_prs: Vec<&'a Item>,
    /// Issues the user opened in the period
    pub issues: Vec<&'a Item>,
    /// Issues the user commented on in the period
    pub commented_issues: Vec<&'a Item>,
}

/// Classify every item for a report on `login`
pub fn summarize_user<'a>(items: &'a [Item], period: &Period, login: &str) -> UserSummary<'a> {
    let mut summary = UserSummary::default();

    for item in items {
        let opened = period.contains(&item.created_at) && item.is_created_by(login);

        if item.is_pr {
            if opened {
                summary.prs.push(item);
            } else if (period.contains_opt(item.closed_at.as_ref()) && item.is_merged_by(login))
                || item.has_comment_by(login, period)
            {
                summary.reviewed_prs.push(item);
            }
        } else if opened {
            summary.issues.push(item);
        } else if item.has_comment_by(login, period) {
            summary.commented_issues.push(item);
        }
    }

    summary
}
