use crate::activity::users::{UserRef, Users};
use crate::github::{RawComment, RawIssue, RawPullRequest, RawReview, RepoId};
use crate::period::Period;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A comment, review comment or review on an item
#[derive(Debug, Clone)]
pub struct Comment {
    /// Creation time, or submission time for reviews
    pub created_at: DateTime<Utc>,
    pub user: Option<UserRef>,
}

impl Comment {
    /// Create a comment from an issue comment or inline review comment
    pub fn from_comment(raw: &RawComment, users: &mut Users) -> Self {
        Self {
            created_at: raw.created_at,
            user: raw.user.as_ref().map(|u| users.resolve(u)),
        }
    }

    /// Create a comment from a review. Pending reviews have no
    /// submission time and yield nothing.
    pub fn from_review(raw: &RawReview, users: &mut Users) -> Option<Self> {
        let created_at = raw.submitted_at?;
        Some(Self {
            created_at,
            user: raw.user.as_ref().map(|u| users.resolve(u)),
        })
    }

    fn is_by(&self, login: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.id == login)
    }
}

/// An issue or pull request with its discussion
#[derive(Debug, Clone)]
pub struct Item {
    pub is_pr: bool,
    /// `owner/repo#number`
    pub id: String,
    /// `owner/repo`
    pub repo: String,
    pub number: u64,
    pub state: String,
    pub title: String,
    pub url: String,
    pub created_by: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub comments: Vec<Comment>,
    // PR specific fields
    pub merged: bool,
    pub merged_at: Option<DateTime<Utc>>,
    pub merged_by: Option<UserRef>,
}

impl Item {
    /// Create an item from a pull request, without its discussion
    pub fn from_pull_request(raw: &RawPullRequest, repo: &RepoId, users: &mut Users) -> Self {
        let repo = repo.to_string();
        Self {
            is_pr: true,
            id: format!("{}#{}", repo, raw.number),
            repo,
            number: raw.number,
            state: raw.state.clone(),
            title: raw.title.clone(),
            url: raw.html_url.clone(),
            created_by: raw.user.as_ref().map(|u| users.resolve(u)),
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            closed_at: raw.closed_at,
            comments: Vec::new(),
            // The merged flag is frequently missing, a merge time is not
            merged: raw.merged.unwrap_or(false) || raw.merged_at.is_some(),
            merged_at: raw.merged_at,
            merged_by: raw.merged_by.as_ref().map(|u| users.resolve(u)),
        }
    }

    /// Create an item from an issue, without its comments
    pub fn from_issue(raw: &RawIssue, repo: &RepoId, users: &mut Users) -> Self {
        let repo = repo.to_string();
        Self {
            is_pr: false,
            id: format!("{}#{}", repo, raw.number),
            repo,
            number: raw.number,
            state: raw.state.clone(),
            title: raw.title.clone(),
            url: raw.html_url.clone(),
            created_by: raw.user.as_ref().map(|u| users.resolve(u)),
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            closed_at: raw.closed_at,
            comments: Vec::new(),
            merged: false,
            merged_at: None,
            merged_by: None,
        }
    }

    pub fn add_comments(&mut self, raw: &[RawComment], users: &mut Users) {
        self.comments
            .extend(raw.iter().map(|c| Comment::from_comment(c, users)));
    }

    pub fn add_reviews(&mut self, raw: &[RawReview], users: &mut Users) {
        self.comments
            .extend(raw.iter().filter_map(|r| Comment::from_review(r, users)));
    }

    pub fn is_created_by(&self, login: &str) -> bool {
        self.created_by.as_ref().is_some_and(|u| u.id == login)
    }

    pub fn is_merged_by(&self, login: &str) -> bool {
        self.merged_by.as_ref().is_some_and(|u| u.id == login)
    }

    /// True if `login` commented inside the period
    pub fn has_comment_by(&self, login: &str, period: &Period) -> bool {
        self.comments
            .iter()
            .any(|c| c.is_by(login) && period.contains(&c.created_at))
    }

    /// Everyone named on this item: creator, merger and commenters
    pub fn participants(&self) -> impl Iterator<Item = &UserRef> {
        self.created_by
            .iter()
            .chain(self.merged_by.iter())
            .chain(self.comments.iter().filter_map(|c| c.user.as_ref()))
    }

    /// `<title> ([<id>] [@creator] [@merger] [@others...])`
    ///
    /// Commenters and reviewers already shown as creator or merger are
    /// left out; the rest appear once each, in login order.
    pub fn to_display_line(&self) -> String {
        let mut line = format!("{} ([{}]", self.title, self.id);

        for user in self.created_by.iter().chain(self.merged_by.iter()) {
            line.push(' ');
            line.push_str(&user.mention());
        }

        let others: BTreeMap<&str, &UserRef> = self
            .comments
            .iter()
            .filter_map(|c| c.user.as_ref())
            .filter(|u| !is_same(u, self.created_by.as_ref()) && !is_same(u, self.merged_by.as_ref()))
            .map(|u| (u.id.as_str(), u))
            .collect();
        for user in others.values() {
            line.push(' ');
            line.push_str(&user.mention());
        }

        line.push(')');
        line
    }

    /// Markdown link definition for this item
    pub fn link(&self) -> String {
        format!("[{}]: {}", self.id, self.url)
    }
}

fn is_same(user: &UserRef, other: Option<&UserRef>) -> bool {
    other.is_some_and(|o| Arc::ptr_eq(user, o))
}

/// Canonical render order: repository, then number
pub fn canonical_order(a: &Item, b: &Item) -> Ordering {
    a.repo.cmp(&b.repo).then(a.number.cmp(&b.number))
}

/// All items fetched in one run
#[derive(Debug, Default)]
pub struct Items(Vec<Item>);

impl Items {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: Item) {
        self.0.push(item);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.0.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::github::RawUser;
    use chrono::TimeZone;

    pub(crate) fn raw_user(login: &str) -> RawUser {
        RawUser {
            login: login.to_string(),
            html_url: format!("https://github.com/{}", login),
        }
    }

    pub(crate) fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    pub(crate) fn raw_pr(number: u64, creator: &str, created_at: DateTime<Utc>) -> RawPullRequest {
        RawPullRequest {
            number,
            state: "open".to_string(),
            title: format!("PR {}", number),
            html_url: format!("https://github.com/o/r/pull/{}", number),
            user: Some(raw_user(creator)),
            created_at,
            updated_at: Some(created_at),
            closed_at: None,
            merged: None,
            merged_at: None,
            merged_by: None,
        }
    }

    pub(crate) fn raw_issue(number: u64, creator: &str, created_at: DateTime<Utc>) -> RawIssue {
        RawIssue {
            number,
            state: "open".to_string(),
            title: format!("Issue {}", number),
            html_url: format!("https://github.com/o/r/issues/{}", number),
            user: Some(raw_user(creator)),
            created_at,
            updated_at: Some(created_at),
            closed_at: None,
            pull_request: None,
        }
    }

    pub(crate) fn raw_comment(login: &str, created_at: DateTime<Utc>) -> RawComment {
        RawComment {
            user: Some(raw_user(login)),
            created_at,
        }
    }

    fn repo() -> RepoId {
        RepoId::parse("o/r").unwrap()
    }

    #[test]
    fn test_from_pull_request() {
        let mut users = Users::new();
        let item = Item::from_pull_request(&raw_pr(7, "alice", at(2018, 1, 5)), &repo(), &mut users);
        assert!(item.is_pr);
        assert_eq!(item.id, "o/r#7");
        assert_eq!(item.repo, "o/r");
        assert!(item.is_created_by("alice"));
        assert!(!item.merged);
        assert!(item.comments.is_empty());
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn test_merged_at_implies_merged() {
        let mut users = Users::new();
        let mut raw = raw_pr(7, "alice", at(2018, 1, 5));
        raw.merged_at = Some(at(2018, 1, 20));
        let item = Item::from_pull_request(&raw, &repo(), &mut users);
        assert!(item.merged);
        assert!(item.merged_by.is_none());

        raw.merged_at = None;
        raw.merged = Some(true);
        raw.merged_by = Some(raw_user("bob"));
        let item = Item::from_pull_request(&raw, &repo(), &mut users);
        assert!(item.merged);
        assert!(item.is_merged_by("bob"));
    }

    #[test]
    fn test_from_issue() {
        let mut users = Users::new();
        let item = Item::from_issue(&raw_issue(3, "carol", at(2018, 1, 5)), &repo(), &mut users);
        assert!(!item.is_pr);
        assert!(!item.merged);
        assert!(item.merged_by.is_none());
        assert_eq!(item.link(), "[o/r#3]: https://github.com/o/r/issues/3");
    }

    #[test]
    fn test_comments_share_registry() {
        let mut users = Users::new();
        let mut item = Item::from_pull_request(&raw_pr(1, "alice", at(2018, 1, 5)), &repo(), &mut users);
        item.add_comments(&[raw_comment("alice", at(2018, 1, 6))], &mut users);
        item.add_reviews(
            &[
                RawReview {
                    user: Some(raw_user("bob")),
                    submitted_at: Some(at(2018, 1, 7)),
                },
                RawReview {
                    user: Some(raw_user("dave")),
                    submitted_at: None,
                },
            ],
            &mut users,
        );

        assert_eq!(item.comments.len(), 2);
        let creator = item.created_by.as_ref().unwrap();
        let commenter = item.comments[0].user.as_ref().unwrap();
        assert!(Arc::ptr_eq(creator, commenter));
        // Pending review is dropped before its author is registered
        assert_eq!(users.len(), 2);
        assert!(users.get("dave").is_none());
    }

    #[test]
    fn test_has_comment_by() {
        let mut users = Users::new();
        let mut item = Item::from_issue(&raw_issue(1, "alice", at(2017, 12, 5)), &repo(), &mut users);
        item.add_comments(
            &[
                raw_comment("bob", at(2017, 12, 6)),
                raw_comment("carol", at(2018, 1, 6)),
            ],
            &mut users,
        );
        let january = Period::from_month("2018-01").unwrap();
        assert!(item.has_comment_by("carol", &january));
        assert!(!item.has_comment_by("bob", &january));
        assert!(!item.has_comment_by("alice", &january));
    }

    #[test]
    fn test_display_line() {
        let mut users = Users::new();
        let mut raw = raw_pr(7, "alice", at(2018, 1, 5));
        raw.title = "Add feature".to_string();
        raw.merged_by = Some(raw_user("bob"));
        let mut item = Item::from_pull_request(&raw, &repo(), &mut users);
        item.add_comments(
            &[
                raw_comment("dave", at(2018, 1, 6)),
                raw_comment("alice", at(2018, 1, 6)),
                raw_comment("carol", at(2018, 1, 7)),
                raw_comment("bob", at(2018, 1, 8)),
                raw_comment("dave", at(2018, 1, 9)),
            ],
            &mut users,
        );
        assert_eq!(
            item.to_display_line(),
            "Add feature ([o/r#7] [@alice] [@bob] [@carol] [@dave])"
        );
    }

    #[test]
    fn test_display_line_without_users() {
        let mut users = Users::new();
        let mut raw = raw_issue(2, "alice", at(2018, 1, 5));
        raw.user = None;
        let mut item = Item::from_issue(&raw, &repo(), &mut users);
        item.comments.push(Comment {
            created_at: at(2018, 1, 6),
            user: None,
        });
        assert_eq!(item.to_display_line(), "Issue 2 ([o/r#2])");
    }

    #[test]
    fn test_participants() {
        let mut users = Users::new();
        let mut raw = raw_pr(7, "alice", at(2018, 1, 5));
        raw.merged_by = Some(raw_user("bob"));
        let mut item = Item::from_pull_request(&raw, &repo(), &mut users);
        item.add_comments(&[raw_comment("carol", at(2018, 1, 6))], &mut users);
        let logins: Vec<&str> = item.participants().map(|u| u.id.as_str()).collect();
        assert_eq!(logins, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_canonical_order() {
        let mut users = Users::new();
        let a = Item::from_issue(&raw_issue(10, "x", at(2018, 1, 1)), &RepoId::parse("a/z").unwrap(), &mut users);
        let b = Item::from_issue(&raw_issue(2, "x", at(2018, 1, 1)), &RepoId::parse("b/a").unwrap(), &mut users);
        let c = Item::from_issue(&raw_issue(9, "x", at(2018, 1, 1)), &RepoId::parse("a/z").unwrap(), &mut users);

        let mut sorted = vec![&b, &a, &c];
        sorted.sort_by(|x, y| canonical_order(x, y));
        let ids: Vec<&str> = sorted.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a/z#9", "a/z#10", "b/a#2"]);
    }

    #[test]
    fn test_items_collection() {
        let mut users = Users::new();
        let mut items = Items::new();
        assert!(items.is_empty());
        items.push(Item::from_issue(&raw_issue(1, "x", at(2018, 1, 1)), &repo(), &mut users));
        assert_eq!(items.len(), 1);
        assert_eq!(items.as_slice()[0].number, 1);
        assert_eq!(items.iter().count(), 1);
    }
}
