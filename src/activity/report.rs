use crate::activity::aggregate::{RepositorySummary, UserSummary};
use crate::activity::item::{canonical_order, Item};
use crate::activity::users::Users;
use crate::period::Window;

/// Render a repository-mode report
pub fn render_repository_report(window: &Window, summary: &RepositorySummary) -> String {
    let description = window.describe();
    let counters = &summary.counters;
    let mut output = String::new();

    output.push_str(&format!("# Report for {}\n\n", description));
    output.push_str(&format!(
        "In {}, {} contributors made {} contributions. \
         {} PRs were opened and {} PRs were merged. \
         {} issues were opened and {} issues were closed.\n\n",
        description,
        counters.contributors,
        counters.contributions,
        counters.prs_opened,
        counters.prs_merged,
        counters.issues_opened,
        counters.issues_closed,
    ));

    let listed = push_sections(
        &mut output,
        &[
            ("Merged PRs:", &summary.merged_prs),
            ("Closed Issues:", &summary.closed_issues),
            ("New or updated PRs and Issues (not closed):", &summary.updated),
        ],
    );

    // Everyone named on a listed line needs a link definition too
    let mut users = summary.users.clone();
    for item in &listed {
        for user in item.participants() {
            users.insert(user);
        }
    }
    let user_links: Vec<String> = users.iter().map(|u| u.link()).collect();

    push_links(&mut output, &listed, &user_links);
    output
}

/// Render a user-mode report for `login`
pub fn render_user_report(
    window: &Window,
    login: &str,
    summary: &UserSummary,
    users: &Users,
) -> String {
    let description = window.describe();
    let mut output = String::new();

    // Linked if the user showed up anywhere in the fetched data
    let who = match users.get(login) {
        Some(user) => user.mention(),
        None => format!("@{}", login),
    };

    output.push_str(&format!("# Report for {}\n\n", description));
    output.push_str(&format!(
        "In {}, {} opened {} PRs, reviewed {} PRs, opened {} issues and commented on {} issues.\n\n",
        description,
        who,
        summary.prs.len(),
        summary.reviewed_prs.len(),
        summary.issues.len(),
        summary.commented_issues.len(),
    ));

    let listed = push_sections(
        &mut output,
        &[
            ("PRs:", &summary.prs),
            ("Reviewed PRs:", &summary.reviewed_prs),
            ("Issues:", &summary.issues),
            ("Issues commented on:", &summary.commented_issues),
        ],
    );

    push_links(&mut output, &listed, &users.render_links());
    output
}

/// Write each non-empty bucket as a bullet list. Returns every listed
/// item in canonical order.
fn push_sections<'a>(output: &mut String, sections: &[(&str, &Vec<&'a Item>)]) -> Vec<&'a Item> {
    let mut listed = Vec::new();

    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }

        let mut sorted = items.to_vec();
        sorted.sort_by(|a, b| canonical_order(a, b));

        output.push_str(&format!("## {}\n", title));
        for item in &sorted {
            output.push_str(&format!("- {}\n", item.to_display_line()));
        }
        output.push('\n');

        listed.extend(sorted);
    }

    listed.sort_by(|a, b| canonical_order(a, b));
    listed
}

fn push_links(output: &mut String, items: &[&Item], user_links: &[String]) {
    for item in items {
        output.push_str(&item.link());
        output.push('\n');
    }
    for link in user_links {
        output.push_str(link);
        output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::aggregate::{summarize_repositories, summarize_user};
    use crate::activity::item::tests::{at, raw_comment, raw_issue, raw_pr, raw_user};
    use crate::github::RepoId;
    use crate::period::Period;

    fn january() -> Window {
        Window::Month(Period::from_month("2018-01").unwrap())
    }

    fn scenario(users: &mut Users) -> Vec<Item> {
        let repo = RepoId::parse("o/r").unwrap();

        let mut raw = raw_pr(1, "carol", at(2018, 1, 5));
        raw.closed_at = Some(at(2018, 1, 20));
        raw.merged_at = Some(at(2018, 1, 20));
        raw.merged_by = Some(raw_user("bob"));
        let mut pr = Item::from_pull_request(&raw, &repo, users);
        pr.add_comments(&[raw_comment("alice", at(2018, 1, 10))], users);

        let mut raw = raw_issue(3, "dave", at(2017, 12, 1));
        raw.closed_at = Some(at(2018, 1, 2));
        let closed = Item::from_issue(&raw, &repo, users);

        let mut stale = Item::from_issue(&raw_issue(2, "dave", at(2017, 11, 1)), &repo, users);
        stale.add_comments(&[raw_comment("erin", at(2017, 11, 2))], users);

        let updated = Item::from_issue(&raw_issue(4, "alice", at(2018, 1, 8)), &repo, users);

        vec![updated, stale, closed, pr]
    }

    #[test]
    fn test_render_repository_report() {
        let mut users = Users::new();
        let items = scenario(&mut users);
        let summary = summarize_repositories(&items, &january().period());

        let expected = "\
# Report for January 2018

In January 2018, 3 contributors made 3 contributions. 1 PRs were opened and 1 PRs were merged. 1 issues were opened and 1 issues were closed.

## Merged PRs:
- PR 1 ([o/r#1] [@carol] [@bob] [@alice])

## Closed Issues:
- Issue 3 ([o/r#3] [@dave])

## New or updated PRs and Issues (not closed):
- Issue 4 ([o/r#4] [@alice])

[o/r#1]: https://github.com/o/r/pull/1
[o/r#3]: https://github.com/o/r/issues/3
[o/r#4]: https://github.com/o/r/issues/4
[@alice]: https://github.com/alice
[@bob]: https://github.com/bob
[@carol]: https://github.com/carol
[@dave]: https://github.com/dave
[@erin]: https://github.com/erin
";
        assert_eq!(render_repository_report(&january(), &summary), expected);
    }

    #[test]
    fn test_render_repository_report_skips_empty_sections() {
        let summary = summarize_repositories(&[], &january().period());
        let output = render_repository_report(&january(), &summary);
        assert!(output.starts_with("# Report for January 2018\n\n"));
        assert!(output.contains("0 contributors made 0 contributions"));
        assert!(!output.contains("## "));
    }

    #[test]
    fn test_render_sorts_items() {
        let mut users = Users::new();
        let items = vec![
            Item::from_issue(&raw_issue(10, "x", at(2018, 1, 3)), &RepoId::parse("o/r").unwrap(), &mut users),
            Item::from_issue(&raw_issue(9, "x", at(2018, 1, 3)), &RepoId::parse("o/r").unwrap(), &mut users),
            Item::from_issue(&raw_issue(1, "x", at(2018, 1, 3)), &RepoId::parse("a/b").unwrap(), &mut users),
        ];
        let summary = summarize_repositories(&items, &january().period());
        let output = render_repository_report(&january(), &summary);

        let first = output.find("[a/b#1]").unwrap();
        let second = output.find("[o/r#9]").unwrap();
        let third = output.find("[o/r#10]").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_render_user_report() {
        let mut users = Users::new();
        let items = scenario(&mut users);
        let summary = summarize_user(&items, &january().period(), "alice");

        let expected = "\
# Report for January 2018

In January 2018, [@alice] opened 0 PRs, reviewed 1 PRs, opened 1 issues and commented on 0 issues.

## Reviewed PRs:
- PR 1 ([o/r#1] [@carol] [@bob] [@alice])

## Issues:
- Issue 4 ([o/r#4] [@alice])

[o/r#1]: https://github.com/o/r/pull/1
[o/r#4]: https://github.com/o/r/issues/4
[@alice]: https://github.com/alice
[@bob]: https://github.com/bob
[@carol]: https://github.com/carol
[@dave]: https://github.com/dave
[@erin]: https://github.com/erin
";
        assert_eq!(
            render_user_report(&january(), "alice", &summary, &users),
            expected
        );
    }

    #[test]
    fn test_render_user_report_unknown_user() {
        let users = Users::new();
        let summary = summarize_user(&[], &january().period(), "nobody");
        let output = render_user_report(&january(), "nobody", &summary, &users);
        assert!(output.contains("In January 2018, @nobody opened 0 PRs"));
        assert!(!output.contains("[@"));
    }
}
