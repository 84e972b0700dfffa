use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gh-report")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Monthly and weekly activity digests for GitHub repositories",
    long_about = "gh-report fetches pull requests, issues, comments and reviews for a set of \
                  repositories and renders a markdown digest of the activity in a calendar \
                  month, an ISO week, or across the most recently updated items. With --user \
                  the digest is narrowed to a single contributor."
)]
pub struct Cli {
    /// GitHub access token
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Month to report on (YYYY-MM)
    #[arg(short, long, value_name = "YYYY-MM", conflicts_with_all = ["weekly", "items"])]
    pub monthly: Option<String>,

    /// ISO week to report on (YYYY-WW)
    #[arg(short, long, value_name = "YYYY-WW", conflicts_with = "items")]
    pub weekly: Option<String>,

    /// Report on the N most recently updated PRs and issues of each repository
    #[arg(short, long, value_name = "N")]
    pub items: Option<usize>,

    /// Report on a single user's activity
    #[arg(short, long, value_name = "LOGIN")]
    pub user: Option<String>,

    /// Path to config file (default: ~/.config/gh-report/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Repositories to report on
    #[arg(required = true, value_name = "OWNER/REPO")]
    pub repos: Vec<String>,
}

impl Cli {
    /// Validate CLI arguments
    pub fn validate(&self) -> Result<(), String> {
        let selectors = [
            self.monthly.is_some(),
            self.weekly.is_some(),
            self.items.is_some(),
        ];
        if selectors.iter().filter(|s| **s).count() != 1 {
            return Err("Specify exactly one of --monthly, --weekly or --items".to_string());
        }

        if self.items == Some(0) {
            return Err("--items must be greater than 0".to_string());
        }

        if matches!(self.user.as_deref(), Some(u) if u.trim().is_empty()) {
            return Err("--user must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_monthly() {
        let cli = Cli::parse_from(vec![
            "gh-report",
            "--token",
            "ghp_abc",
            "--monthly",
            "2018-01",
            "rust-lang/rust",
            "rust-lang/cargo",
        ]);
        assert_eq!(cli.token.as_deref(), Some("ghp_abc"));
        assert_eq!(cli.monthly.as_deref(), Some("2018-01"));
        assert_eq!(cli.repos, vec!["rust-lang/rust", "rust-lang/cargo"]);
        assert!(cli.user.is_none());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_parse_user_mode() {
        let cli = Cli::parse_from(vec![
            "gh-report", "-w", "2018-8", "-u", "alice", "-vv", "o/r",
        ]);
        assert_eq!(cli.weekly.as_deref(), Some("2018-8"));
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert_eq!(cli.verbose, 2);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_requires_repository() {
        assert!(Cli::try_parse_from(vec!["gh-report", "--monthly", "2018-01"]).is_err());
    }

    #[test]
    fn test_cli_selectors_conflict() {
        let result = Cli::try_parse_from(vec![
            "gh-report",
            "--monthly",
            "2018-01",
            "--weekly",
            "2018-1",
            "o/r",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(vec!["gh-report", "-w", "2018-1", "-i", "5", "o/r"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_validation_missing_selector() {
        let cli = Cli::parse_from(vec!["gh-report", "o/r"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_cli_validation_zero_items() {
        let cli = Cli::parse_from(vec!["gh-report", "--items", "0", "o/r"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(vec!["gh-report", "--items", "50", "o/r"]);
        assert!(cli.validate().is_ok());
    }
}
