mod activity;
mod cli;
mod config;
mod error;
mod github;
mod logging;
mod orchestrator;
mod period;

use activity::aggregate::{summarize_repositories, summarize_user};
use activity::report::{render_repository_report, render_user_report};
use clap::Parser;
use cli::Cli;
use config::Config;
use error::{ReportError, Result};
use github::client::GitHubClient;
use orchestrator::{parse_repos, Orchestrator};
use period::Window;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Validate CLI arguments
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    logging::init(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    // Load config
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load_or_default()?
    };

    // Apply CLI overrides to config
    let config = apply_cli_overrides(config, cli);
    config.validate()?;
    let token = config.token()?;

    let window = Window::from_selectors(
        cli.monthly.as_deref(),
        cli.weekly.as_deref(),
        cli.items,
    )?;
    info!("Reporting on {}", window.describe());

    let repos = parse_repos(&cli.repos);
    if repos.is_empty() {
        return Err(ReportError::config("No valid owner/repo arguments given"));
    }

    // Phase 1: gather PRs, issues and users
    let client = GitHubClient::new(&config, token)?;
    let mut orchestrator = Orchestrator::new(client);
    let items = orchestrator.collect(&repos, &window).await;

    let pr_count = items.iter().filter(|i| i.is_pr).count();
    info!(
        prs = pr_count,
        issues = items.len() - pr_count,
        users = orchestrator.users().len(),
        "Fetched activity"
    );
    if items.is_empty() {
        warn!("No PRs or issues found for {}", window.describe());
    }

    // Phase 2: classify and render
    let period = window.period();
    let report = match &cli.user {
        Some(login) => {
            let summary = summarize_user(items.as_slice(), &period, login);
            render_user_report(&window, login, &summary, orchestrator.users())
        }
        None => {
            let summary = summarize_repositories(items.as_slice(), &period);
            render_repository_report(&window, &summary)
        }
    };

    write_report(&report, cli.output.as_deref())
}

fn apply_cli_overrides(mut config: Config, cli: &Cli) -> Config {
    // Override token if provided (flag or GITHUB_TOKEN)
    if let Some(ref token) = cli.token {
        config.token = Some(token.clone());
    }

    config
}

/// Write the report to a file, or to stdout
fn write_report(report: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, report)?;
            info!(path = %path.display(), "Report written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(report.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
