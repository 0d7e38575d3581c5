//! CLI for the Ecosystem Crawler.
//!
//! This tool discovers repositories referencing an ecosystem's packages via
//! GitHub code search and opens a registry update pull request on a fork.

use clap::Parser;
use ecosystem_crawler::{PublishStatus, RunSummary, Runner, RunnerConfig, RunnerError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Ecosystem Crawler - Discover ecosystem repositories and publish registry updates.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN")]
    token: String,

    /// GitHub account that owns the registry fork.
    #[arg(long, env = "GITHUB_USERNAME")]
    username: String,

    /// Upstream registry repository as owner/name.
    #[arg(
        long,
        default_value = "electric-capital/crypto-ecosystems",
        value_parser = parse_repo_slug
    )]
    upstream: (String, String),

    /// Name of the fork repository under the account.
    #[arg(long, default_value = "crypto-ecosystems")]
    fork_name: String,

    /// Raw URL of the registry document.
    #[arg(
        long,
        default_value = "https://raw.githubusercontent.com/electric-capital/crypto-ecosystems/master/data/ecosystems/c/compound.toml"
    )]
    registry_url: String,

    /// Path of the registry file within the repository.
    #[arg(long, default_value = "data/ecosystems/c/compound.toml")]
    registry_path: String,

    /// Default branch name on fork and upstream.
    #[arg(long, default_value = "master")]
    default_branch: String,

    /// Prefix for the per-run update branch.
    #[arg(long, default_value = "compound")]
    branch_prefix: String,

    /// Ecosystem display name used in the PR title.
    #[arg(long, default_value = "Compound")]
    ecosystem: String,

    /// Log file path.
    #[arg(long, default_value = "ecosystem-crawler.log")]
    log_file: PathBuf,

    /// Preview new findings without syncing or publishing.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(&args.log_file);

    // Run the main logic
    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if summary.all_success() {
                ExitCode::from(0)
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with console and file output.
///
/// Sets up the global tracing subscriber with:
/// - Compact console formatting (single-line output)
/// - A plain-text file layer appending to the given log file
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing(log_file: &Path) {
    let file_layer = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
    {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Arc::new(file)),
        ),
        Err(_) => None,
    };
    let file_missing = file_layer.is_none();

    tracing_subscriber::registry()
        // Use compact formatting without module target paths for cleaner output
        .with(fmt::layer().compact().with_target(false))
        .with(file_layer)
        // Allow runtime log filtering via RUST_LOG env var (e.g., RUST_LOG=debug)
        // Falls back to "info" level if RUST_LOG is not set or invalid
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        // Register as the global default subscriber
        .init();

    if file_missing {
        warn!(path = %log_file.display(), "Could not open log file, logging to console only");
    }
}

/// Parses an `owner/name` repository slug.
///
/// Rejects anything that is not exactly two non-empty segments so a typo
/// never silently targets the wrong repository.
fn parse_repo_slug(value: &str) -> Result<(String, String), String> {
    match value.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(format!("expected a repository as owner/name, got '{value}'")),
    }
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let (upstream_owner, upstream_repo) = args.upstream;

    let config = RunnerConfig::new(args.token, args.username, args.dry_run)
        .with_upstream(upstream_owner, upstream_repo)
        .with_fork_repo(args.fork_name)
        .with_registry_url(args.registry_url)
        .with_registry_path(args.registry_path)
        .with_default_branch(args.default_branch)
        .with_branch_prefix(args.branch_prefix)
        .with_ecosystem(args.ecosystem);

    let runner = Runner::new(config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Queries executed: {}", summary.queries_executed);
    println!("  Repositories discovered: {}", summary.urls_discovered);
    println!("  New repositories: {}", summary.new_urls);

    match &summary.publish {
        Some(PublishStatus::Created { url, .. }) => println!("  Pull request: {url}"),
        Some(PublishStatus::Skipped { reason }) => println!("  Publish skipped: {reason}"),
        Some(PublishStatus::Failed { error }) => println!("  Publish failed: {error}"),
        None => println!("  Publish: not attempted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_name_slug() {
        let slug = parse_repo_slug("electric-capital/crypto-ecosystems").unwrap();
        assert_eq!(
            slug,
            (
                "electric-capital".to_string(),
                "crypto-ecosystems".to_string()
            )
        );
    }

    #[test]
    fn rejects_slug_without_separator() {
        assert!(parse_repo_slug("crypto-ecosystems").is_err());
    }

    #[test]
    fn rejects_slug_with_missing_or_extra_segments() {
        assert!(parse_repo_slug("/crypto-ecosystems").is_err());
        assert!(parse_repo_slug("electric-capital/").is_err());
        assert!(parse_repo_slug("a/b/c").is_err());
        assert!(parse_repo_slug("").is_err());
    }
}
