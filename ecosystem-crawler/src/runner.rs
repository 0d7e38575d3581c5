//! Orchestrates the discovery and incremental-publish pipeline.

use crate::discovery::{discover_repositories, new_repositories};
use crate::fetch::SearchClient;
use crate::publish::{publish, sync_fork, PublishStatus};
use crate::queries::{build_matrix, default_axes, QueryAxis};
use crate::registry::{fetch_registry, known_urls, merge, RegistryError};
use crate::summary::RunSummary;
use octocrab::Octocrab;
use tracing::info;

const USER_AGENT: &str = concat!("ecosystem-crawler/", env!("CARGO_PKG_VERSION"));

/// Configuration for one crawler run.
///
/// Constructed once at startup and passed to each component; there is no
/// process-wide mutable state.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// GitHub token used for search and publish API calls.
    token: String,
    /// Account that owns the fork.
    fork_owner: String,
    /// Fork repository name.
    fork_repo: String,
    /// Upstream repository owner.
    upstream_owner: String,
    /// Upstream repository name.
    upstream_repo: String,
    /// Raw URL of the registry document.
    registry_url: String,
    /// Path of the registry file within the repository.
    registry_path: String,
    /// Default branch name on fork and upstream.
    default_branch: String,
    /// Prefix for the per-run update branch name.
    branch_prefix: String,
    /// Display name of the ecosystem, used in the PR title and commit.
    ecosystem: String,
    /// Whether to preview changes without publishing.
    dry_run: bool,
    /// Search axes crossed with the size-range partitions.
    axes: Vec<QueryAxis>,
}

impl RunnerConfig {
    /// Creates a configuration with the built-in Compound ecosystem defaults.
    pub fn new(token: String, fork_owner: String, dry_run: bool) -> Self {
        Self {
            token,
            fork_owner,
            fork_repo: "crypto-ecosystems".to_string(),
            upstream_owner: "electric-capital".to_string(),
            upstream_repo: "crypto-ecosystems".to_string(),
            registry_url: "https://raw.githubusercontent.com/electric-capital/crypto-ecosystems/master/data/ecosystems/c/compound.toml".to_string(),
            registry_path: "data/ecosystems/c/compound.toml".to_string(),
            default_branch: "master".to_string(),
            branch_prefix: "compound".to_string(),
            ecosystem: "Compound".to_string(),
            dry_run,
            axes: default_axes(),
        }
    }

    /// Sets the fork repository name.
    pub fn with_fork_repo(mut self, fork_repo: String) -> Self {
        self.fork_repo = fork_repo;
        self
    }

    /// Sets the upstream repository as owner and name.
    pub fn with_upstream(mut self, owner: String, repo: String) -> Self {
        self.upstream_owner = owner;
        self.upstream_repo = repo;
        self
    }

    /// Sets the raw URL the registry document is fetched from.
    pub fn with_registry_url(mut self, registry_url: String) -> Self {
        self.registry_url = registry_url;
        self
    }

    /// Sets the registry file path within the repository.
    pub fn with_registry_path(mut self, registry_path: String) -> Self {
        self.registry_path = registry_path;
        self
    }

    /// Sets the default branch name.
    pub fn with_default_branch(mut self, default_branch: String) -> Self {
        self.default_branch = default_branch;
        self
    }

    /// Sets the update branch prefix.
    pub fn with_branch_prefix(mut self, branch_prefix: String) -> Self {
        self.branch_prefix = branch_prefix;
        self
    }

    /// Sets the ecosystem display name.
    pub fn with_ecosystem(mut self, ecosystem: String) -> Self {
        self.ecosystem = ecosystem;
        self
    }

    /// Replaces the built-in search axes.
    pub fn with_axes(mut self, axes: Vec<QueryAxis>) -> Self {
        self.axes = axes;
        self
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the fork owner.
    pub fn fork_owner(&self) -> &str {
        &self.fork_owner
    }

    /// Returns the fork repository name.
    pub fn fork_repo(&self) -> &str {
        &self.fork_repo
    }

    /// Returns the upstream repository owner.
    pub fn upstream_owner(&self) -> &str {
        &self.upstream_owner
    }

    /// Returns the upstream repository name.
    pub fn upstream_repo(&self) -> &str {
        &self.upstream_repo
    }

    /// Returns the raw registry document URL.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Returns the registry file path.
    pub fn registry_path(&self) -> &str {
        &self.registry_path
    }

    /// Returns the default branch name.
    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    /// Returns the update branch prefix.
    pub fn branch_prefix(&self) -> &str {
        &self.branch_prefix
    }

    /// Returns the ecosystem display name.
    pub fn ecosystem(&self) -> &str {
        &self.ecosystem
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the configured search axes.
    pub fn axes(&self) -> &[QueryAxis] {
        &self.axes
    }
}

/// Errors that can occur while running the crawler.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// HTTP client initialization errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Registry fetch or parse errors.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Orchestrates a full discovery and publish run.
pub struct Runner {
    config: RunnerConfig,
    octocrab: Octocrab,
    http: reqwest::Client,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let octocrab = Octocrab::builder()
            .personal_token(config.token.clone())
            .build()?;
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            config,
            octocrab,
            http,
        })
    }

    /// Executes the full pipeline.
    ///
    /// Sync fork, fetch registry, discover, diff against the known set,
    /// merge, publish. An unfetchable or unparseable registry document
    /// aborts the run; everything downstream of discovery degrades
    /// gracefully instead.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let mut summary = RunSummary::new(self.config.dry_run);

        if !self.config.dry_run {
            sync_fork(&self.octocrab, &self.config).await;
        }

        let existing = fetch_registry(&self.http, &self.config.registry_url).await?;
        let known = known_urls(&existing)?;
        info!(known = known.len(), "Loaded known registry entries");

        let matrix = build_matrix(&self.config.axes);
        summary.queries_executed = matrix.len();

        let client = SearchClient::new(self.http.clone(), self.config.token.clone());
        let discovered = discover_repositories(&client, &matrix).await;
        summary.urls_discovered = discovered.len();

        let fresh = new_repositories(&discovered, &known);
        summary.new_urls = fresh.len();

        if fresh.is_empty() {
            info!("No new repositories found, no changes made");
            return Ok(summary);
        }

        // Lexicographic order keeps the appended blocks, and therefore the
        // PR diff, deterministic across runs.
        let mut new_sorted: Vec<String> = fresh.into_iter().collect();
        new_sorted.sort();

        let updated = merge::append_entries(&existing, &new_sorted)?;

        if self.config.dry_run {
            print_dry_run_preview(&new_sorted);
            summary.record_publish(PublishStatus::Skipped {
                reason: "dry run".to_string(),
            });
            return Ok(summary);
        }

        let status = publish(&self.octocrab, &self.config, &updated, &new_sorted).await;
        summary.record_publish(status);

        Ok(summary)
    }
}

fn print_dry_run_preview(new_urls: &[String]) {
    println!("\n[DRY RUN] Would append {} new repositories:", new_urls.len());
    for (i, url) in new_urls.iter().enumerate() {
        println!("  [{}/{}] {}", i + 1, new_urls.len(), url);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_target_the_compound_registry() {
        let config = RunnerConfig::new("token".to_string(), "user".to_string(), false);

        assert_eq!(config.fork_owner(), "user");
        assert_eq!(config.fork_repo(), "crypto-ecosystems");
        assert_eq!(config.upstream_owner(), "electric-capital");
        assert_eq!(config.registry_path(), "data/ecosystems/c/compound.toml");
        assert_eq!(config.default_branch(), "master");
        assert!(!config.axes().is_empty());
    }

    #[test]
    fn config_builders_override_defaults() {
        let config = RunnerConfig::new("token".to_string(), "user".to_string(), true)
            .with_upstream("acme".to_string(), "registry".to_string())
            .with_fork_repo("registry".to_string())
            .with_registry_path("data/acme.toml".to_string())
            .with_default_branch("main".to_string())
            .with_branch_prefix("acme".to_string())
            .with_ecosystem("Acme".to_string());

        assert_eq!(config.upstream_owner(), "acme");
        assert_eq!(config.upstream_repo(), "registry");
        assert_eq!(config.fork_repo(), "registry");
        assert_eq!(config.registry_path(), "data/acme.toml");
        assert_eq!(config.default_branch(), "main");
        assert_eq!(config.branch_prefix(), "acme");
        assert_eq!(config.ecosystem(), "Acme");
        assert!(config.dry_run());
    }
}
