//! Fork synchronization and registry publishing.
//!
//! The publish workflow synchronizes the fork with its upstream, commits the
//! merged registry document on a fresh uniquely-named branch, and opens a
//! pull request into the fork's default branch.

mod error;
mod report;
mod status;

pub use error::PublishError;
pub use report::{commit_message, owner_counts, owner_of, owner_table, pr_body, pr_title};
pub use status::PublishStatus;

use crate::runner::RunnerConfig;
use octocrab::models::repos::Object;
use octocrab::params::repos::Reference;
use octocrab::Octocrab;
use tracing::{error, info};
use uuid::Uuid;

/// Brings the fork's default branch up to date with upstream.
///
/// Compares head commit SHAs and requests a merge of upstream into the fork
/// when they differ. Sync failure is non-fatal by contract: every error is
/// caught and logged, and the run proceeds with a possibly-stale fork.
pub async fn sync_fork(octocrab: &Octocrab, config: &RunnerConfig) {
    info!("Syncing fork with upstream repository");

    if let Err(e) = try_sync_fork(octocrab, config).await {
        error!(error = %e, "An error occurred while syncing the fork");
    }
}

async fn try_sync_fork(octocrab: &Octocrab, config: &RunnerConfig) -> Result<(), PublishError> {
    let branch = config.default_branch();

    let fork_sha = branch_head(octocrab, config.fork_owner(), config.fork_repo(), branch).await?;
    let upstream_sha = branch_head(
        octocrab,
        config.upstream_owner(),
        config.upstream_repo(),
        branch,
    )
    .await?;

    if fork_sha == upstream_sha {
        info!("Fork is already up-to-date with the upstream repository");
        return Ok(());
    }

    let route = format!(
        "/repos/{}/{}/merge-upstream",
        config.fork_owner(),
        config.fork_repo()
    );
    let _: serde_json::Value = octocrab
        .post(route, Some(&serde_json::json!({ "branch": branch })))
        .await?;

    info!("Successfully merged upstream changes into fork");
    Ok(())
}

/// Commits the updated document on a fresh branch and opens a pull request.
///
/// Failures are caught here, logged, and surfaced as
/// [`PublishStatus::Failed`]; they never crash the process. The next
/// scheduled run retries the whole pipeline from scratch.
pub async fn publish(
    octocrab: &Octocrab,
    config: &RunnerConfig,
    updated_document: &str,
    new_urls: &[String],
) -> PublishStatus {
    match try_publish(octocrab, config, updated_document, new_urls).await {
        Ok(status) => status,
        Err(e) => {
            error!(error = %e, "An error occurred while publishing the registry update");
            PublishStatus::Failed {
                error: e.to_string(),
            }
        }
    }
}

async fn try_publish(
    octocrab: &Octocrab,
    config: &RunnerConfig,
    updated_document: &str,
    new_urls: &[String],
) -> Result<PublishStatus, PublishError> {
    info!("Pushing changes to the forked repository");

    let repos = octocrab.repos(config.fork_owner(), config.fork_repo());
    let default_branch = config.default_branch();

    // The listing is paginated and stale update branches sort ahead of the
    // default branch, so every page has to be checked.
    let first_page = repos.list_branches().per_page(100).send().await?;
    let branches = octocrab.all_pages(first_page).await?;
    if !branch_present(branches.iter().map(|b| b.name.as_str()), default_branch) {
        return Err(PublishError::MissingDefaultBranch {
            branch: default_branch.to_string(),
        });
    }

    // Fresh unique branch name per run so concurrent runs never collide.
    let branch_name = generate_branch_name(config.branch_prefix());
    let head_sha = branch_head(
        octocrab,
        config.fork_owner(),
        config.fork_repo(),
        default_branch,
    )
    .await?;
    repos
        .create_ref(&Reference::Branch(branch_name.clone()), head_sha)
        .await?;
    info!(branch = %branch_name, "Created update branch");

    // The file's current content SHA is the optimistic-concurrency
    // precondition: the platform rejects the write if the file changed
    // since it was read.
    let contents = repos
        .get_content()
        .path(config.registry_path())
        .r#ref(&branch_name)
        .send()
        .await?;
    let file = contents
        .items
        .into_iter()
        .next()
        .ok_or_else(|| PublishError::MissingRegistryFile {
            path: config.registry_path().to_string(),
            branch: branch_name.clone(),
        })?;

    repos
        .update_file(
            config.registry_path(),
            commit_message(config.ecosystem()),
            updated_document,
            &file.sha,
        )
        .branch(&branch_name)
        .send()
        .await?;
    info!(path = config.registry_path(), "Committed registry update");

    let title = pr_title(config.ecosystem());
    let body = pr_body(new_urls);

    let pr = octocrab
        .pulls(config.fork_owner(), config.fork_repo())
        .create(&title, &branch_name, default_branch)
        .body(&body)
        .send()
        .await?;

    let url = pr.html_url.map(|u| u.to_string()).unwrap_or_else(|| {
        format!(
            "https://github.com/{}/{}/pull/{}",
            config.fork_owner(),
            config.fork_repo(),
            pr.number
        )
    });
    info!(pr = %url, "Pull request created in the forked repo");

    Ok(PublishStatus::Created {
        number: pr.number,
        url,
    })
}

/// Reads the head commit SHA of a branch.
async fn branch_head(
    octocrab: &Octocrab,
    owner: &str,
    repo: &str,
    branch: &str,
) -> Result<String, PublishError> {
    let reference = octocrab
        .repos(owner, repo)
        .get_ref(&Reference::Branch(branch.to_string()))
        .await?;

    match reference.object {
        Object::Commit { sha, .. } => Ok(sha),
        _ => Err(PublishError::UnexpectedRefObject {
            branch: branch.to_string(),
        }),
    }
}

/// Checks a fully-paginated branch listing for the given branch name.
fn branch_present<'a>(mut names: impl Iterator<Item = &'a str>, branch: &str) -> bool {
    names.any(|name| name == branch)
}

/// Generates a unique branch name for this run.
fn generate_branch_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_default_branch_behind_stale_update_branches() {
        // Leftover per-run branches sort before "master" and fill more than
        // one 30-entry listing page.
        let mut names: Vec<String> = (0..45).map(|i| format!("compound-{i:04}")).collect();
        names.push("master".to_string());

        assert!(branch_present(names.iter().map(String::as_str), "master"));
        assert!(!branch_present(names.iter().map(String::as_str), "main"));
    }

    #[test]
    fn branch_names_embed_prefix_and_are_unique() {
        let first = generate_branch_name("compound");
        let second = generate_branch_name("compound");

        assert!(first.starts_with("compound-"));
        assert!(second.starts_with("compound-"));
        assert_ne!(first, second);
    }
}
