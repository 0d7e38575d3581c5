//! Publish error types.

use thiserror::Error;

/// Errors that can occur while syncing the fork or publishing the update.
#[derive(Debug, Error)]
pub enum PublishError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// The fork has no default branch to base the update on.
    #[error("Branch '{branch}' does not exist in the forked repository")]
    MissingDefaultBranch { branch: String },

    /// The registry file is absent on the update branch.
    #[error("Registry file '{path}' not found on branch '{branch}'")]
    MissingRegistryFile { path: String, branch: String },

    /// A branch ref pointed at something other than a commit.
    #[error("Unexpected ref object for branch '{branch}'")]
    UnexpectedRefObject { branch: String },
}
