//! Publish status types.

use serde::Serialize;

/// Outcome of the publish step, surfaced to the caller so it can alert on
/// failures instead of relying on log inspection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishStatus {
    /// Pull request successfully opened.
    Created {
        /// GitHub PR number.
        number: u64,
        /// GitHub PR URL.
        url: String,
    },

    /// Publish skipped (e.g., dry run).
    Skipped {
        /// Reason for skipping.
        reason: String,
    },

    /// Publish failed; the error was logged and the run ended cleanly.
    Failed {
        /// Error message.
        error: String,
    },
}

impl PublishStatus {
    /// Returns the status as a short string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }

    /// Returns the PR URL if one was created.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Created { url, .. } => Some(url),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_status_to_string() {
        assert_eq!(
            PublishStatus::Created {
                number: 1,
                url: "https://example.com".to_string()
            }
            .as_str(),
            "created"
        );
        assert_eq!(
            PublishStatus::Skipped {
                reason: "dry run".to_string()
            }
            .as_str(),
            "skipped"
        );
        assert_eq!(
            PublishStatus::Failed {
                error: "boom".to_string()
            }
            .as_str(),
            "failed"
        );
    }

    #[test]
    fn url_only_for_created() {
        let created = PublishStatus::Created {
            number: 7,
            url: "https://github.com/user/fork/pull/7".to_string(),
        };
        assert_eq!(created.url(), Some("https://github.com/user/fork/pull/7"));
        assert_eq!(
            PublishStatus::Failed {
                error: "boom".to_string()
            }
            .url(),
            None
        );
    }
}
