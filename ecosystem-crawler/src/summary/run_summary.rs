//! Run summary types.

use crate::publish::PublishStatus;

/// Summary of a complete run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of search queries executed (axes × size ranges).
    pub queries_executed: usize,

    /// Number of distinct repository URLs discovered.
    pub urls_discovered: usize,

    /// Number of URLs not yet present in the registry.
    pub new_urls: usize,

    /// Outcome of the publish step, if one was attempted.
    pub publish: Option<PublishStatus>,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Records the publish outcome.
    pub fn record_publish(&mut self, status: PublishStatus) {
        self.publish = Some(status);
    }

    /// Returns true if the publish step failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        matches!(self.publish, Some(PublishStatus::Failed { .. }))
    }

    /// Returns true if no step failed.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}
