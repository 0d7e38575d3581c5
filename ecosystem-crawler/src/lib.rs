#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod discovery;
pub mod fetch;
pub mod publish;
pub mod queries;
pub mod registry;
pub mod runner;
pub mod summary;

pub use discovery::{
    discover_repositories, new_repositories, run_query, MAX_PAGE, RESULTS_PER_PAGE,
};
pub use fetch::{FetchError, SearchClient};
pub use publish::{
    owner_counts, owner_table, pr_body, pr_title, publish, sync_fork, PublishError, PublishStatus,
};
pub use queries::{build_matrix, default_axes, size_ranges, QueryAxis, SearchQuery};
pub use registry::{fetch_registry, known_urls, merge::append_entries, RegistryError};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use summary::RunSummary;
