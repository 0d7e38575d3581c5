//! Reading the persisted registry document.
//!
//! The registry is a hand-maintained TOML file with a top-level `[[repo]]`
//! list. It is consumed twice per run: parsed into the known-URL set for
//! deduplication, and kept as raw text for the incremental merge so the
//! document's existing formatting and comments survive untouched.

mod error;
pub mod merge;

pub use error::RegistryError;

use serde::Deserialize;
use std::collections::HashSet;
use tracing::info;

/// Parsed shape of the registry document. Only the `url` field of each
/// `[[repo]]` entry is relevant here.
#[derive(Debug, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    repo: Vec<RepoEntry>,
}

#[derive(Debug, Deserialize)]
struct RepoEntry {
    url: String,
}

/// Fetches the raw registry document text.
///
/// An unfetchable document is fatal for the run; no partial publish is ever
/// attempted against a registry that could not be read.
///
/// # Errors
///
/// Returns [`RegistryError::Fetch`] on a transport failure or error status.
pub async fn fetch_registry(http: &reqwest::Client, url: &str) -> Result<String, RegistryError> {
    info!(url, "Fetching current registry document");
    let response = http.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// Parses the document into the set of already-recorded repository URLs.
///
/// A document without a `repo` list parses as an empty set.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] if the text is not valid TOML.
pub fn known_urls(text: &str) -> Result<HashSet<String>, RegistryError> {
    let document: RegistryDocument = toml::from_str(text)?;
    Ok(document.repo.into_iter().map(|entry| entry.url).collect())
}
