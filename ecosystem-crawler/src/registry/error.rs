//! Registry error types.

use thiserror::Error;

/// Errors that can occur while reading the registry document.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to fetch the raw document.
    #[error("Failed to fetch registry document: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Failed to parse the document as TOML.
    #[error("Failed to parse registry document: {0}")]
    Parse(#[from] toml::de::Error),
}
