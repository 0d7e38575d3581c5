//! Formatting-preserving incremental merge.
//!
//! New entries are appended to the raw document text. Bytes preceding the
//! first appended block are left byte-identical to the (trailing-whitespace
//! trimmed) input: no re-serialization, no reordering, no comment loss.

use super::RegistryError;
use tracing::info;

/// Appends a `[[repo]]` block per new URL to the existing document text.
///
/// The document is parsed once more to obtain its own URL set; a URL already
/// present is never appended, even if it slipped through earlier
/// deduplication. Appended blocks follow the order of `new_urls`. The output
/// always ends with exactly one newline.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] if the existing text is not valid TOML.
pub fn append_entries(existing: &str, new_urls: &[String]) -> Result<String, RegistryError> {
    info!(count = new_urls.len(), "Updating registry document with new repositories");

    let present = super::known_urls(existing)?;
    let mut updated = existing.trim_end().to_string();

    for url in new_urls {
        if present.contains(url) {
            continue;
        }
        updated.push_str("\n\n[[repo]]\nurl = \"");
        updated.push_str(url);
        updated.push('"');
    }

    updated.push('\n');
    Ok(updated)
}
