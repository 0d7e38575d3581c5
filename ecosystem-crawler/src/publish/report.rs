//! Pull request title and body generation.
//!
//! The PR body summarizes the run: the number of new projects and a Markdown
//! table of owners sorted by how many of the new repositories they own.

use std::collections::HashMap;
use url::Url;

/// Extracts the owner from a repository web URL: the path segment
/// immediately following the host.
#[must_use]
pub fn owner_of(repo_url: &str) -> Option<String> {
    let parsed = Url::parse(repo_url).ok()?;
    parsed
        .path_segments()?
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Groups the new URLs by owner and sorts descending by count.
///
/// Ties are broken alphabetically so the table is deterministic.
#[must_use]
pub fn owner_counts(urls: &[String]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for url in urls {
        if let Some(owner) = owner_of(url) {
            *counts.entry(owner).or_insert(0) += 1;
        }
    }

    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Formats the owner counts as a Markdown table.
#[must_use]
pub fn owner_table(counts: &[(String, usize)]) -> String {
    let mut table = String::from("| Owner | Project Count |\n| --- | --- |\n");
    let rows: Vec<String> = counts
        .iter()
        .map(|(owner, count)| format!("| {owner} | {count} |"))
        .collect();
    table.push_str(&rows.join("\n"));
    table
}

/// Generates the PR title.
#[must_use]
pub fn pr_title(ecosystem: &str) -> String {
    format!("Update {ecosystem} Project List")
}

/// Generates the commit message for the registry file update.
#[must_use]
pub fn commit_message(ecosystem: &str) -> String {
    format!("Update {ecosystem} project list")
}

/// Generates the PR body: new-project count plus the owner table.
#[must_use]
pub fn pr_body(new_urls: &[String]) -> String {
    let count = new_urls.len();
    let table = owner_table(&owner_counts(new_urls));
    format!(
        "Updated project list with {count} new findings.\n\n\
         ## New Project Count\n{count}\n\n\
         ## Project Owners by Project Count\n{table}"
    )
}
