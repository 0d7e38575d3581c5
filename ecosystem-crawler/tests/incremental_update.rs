use std::collections::HashSet;

use ecosystem_crawler::{append_entries, known_urls, new_repositories};

const REGISTRY: &str = r#"# Ecosystem: Compound
# Sub-ecosystems can be listed with [[sub_ecosystems]].
title = "Compound"

[[repo]]
url = "https://github.com/foo/bar"

[[repo]]
url = "https://github.com/compound-finance/compound-protocol"
"#;

#[test]
fn discovery_diff_and_merge_append_only_the_unknown_repository() {
    let known = known_urls(REGISTRY).unwrap();
    assert_eq!(known.len(), 2);

    let discovered: HashSet<String> = [
        "https://github.com/foo/bar".to_string(),
        "https://github.com/baz/qux".to_string(),
    ]
    .into_iter()
    .collect();

    let fresh = new_repositories(&discovered, &known);
    assert_eq!(fresh.len(), 1);
    assert!(fresh.contains("https://github.com/baz/qux"));

    let mut new_sorted: Vec<String> = fresh.into_iter().collect();
    new_sorted.sort();

    let updated = append_entries(REGISTRY, &new_sorted).unwrap();

    // Existing bytes are untouched, comments included.
    let trimmed = REGISTRY.trim_end();
    assert_eq!(&updated[..trimmed.len()], trimmed);
    assert!(updated.starts_with("# Ecosystem: Compound\n"));

    // Exactly one appended block.
    assert!(updated.ends_with("\n\n[[repo]]\nurl = \"https://github.com/baz/qux\"\n"));
    assert_eq!(updated.matches("[[repo]]").count(), 3);
}

#[test]
fn merged_document_is_stable_across_repeat_runs() {
    let new_urls = vec!["https://github.com/baz/qux".to_string()];
    let once = append_entries(REGISTRY, &new_urls).unwrap();

    // A second run discovering the same URL appends nothing further.
    let known_after = known_urls(&once).unwrap();
    let discovered: HashSet<String> = new_urls.iter().cloned().collect();
    assert!(new_repositories(&discovered, &known_after).is_empty());

    let twice = append_entries(&once, &new_urls).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn merge_without_findings_leaves_document_unchanged_modulo_trailing_newline() {
    let updated = append_entries(REGISTRY, &[]).unwrap();
    assert_eq!(updated, format!("{}\n", REGISTRY.trim_end()));
}
