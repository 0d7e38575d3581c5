//! Repository discovery using GitHub Code Search API.
//!
//! Drives the rate-limited fetcher across result pages for every query in
//! the matrix and merges the discovered repository URLs into one set.

use crate::fetch::SearchClient;
use crate::queries::SearchQuery;
use serde::Deserialize;
use std::collections::HashSet;
use std::future::Future;
use tracing::{info, warn};

/// Maximum number of pages requested per query.
pub const MAX_PAGE: u32 = 10;

/// Fixed page size for code search.
pub const RESULTS_PER_PAGE: usize = 100;

const SEARCH_ENDPOINT: &str = "https://api.github.com/search/code";

/// One page of the code search response.
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    repository: ItemRepository,
}

#[derive(Debug, Deserialize)]
struct ItemRepository {
    html_url: String,
}

/// What to do after a page of results has been consumed.
#[derive(Debug, PartialEq, Eq)]
enum PageStep {
    /// More full pages may follow.
    Continue,
    /// Last page of results reached.
    Done,
    /// Pagination ended at the API's result ceiling; recall may be truncated.
    DoneTruncated,
}

/// Decides whether pagination continues after a non-empty page.
///
/// Stops at the first under-full page or at [`MAX_PAGE`], whichever comes
/// first. The truncated variant marks the 1000-result ceiling (10 pages of
/// 100) being hit with results possibly remaining.
fn classify_page(page: u32, item_count: usize) -> PageStep {
    if item_count < RESULTS_PER_PAGE {
        if page == MAX_PAGE - 1 {
            PageStep::DoneTruncated
        } else {
            PageStep::Done
        }
    } else if page == MAX_PAGE {
        PageStep::DoneTruncated
    } else {
        PageStep::Continue
    }
}

/// Builds the search URL for one query and page.
fn search_url(query_string: &str, page: u32) -> String {
    let params = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("q", query_string)
        .append_pair("per_page", &RESULTS_PER_PAGE.to_string())
        .append_pair("page", &page.to_string())
        .finish();
    format!("{SEARCH_ENDPOINT}?{params}")
}

/// The pagination loop, generic over the page-fetch step.
///
/// `fetch_page` returns the URLs of one page, or `None` when the fetch
/// failed; a failed page degrades to zero items so the query's recall
/// suffers without aborting the crawl. Never requests more than
/// [`MAX_PAGE`] pages.
async fn collect_pages<F, Fut>(query_string: &str, mut fetch_page: F) -> Vec<String>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<Vec<String>>>,
{
    let mut urls = Vec::new();

    for page in 1..=MAX_PAGE {
        info!(page, max_page = MAX_PAGE, "Fetching search page");

        let Some(items) = fetch_page(page).await else {
            break;
        };

        if items.is_empty() {
            info!("No more results");
            break;
        }

        let item_count = items.len();
        info!(count = item_count, "Found results");
        urls.extend(items);

        match classify_page(page, item_count) {
            PageStep::Continue => {}
            PageStep::Done => break,
            PageStep::DoneTruncated => {
                warn!(
                    query = %query_string,
                    "There may be additional repositories that match the search criteria \
                     but were not retrieved due to the GitHub API's pagination limit"
                );
                break;
            }
        }
    }

    urls
}

/// Collects repository URLs for a single query, paging until exhaustion.
///
/// Every call performs fresh network requests.
pub async fn run_query(client: &SearchClient, query: &SearchQuery) -> Vec<String> {
    let query_string = query.to_query_string();

    let fetch_page = |page: u32| {
        let url = search_url(&query_string, page);
        let log_query = query_string.clone();
        async move {
            let response = match client.get_with_backoff(&url).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        query = %log_query,
                        page,
                        error = %e,
                        "Search page failed, treating as empty"
                    );
                    return None;
                }
            };

            match response.json::<SearchPage>().await {
                Ok(parsed) => Some(
                    parsed
                        .items
                        .into_iter()
                        .map(|item| item.repository.html_url)
                        .collect(),
                ),
                Err(e) => {
                    warn!(
                        query = %log_query,
                        page,
                        error = %e,
                        "Malformed search response, treating as empty"
                    );
                    None
                }
            }
        }
    };

    collect_pages(&query_string, fetch_page).await
}

/// Runs the full query matrix and collapses all discovered URLs into a set.
///
/// A failure inside one query's pagination degrades that query's recall only;
/// it never aborts the run.
pub async fn discover_repositories(
    client: &SearchClient,
    matrix: &[SearchQuery],
) -> HashSet<String> {
    info!(queries = matrix.len(), "Starting search for new repositories");
    let mut discovered = HashSet::new();

    for query in matrix {
        info!(query = %query.to_query_string(), "Searching");
        discovered.extend(run_query(client, query).await);
    }

    info!(total = discovered.len(), "Total repositories found");
    discovered
}

/// Computes `discovered − known` by exact string membership.
///
/// URLs are opaque, case-sensitive keys; no normalization of casing, trailing
/// slashes or `.git` suffixes is applied.
#[must_use]
pub fn new_repositories(
    discovered: &HashSet<String>,
    known: &HashSet<String>,
) -> HashSet<String> {
    discovered.difference(known).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Drives the real pagination loop with a canned sequence of per-page
    /// item counts, returning the requests issued and the URLs collected.
    async fn paginate(counts: &[usize]) -> (u32, Vec<String>) {
        let requests = Cell::new(0u32);
        let urls = collect_pages("query", |page| {
            requests.set(requests.get() + 1);
            let count = counts.get((page - 1) as usize).copied().unwrap_or(0);
            async move { Some(vec!["https://github.com/owner/repo".to_string(); count]) }
        })
        .await;
        (requests.get(), urls)
    }

    #[tokio::test]
    async fn stops_on_empty_page() {
        // Two full pages, then exhaustion.
        let (requests, urls) = paginate(&[100, 100, 0]).await;
        assert_eq!(requests, 3);
        assert_eq!(urls.len(), 200);
    }

    #[tokio::test]
    async fn stops_on_first_under_full_page() {
        let (requests, urls) = paginate(&[100, 37]).await;
        assert_eq!(requests, 2);
        assert_eq!(urls.len(), 137);
    }

    #[tokio::test]
    async fn stops_at_page_cap_with_full_pages() {
        let (requests, urls) = paginate(&[100; 12]).await;
        assert_eq!(requests, MAX_PAGE);
        assert_eq!(urls.len(), 1000);
    }

    #[tokio::test]
    async fn never_issues_more_than_max_page_requests() {
        let (requests, _) = paginate(&[100; 50]).await;
        assert!(requests <= MAX_PAGE);
    }

    #[tokio::test]
    async fn failed_page_degrades_to_partial_results() {
        let requests = Cell::new(0u32);
        let urls = collect_pages("query", |page| {
            requests.set(requests.get() + 1);
            async move {
                if page == 2 {
                    None
                } else {
                    Some(vec!["https://github.com/owner/repo".to_string(); 100])
                }
            }
        })
        .await;

        assert_eq!(requests.get(), 2);
        assert_eq!(urls.len(), 100);
    }

    #[test]
    fn truncation_is_flagged_at_the_result_ceiling() {
        // Full final page at the cap, or an under-full page one short of it.
        assert_eq!(classify_page(MAX_PAGE, 100), PageStep::DoneTruncated);
        assert_eq!(classify_page(MAX_PAGE - 1, 50), PageStep::DoneTruncated);
    }

    #[test]
    fn early_pages_classify_without_truncation() {
        assert_eq!(classify_page(3, 100), PageStep::Continue);
        assert_eq!(classify_page(3, 50), PageStep::Done);
    }

    #[test]
    fn search_url_embeds_query_page_and_size() {
        let url = search_url("filename:package.json compound-config size:0..1500", 3);
        assert!(url.starts_with("https://api.github.com/search/code?"));
        assert!(url.contains("per_page=100"));
        assert!(url.contains("page=3"));
        assert!(url.contains("q=filename%3Apackage.json+compound-config+size%3A0..1500"));
    }

    #[test]
    fn new_repositories_is_exact_set_difference() {
        let discovered: HashSet<String> = [
            "https://github.com/foo/bar".to_string(),
            "https://github.com/baz/qux".to_string(),
        ]
        .into_iter()
        .collect();
        let known: HashSet<String> = ["https://github.com/foo/bar".to_string()]
            .into_iter()
            .collect();

        let fresh = new_repositories(&discovered, &known);
        assert_eq!(fresh.len(), 1);
        assert!(fresh.contains("https://github.com/baz/qux"));
        assert!(fresh.is_disjoint(&known));
    }

    #[test]
    fn new_repositories_treats_near_duplicates_as_distinct() {
        // Equality is exact string equality: no trailing-slash or case folding.
        let discovered: HashSet<String> = ["https://github.com/foo/bar/".to_string()]
            .into_iter()
            .collect();
        let known: HashSet<String> = ["https://github.com/foo/bar".to_string()]
            .into_iter()
            .collect();

        let fresh = new_repositories(&discovered, &known);
        assert_eq!(fresh.len(), 1);
    }
}
