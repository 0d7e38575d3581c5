//! Rate-limit-aware HTTP fetching for the GitHub search API.
//!
//! The search API signals rate limiting with HTTP 403 plus an
//! `x-ratelimit-reset` header. [`SearchClient::get_with_backoff`] retries
//! forever on that signal; callers depend on eventual completion rather than
//! a bounded attempt count, so a persistent rate limit stalls the run instead
//! of failing it.

use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::StatusCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{error, warn};

/// Substring of a 403 body that identifies a rate-limit rejection.
const RATE_LIMIT_MARKER: &str = "rate limit exceeded";

/// Extra seconds slept beyond the advertised reset time.
const RESET_GRACE_SECS: u64 = 60;

/// Errors surfaced by the fetcher instead of being retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection error or timeout; not retried.
    #[error("transport error during GitHub API request: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any non-200 status that is not a rate-limit rejection.
    #[error("unexpected HTTP status {status} from GitHub API")]
    UnexpectedStatus { status: u16 },
}

/// HTTP client for the code search endpoint, carrying the bearer credential.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    token: String,
}

impl SearchClient {
    /// Wraps an HTTP client with the token used for search requests.
    #[must_use]
    pub fn new(http: reqwest::Client, token: String) -> Self {
        Self { http, token }
    }

    /// Executes a GET against `url`, sleeping through rate limits.
    ///
    /// On a rate-limited 403 this sleeps until the advertised reset (plus a
    /// grace period) and reissues the identical request, with no attempt cap.
    /// Other non-200 statuses and transport failures are returned as errors
    /// rather than retried. May block the caller for a long time; do not call
    /// from a latency-sensitive path.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] on a connection-level failure and
    /// [`FetchError::UnexpectedStatus`] for non-rate-limit error statuses.
    pub async fn get_with_backoff(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        loop {
            let response = match self
                .http
                .get(url)
                .header(AUTHORIZATION, format!("token {}", self.token))
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, "An error occurred during the GitHub API request");
                    return Err(FetchError::Transport(e));
                }
            };

            let status = response.status();
            if status == StatusCode::OK {
                return Ok(response);
            }

            let reset = rate_limit_reset(response.headers());
            let body = response.text().await.unwrap_or_default();

            if status == StatusCode::FORBIDDEN && body.to_lowercase().contains(RATE_LIMIT_MARKER) {
                let sleep = backoff_duration(reset, unix_now());
                warn!(
                    sleep_secs = sleep.as_secs(),
                    "Rate limit exceeded, sleeping until reset"
                );
                tokio::time::sleep(sleep).await;
                continue;
            }

            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }
    }
}

/// Reads the Unix-epoch reset time from the rate-limit headers, defaulting
/// to 0 when absent or malformed.
fn rate_limit_reset(headers: &HeaderMap) -> u64 {
    headers
        .get("x-ratelimit-reset")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Computes how long to sleep for a rate limit resetting at `reset`.
fn backoff_duration(reset: u64, now: u64) -> Duration {
    Duration::from_secs(reset.saturating_sub(now) + RESET_GRACE_SECS)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
