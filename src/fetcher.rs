//! Bounded-timeout page retrieval.
//!
//! All network reads in the pipeline go through [`PageFetcher`], a thin
//! wrapper around a shared `reqwest::Client` with a per-request timeout.
//! Outcomes are a closed set of tagged variants ([`FetchResult`]) rather than
//! errors: callers pattern-match on what happened instead of unwinding, and
//! the pagination loop can treat an HTTP 4xx/5xx as "stop, keep what was
//! gathered" rather than discarding everything.
//!
//! The [`Fetch`] trait is the seam that lets the pagination walker and the
//! resolver run against canned responses in tests.

use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default per-request timeout, matching the reference pipeline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a single bounded GET. Never partially filled.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// 2xx/3xx response with its decoded body.
    Body(String),
    /// Response arrived but carried a status code >= 400.
    HttpError(u16),
    /// Transport-level failure: DNS, timeout, connection reset.
    NetworkError(String),
}

/// Abstraction over page retrieval so the walker and resolver can be
/// exercised with canned responses.
pub trait Fetch {
    /// Retrieve `url`, mapping every failure mode into a [`FetchResult`].
    async fn get(&self, url: &Url) -> FetchResult;
}

/// HTTP fetcher backed by a pooled `reqwest::Client`.
///
/// Cloning is cheap and shares the underlying connection pool, which is what
/// the concurrent per-entry fan-out relies on.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Build a fetcher whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ynews_digest/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for PageFetcher {
    async fn get(&self, url: &Url) -> FetchResult {
        let response = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(%url, error = %e, "request failed before a response arrived");
                return FetchResult::NetworkError(e.to_string());
            }
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            warn!(%url, status = status.as_u16(), "server answered with an error status");
            return FetchResult::HttpError(status.as_u16());
        }

        match response.text().await {
            Ok(body) => {
                debug!(%url, bytes = body.len(), "fetched page");
                FetchResult::Body(body)
            }
            Err(e) => {
                warn!(%url, error = %e, "failed reading response body");
                FetchResult::NetworkError(e.to_string())
            }
        }
    }
}
