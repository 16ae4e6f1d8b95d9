//! Bounded pagination walk across an external publisher article.
//!
//! External publishers split long articles across numbered pages addressed
//! by a `page` query parameter. [`collect`] drives paragraph extraction
//! across pages `1..=max_pages`, appending in page order, and stops at the
//! first page that errors or yields no paragraphs. Failures are absorbed at
//! this boundary and mean "no more pages"; whatever accumulated before the
//! stop is returned.

use crate::extract::{self, ExtractPolicy};
use crate::fetcher::{Fetch, FetchResult};
use tracing::{debug, instrument, warn};
use url::Url;

/// Upper bound on pages walked per article, matching the reference pipeline.
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// Build the URL for page `page` of the article at `base`.
///
/// Page 1 is `base` unchanged. For later pages the `page` query parameter is
/// injected, overwriting any existing one, while every other query parameter
/// is preserved.
pub fn page_url(base: &Url, page: u32) -> Url {
    if page <= 1 {
        return base.clone();
    }

    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("page", &page.to_string());
    }
    url
}

/// Gather paragraphs from up to `max_pages` pages of the article at `base`.
#[instrument(level = "debug", skip(fetcher), fields(%base, max_pages))]
pub async fn collect<F: Fetch>(fetcher: &F, base: &Url, max_pages: u32) -> Vec<String> {
    let mut all_paragraphs = Vec::new();

    for page in 1..=max_pages {
        let url = page_url(base, page);
        match fetcher.get(&url).await {
            FetchResult::Body(body) => {
                let paragraphs = extract::extract(&body, ExtractPolicy::AnyParagraph);
                if paragraphs.is_empty() {
                    debug!(page, "page has no paragraphs; stopping walk");
                    break;
                }
                debug!(page, count = paragraphs.len(), "collected page paragraphs");
                all_paragraphs.extend(paragraphs);
            }
            FetchResult::HttpError(status) => {
                debug!(page, status, "error status; stopping walk");
                break;
            }
            FetchResult::NetworkError(cause) => {
                warn!(page, %cause, "network failure; stopping walk");
                break;
            }
        }
    }

    all_paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::stub::StubFetcher;

    fn page_body(lines: &[&str]) -> FetchResult {
        let html: String = lines.iter().map(|l| format!("<p>{l}</p>")).collect();
        FetchResult::Body(format!("<html><body>{html}</body></html>"))
    }

    #[test]
    fn test_page_one_uses_base_unchanged() {
        let base = Url::parse("https://pub.example/story?id=42").unwrap();
        assert_eq!(page_url(&base, 1), base);
    }

    #[test]
    fn test_later_pages_preserve_other_query_parameters() {
        let base = Url::parse("https://pub.example/story?id=42&lang=ja").unwrap();
        let third = page_url(&base, 3);
        assert_eq!(third.as_str(), "https://pub.example/story?id=42&lang=ja&page=3");
    }

    #[test]
    fn test_existing_page_parameter_is_overwritten() {
        let base = Url::parse("https://pub.example/story?page=1&id=42").unwrap();
        let second = page_url(&base, 2);
        let pairs: Vec<(String, String)> = second
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs.iter().filter(|(k, _)| k == "page").count(), 1);
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("id".to_string(), "42".to_string())));
    }

    #[test]
    fn test_page_url_without_query() {
        let base = Url::parse("https://pub.example/story").unwrap();
        assert_eq!(page_url(&base, 4).as_str(), "https://pub.example/story?page=4");
    }

    #[tokio::test]
    async fn test_collect_concatenates_until_empty_page() {
        let fetcher = StubFetcher::default()
            .with("https://pub.example/story", page_body(&["p1a", "p1b"]))
            .with("https://pub.example/story?page=2", page_body(&["p2a"]))
            .with(
                "https://pub.example/story?page=3",
                FetchResult::Body("<html><body>no paragraphs here</body></html>".to_string()),
            )
            .with("https://pub.example/story?page=4", page_body(&["unreached"]));

        let base = Url::parse("https://pub.example/story").unwrap();
        let paragraphs = collect(&fetcher, &base, DEFAULT_MAX_PAGES).await;
        assert_eq!(paragraphs, vec!["p1a", "p1b", "p2a"]);
    }

    #[tokio::test]
    async fn test_collect_stops_at_error_status_keeping_earlier_pages() {
        let fetcher = StubFetcher::default()
            .with("https://pub.example/story", page_body(&["first"]))
            .with("https://pub.example/story?page=2", FetchResult::HttpError(404));

        let base = Url::parse("https://pub.example/story").unwrap();
        let paragraphs = collect(&fetcher, &base, DEFAULT_MAX_PAGES).await;
        assert_eq!(paragraphs, vec!["first"]);
    }

    #[tokio::test]
    async fn test_collect_absorbs_network_failure() {
        let fetcher = StubFetcher::default()
            .with("https://pub.example/story", page_body(&["first"]))
            .with(
                "https://pub.example/story?page=2",
                FetchResult::NetworkError("connection reset".to_string()),
            );

        let base = Url::parse("https://pub.example/story").unwrap();
        let paragraphs = collect(&fetcher, &base, DEFAULT_MAX_PAGES).await;
        assert_eq!(paragraphs, vec!["first"]);
    }

    #[tokio::test]
    async fn test_collect_never_exceeds_max_pages() {
        let mut fetcher = StubFetcher::default().with("https://pub.example/story", page_body(&["page1"]));
        for page in 2..=8 {
            fetcher = fetcher.with(
                &format!("https://pub.example/story?page={page}"),
                page_body(&[&format!("page{page}")]),
            );
        }

        let base = Url::parse("https://pub.example/story").unwrap();
        let paragraphs = collect(&fetcher, &base, 5).await;
        assert_eq!(paragraphs, vec!["page1", "page2", "page3", "page4", "page5"]);
    }

    #[tokio::test]
    async fn test_collect_first_page_error_yields_empty() {
        let fetcher = StubFetcher::default()
            .with("https://pub.example/story", FetchResult::HttpError(500));
        let base = Url::parse("https://pub.example/story").unwrap();
        assert!(collect(&fetcher, &base, DEFAULT_MAX_PAGES).await.is_empty());
    }
}
