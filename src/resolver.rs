//! Per-entry article resolution.
//!
//! For each feed entry the resolver fetches the aggregator page and decides
//! where the authoritative full text lives:
//!
//! - the page carries a "read full article" anchor with a resolvable target
//!   → external branch: paginated Policy-B extraction, boilerplate trim,
//!   relevance filter;
//! - no such anchor → aggregator branch: Policy-A extraction of the page's
//!   own `<article>` body, relevance filter.
//!
//! Failures at any step collapse into a typed [`ResolveError`] and are
//! serialized into the entry's `content` field at the boundary. One entry's
//! failure never aborts the rest of the batch.
//!
//! Entries are resolved concurrently with a bounded fan-out; the output
//! sequence always matches feed order.

use crate::api::FilterAsync;
use crate::config::PipelineConfig;
use crate::extract::{self, ExtractPolicy};
use crate::fetcher::{Fetch, FetchResult};
use crate::models::{ArticleSource, ExtractedArticle, FeedEntry};
use crate::paginate;
use crate::trim::TrimRules;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// How many entries are resolved concurrently. Output order is unaffected.
const RESOLVE_BATCH_SIZE: usize = 4;

/// Failure while resolving a single entry.
///
/// Internal to the resolver: at the boundary it is rendered into the entry's
/// `content` field, never thrown past it.
#[derive(Debug)]
pub enum ResolveError {
    /// The aggregator page could not be retrieved.
    AggregatorFetch { url: Url, cause: String },
    /// The relevance filter call failed after retries.
    Filter { cause: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::AggregatorFetch { url, cause } => {
                write!(f, "記事ページの取得に失敗しました ({url}): {cause}")
            }
            ResolveError::Filter { cause } => {
                write!(f, "タイトル関連フィルタの呼び出しに失敗しました: {cause}")
            }
        }
    }
}

impl Error for ResolveError {}

/// Resolves feed entries into [`ExtractedArticle`] records.
///
/// Both collaborators are injected: the fetcher behind [`Fetch`] and the
/// relevance filter behind [`FilterAsync`], so the whole state machine runs
/// against stubs in tests.
pub struct ArticleResolver<F, C> {
    fetcher: F,
    filter: C,
    max_pages: u32,
    full_article_label: String,
    trim: TrimRules,
}

impl<F, C> ArticleResolver<F, C>
where
    F: Fetch,
    C: FilterAsync,
{
    pub fn new(fetcher: F, filter: C, pipeline: &PipelineConfig) -> Self {
        Self {
            fetcher,
            filter,
            max_pages: pipeline.max_pages,
            full_article_label: pipeline.full_article_label.clone(),
            trim: pipeline.trim.clone(),
        }
    }

    /// Resolve all entries, concurrently but order-preserving.
    #[instrument(level = "info", skip_all, fields(count = entries.len()))]
    pub async fn resolve_feed(&self, entries: Vec<FeedEntry>) -> Vec<ExtractedArticle> {
        let articles: Vec<ExtractedArticle> = stream::iter(entries)
            .map(|entry| async move { self.resolve_entry(&entry).await })
            .buffered(RESOLVE_BATCH_SIZE)
            .collect()
            .await;

        let failed = articles
            .iter()
            .filter(|a| a.content.starts_with("[エラー発生]"))
            .count();
        info!(
            total = articles.len(),
            failed,
            "resolved feed entries"
        );
        articles
    }

    /// Resolve one entry. Never fails: an errored entry carries its message
    /// in `content`.
    #[instrument(level = "debug", skip(self), fields(title = %entry.title))]
    pub async fn resolve_entry(&self, entry: &FeedEntry) -> ExtractedArticle {
        match self.resolve_inner(entry).await {
            Ok((source, content)) => {
                let external_link = match &source {
                    ArticleSource::ExternalPage { url, .. } => Some(url.to_string()),
                    ArticleSource::AggregatorPage { .. } => None,
                };
                ExtractedArticle {
                    title: entry.title.clone(),
                    aggregator_link: entry.link.to_string(),
                    external_link,
                    content,
                }
            }
            Err(e) => {
                warn!(error = %e, "entry resolution failed");
                ExtractedArticle {
                    title: entry.title.clone(),
                    aggregator_link: entry.link.to_string(),
                    external_link: None,
                    content: format!("[エラー発生] {e}"),
                }
            }
        }
    }

    async fn resolve_inner(
        &self,
        entry: &FeedEntry,
    ) -> Result<(ArticleSource, String), ResolveError> {
        let body = match self.fetcher.get(&entry.link).await {
            FetchResult::Body(body) => body,
            FetchResult::HttpError(status) => {
                return Err(ResolveError::AggregatorFetch {
                    url: entry.link.clone(),
                    cause: format!("HTTP {status}"),
                });
            }
            FetchResult::NetworkError(cause) => {
                return Err(ResolveError::AggregatorFetch {
                    url: entry.link.clone(),
                    cause,
                });
            }
        };

        let source = self.pick_source(&body, &entry.link);
        let raw_text = match &source {
            ArticleSource::ExternalPage { url, .. } => {
                debug!(%url, "following external full-article link");
                let paragraphs = paginate::collect(&self.fetcher, url, self.max_pages).await;
                self.trim.trim(paragraphs).join("\n")
            }
            ArticleSource::AggregatorPage { .. } => {
                debug!("no full-article anchor; extracting aggregator article body");
                extract::extract(&body, ExtractPolicy::ArticleBody).join("\n")
            }
        };

        let content = self
            .filter
            .filter(&entry.title, &raw_text)
            .await
            .map_err(|e| ResolveError::Filter {
                cause: e.to_string(),
            })?;

        Ok((source, content))
    }

    /// Decide where the full text lives, from the aggregator page document.
    fn pick_source(&self, body: &str, aggregator_link: &Url) -> ArticleSource {
        match extract::find_full_article_link(body, &self.full_article_label, aggregator_link) {
            Some(url) => ArticleSource::ExternalPage {
                url,
                discovered_from: aggregator_link.clone(),
            },
            None => ArticleSource::AggregatorPage {
                url: aggregator_link.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::{EchoFilter, FailingFilter};
    use crate::fetcher::stub::StubFetcher;

    fn entry(title: &str, link: &str) -> FeedEntry {
        FeedEntry {
            title: title.to_string(),
            link: Url::parse(link).unwrap(),
        }
    }

    fn resolver<F: Fetch, C: FilterAsync>(fetcher: F, filter: C) -> ArticleResolver<F, C> {
        ArticleResolver::new(fetcher, filter, &PipelineConfig::default())
    }

    const AGGREGATOR_ONLY_PAGE: &str = r#"<html><body>
        <article>
            <p>段落一</p>
            <p>段落二</p>
            <p>段落三</p>
            <div class="related"><p>関連記事</p></div>
        </article>
    </body></html>"#;

    #[tokio::test]
    async fn test_aggregator_branch_extracts_article_body() {
        let fetcher = StubFetcher::default().with(
            "https://news.yahoo.co.jp/pickup/1",
            FetchResult::Body(AGGREGATOR_ONLY_PAGE.to_string()),
        );
        let resolver = resolver(fetcher, EchoFilter);

        let article = resolver
            .resolve_entry(&entry("見出し", "https://news.yahoo.co.jp/pickup/1"))
            .await;

        assert_eq!(article.external_link, None);
        assert_eq!(article.content, "[見出し] 段落一\n段落二\n段落三");
    }

    #[tokio::test]
    async fn test_external_branch_paginates_and_trims() {
        let aggregator_page = r#"<html><body>
            <a href="https://pub.example/story?id=9">記事全文を読む</a>
        </body></html>"#;

        // 14 body paragraphs on page 1, then a copyright footer at index 14.
        let mut page1 = String::from("<html><body>");
        for i in 0..14 {
            page1.push_str(&format!("<p>line {i}</p>"));
        }
        page1.push_str("<p>Copyright © Publisher</p></body></html>");

        let fetcher = StubFetcher::default()
            .with(
                "https://news.yahoo.co.jp/pickup/2",
                FetchResult::Body(aggregator_page.to_string()),
            )
            .with("https://pub.example/story?id=9", FetchResult::Body(page1))
            .with(
                "https://pub.example/story?id=9&page=2",
                FetchResult::Body("<html><body></body></html>".to_string()),
            );
        let resolver = resolver(fetcher, EchoFilter);

        let article = resolver
            .resolve_entry(&entry("外部記事", "https://news.yahoo.co.jp/pickup/2"))
            .await;

        assert_eq!(
            article.external_link.as_deref(),
            Some("https://pub.example/story?id=9")
        );
        // marker at index 14, lookback 10: lines 0..4 survive
        assert_eq!(article.content, "[外部記事] line 0\nline 1\nline 2\nline 3");
    }

    #[tokio::test]
    async fn test_missing_article_container_filters_empty_text() {
        let fetcher = StubFetcher::default().with(
            "https://news.yahoo.co.jp/pickup/3",
            FetchResult::Body("<html><body><p>not in a container</p></body></html>".to_string()),
        );
        let resolver = resolver(fetcher, EchoFilter);

        let article = resolver
            .resolve_entry(&entry("空", "https://news.yahoo.co.jp/pickup/3"))
            .await;

        assert_eq!(article.content, "[空] ");
    }

    #[tokio::test]
    async fn test_network_failure_becomes_error_content() {
        let fetcher = StubFetcher::default().with(
            "https://news.yahoo.co.jp/pickup/4",
            FetchResult::NetworkError("dns failure".to_string()),
        );
        let resolver = resolver(fetcher, EchoFilter);

        let article = resolver
            .resolve_entry(&entry("失敗", "https://news.yahoo.co.jp/pickup/4"))
            .await;

        assert!(article.content.starts_with("[エラー発生]"));
        assert!(article.content.contains("dns failure"));
        assert_eq!(article.external_link, None);
    }

    #[tokio::test]
    async fn test_filter_failure_becomes_error_content() {
        let fetcher = StubFetcher::default().with(
            "https://news.yahoo.co.jp/pickup/5",
            FetchResult::Body(AGGREGATOR_ONLY_PAGE.to_string()),
        );
        let resolver = resolver(fetcher, FailingFilter);

        let article = resolver
            .resolve_entry(&entry("t", "https://news.yahoo.co.jp/pickup/5"))
            .await;

        assert!(article.content.starts_with("[エラー発生]"));
        assert!(article.content.contains("model unavailable"));
    }

    #[tokio::test]
    async fn test_failed_entry_does_not_poison_the_batch() {
        let fetcher = StubFetcher::default()
            .with(
                "https://news.yahoo.co.jp/pickup/10",
                FetchResult::NetworkError("connection reset".to_string()),
            )
            .with(
                "https://news.yahoo.co.jp/pickup/11",
                FetchResult::Body(AGGREGATOR_ONLY_PAGE.to_string()),
            );
        let resolver = resolver(fetcher, EchoFilter);

        let articles = resolver
            .resolve_feed(vec![
                entry("壊れた", "https://news.yahoo.co.jp/pickup/10"),
                entry("正常", "https://news.yahoo.co.jp/pickup/11"),
            ])
            .await;

        assert_eq!(articles.len(), 2);
        assert!(articles[0].content.starts_with("[エラー発生]"));
        assert_eq!(articles[1].content, "[正常] 段落一\n段落二\n段落三");
    }

    #[tokio::test]
    async fn test_resolve_feed_preserves_feed_order() {
        let mut fetcher = StubFetcher::default();
        for i in 0..6 {
            fetcher = fetcher.with(
                &format!("https://news.yahoo.co.jp/pickup/{i}"),
                FetchResult::Body(format!("<article><p>body {i}</p></article>")),
            );
        }
        let resolver = resolver(fetcher, EchoFilter);

        let entries: Vec<FeedEntry> = (0..6)
            .map(|i| entry(&format!("t{i}"), &format!("https://news.yahoo.co.jp/pickup/{i}")))
            .collect();
        let articles = resolver.resolve_feed(entries).await;

        let contents: Vec<&str> = articles.iter().map(|a| a.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "[t0] body 0",
                "[t1] body 1",
                "[t2] body 2",
                "[t3] body 3",
                "[t4] body 4",
                "[t5] body 5"
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_feed_resolves_to_empty_batch() {
        let resolver = resolver(StubFetcher::default(), EchoFilter);
        assert!(resolver.resolve_feed(Vec::new()).await.is_empty());
    }
}
