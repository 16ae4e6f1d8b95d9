//! Data models for feed entries and resolved articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FeedEntry`]: One item (title + link) parsed from the topics feed
//! - [`ArticleSource`]: Where the authoritative full text of an entry lives
//! - [`ExtractedArticle`]: The caller-facing record for one resolved entry
//! - [`NewsDigest`]: Collection of resolved articles for a single run
//!
//! All of these are transient: they are created and consumed within one
//! resolution pass and nothing is persisted beyond the JSON output file.

use serde::{Deserialize, Serialize};
use url::Url;

/// One item parsed from the syndication feed.
///
/// Only the title and canonical link are consumed from each feed item;
/// descriptions, categories and publication dates are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    /// The entry's headline as published in the feed.
    pub title: String,
    /// The aggregator page the entry points at.
    pub link: Url,
}

/// Where the full text of an entry's article was found.
///
/// Determined per entry by the presence of the "read full article" anchor on
/// the aggregator page: when the anchor exists and its target resolves, the
/// article lives on an external publisher page (possibly paginated);
/// otherwise the aggregator page's own `<article>` body is authoritative.
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleSource {
    /// The aggregator's own page carries the article body.
    AggregatorPage { url: Url },
    /// An external publisher page discovered via the full-article anchor.
    ExternalPage { url: Url, discovered_from: Url },
}

/// A fully resolved article, ready for the caller.
///
/// `content` is either the filtered excerpt or, when resolution of this one
/// entry failed, a human-readable error message. Failures are visible data
/// at this boundary, never a failure of the whole batch.
#[derive(Debug, Deserialize, Serialize)]
pub struct ExtractedArticle {
    /// The feed entry's title.
    pub title: String,
    /// The aggregator page link from the feed.
    pub aggregator_link: String,
    /// The external publisher URL, when the full-article anchor was followed.
    pub external_link: Option<String>,
    /// Filtered excerpt text, or an error message for a failed entry.
    pub content: String,
}

/// A collection of resolved articles representing a single run.
///
/// Each execution produces one `NewsDigest`, serialized to JSON for the thin
/// web layer to serve. Article order matches feed order.
///
/// # Edition naming
///
/// The `time_of_day` field categorizes runs as:
/// - `"morning"`: 00:00 - 08:00
/// - `"afternoon"`: 08:00 - 16:00
/// - `"evening"`: 16:00 - 24:00
#[derive(Debug, Deserialize, Serialize)]
pub struct NewsDigest {
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The time of day category: "morning", "afternoon", or "evening".
    pub time_of_day: String,
    /// The exact local time of the run.
    pub local_time: String,
    /// Resolved articles, in feed order.
    pub articles: Vec<ExtractedArticle>,
}
