//! # ynews_digest
//!
//! A news excerpt pipeline for the Yahoo! News Japan topics feed. For each
//! feed entry it locates the authoritative full text of the linked article,
//! which is either on the aggregator's own page or behind a "read full
//! article" link to an external publisher (possibly split across numbered
//! pages), strips footer boilerplate, runs the text through a title-relevance
//! filter model, and writes the resulting excerpts as a JSON digest.
//!
//! ## Usage
//!
//! ```sh
//! ynews_digest -j ./json
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Feed**: Fetch and parse the topics RSS feed into entries
//! 2. **Resolution**: Per entry, pick the article source and extract its
//!    paragraphs (paginating external articles, trimming boilerplate)
//! 3. **Filtering**: Send each article's text to the relevance-filter model
//!    (concurrent, order-preserving)
//! 4. **Output**: Write the digest JSON file
//!
//! Per-entry failures surface as error messages inside the affected entry's
//! `content` field; they never abort the run.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod api;
mod cli;
mod config;
mod extract;
mod feed;
mod fetcher;
mod models;
mod outputs;
mod paginate;
mod resolver;
mod trim;
mod utils;

use api::{ChatFilter, RetryFilter};
use cli::Cli;
use config::AppConfig;
use fetcher::PageFetcher;
use models::NewsDigest;
use resolver::ArticleResolver;
use utils::{ensure_writable_dir, time_of_day, truncate_for_log};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ynews_digest starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.feed_url, ?args.json_output_dir, args.max_items, "Parsed CLI arguments");

    // ---- Load configuration ----
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(key) = &args.filter_api_key {
        config.filter.api_key = key.clone();
    }
    if config.filter.api_key.is_empty() {
        warn!("No filter API key configured; relevance-filter calls will be rejected upstream");
    }

    // Early check: ensure JSON output dir is writable
    if let Err(e) = ensure_writable_dir(&args.json_output_dir).await {
        error!(
            path = %args.json_output_dir,
            error = %e,
            "JSON output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Fetch the feed ----
    let feed_url = Url::parse(&args.feed_url)?;
    let page_fetcher =
        PageFetcher::new(Duration::from_secs(config.pipeline.fetch_timeout_seconds))?;

    let mut entries = feed::fetch(&page_fetcher, &feed_url).await;
    if entries.is_empty() {
        // Feed unavailable degrades to an empty digest, not a crash.
        warn!(%feed_url, "feed yielded no entries; writing an empty digest");
    }
    entries.truncate(args.max_items);
    info!(count = entries.len(), "Entries to resolve");

    // ---- Resolve entries through the pipeline ----
    let chat_filter = RetryFilter::new(
        ChatFilter::new(config.filter.clone())?,
        5,
        Duration::from_secs(1),
    );
    let resolver = ArticleResolver::new(page_fetcher, chat_filter, &config.pipeline);
    let articles = resolver.resolve_feed(entries).await;

    for (i, article) in articles.iter().enumerate() {
        debug!(
            index = i,
            title = %article.title,
            external = article.external_link.is_some(),
            preview = %truncate_for_log(&article.content, 120),
            "Resolved article"
        );
    }

    // ---- Build and write the digest ----
    let digest = NewsDigest {
        local_date: Local::now().date_naive().to_string(),
        time_of_day: time_of_day(),
        local_time: Local::now().time().to_string(),
        articles,
    };
    info!(
        time_of_day = %digest.time_of_day,
        local_date = %digest.local_date,
        count = digest.articles.len(),
        "Digest assembled"
    );

    if let Err(e) = outputs::json::write_digest(&digest, &args.json_output_dir).await {
        error!(error = %e, "Failed to write digest JSON");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
