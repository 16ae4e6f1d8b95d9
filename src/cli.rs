//! Command-line interface definitions.
//!
//! All arguments can be provided via command-line flags; the filter API key
//! can also come from the environment.

use clap::Parser;

/// Command-line arguments for the digest pipeline.
///
/// # Examples
///
/// ```sh
/// # Basic usage
/// ynews_digest -j ./json
///
/// # A different topics feed, fewer entries
/// ynews_digest -j ./json -f https://news.yahoo.co.jp/rss/topics/business.xml -m 5
///
/// # With an explicit config file
/// ynews_digest -j ./json -c ./config.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// URL of the topics feed to resolve
    #[arg(
        short,
        long,
        default_value = "https://news.yahoo.co.jp/rss/topics/top-picks.xml"
    )]
    pub feed_url: String,

    /// Output directory for the JSON digest file
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Maximum number of feed entries to resolve
    #[arg(short, long, default_value_t = 10)]
    pub max_items: usize,

    /// Optional path to config.yaml
    #[arg(short, long)]
    pub config: Option<String>,

    /// API key for the relevance-filter model
    #[arg(long, env = "FILTER_API_KEY")]
    pub filter_api_key: Option<String>,
}
