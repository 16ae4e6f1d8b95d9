//! YAML configuration loading.
//!
//! Runtime configuration lives in an optional `config.yaml` with two
//! sections: the relevance-filter endpoint ([`FilterConfig`]) and the
//! extraction pipeline knobs ([`PipelineConfig`]). Every field carries a
//! serde default matching the reference pipeline's constants, so an empty or
//! absent file yields a fully working configuration (the API key can come
//! from the environment instead).
//!
//! ```yaml
//! filter:
//!   api_base: "https://generativelanguage.googleapis.com/v1beta/openai"
//!   model: "gemini-2.5-flash"
//! pipeline:
//!   max_pages: 5
//!   trim:
//!     lookback: 10
//! ```

use crate::fetcher::DEFAULT_TIMEOUT;
use crate::paginate::DEFAULT_MAX_PAGES;
use crate::trim::TrimRules;
use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing::info;

/// Label of the aggregator anchor that points at the external publisher.
pub const FULL_ARTICLE_LABEL: &str = "記事全文を読む";

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_filter_timeout() -> u64 {
    60
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_full_article_label() -> String {
    FULL_ARTICLE_LABEL.to_string()
}

/// Connection settings for the relevance-filter model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Bearer token; usually supplied via the environment rather than the file.
    #[serde(default)]
    pub api_key: String,
    /// Model identifier sent with each request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature for the filter call.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout for the model round-trip.
    #[serde(default = "default_filter_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_seconds: default_filter_timeout(),
        }
    }
}

/// Tuning knobs for the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Per-request timeout for page and feed fetches.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
    /// Upper bound on pages walked per external article.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Visible label of the "read full article" anchor.
    #[serde(default = "default_full_article_label")]
    pub full_article_label: String,
    /// Boilerplate marker literals and lookback window.
    #[serde(default)]
    pub trim: TrimRules,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: default_fetch_timeout(),
            max_pages: default_max_pages(),
            full_article_label: default_full_article_label(),
            trim: TrimRules::default(),
        }
    }
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&raw)?;
        info!(path, "Loaded configuration");
        Ok(config)
    }
}
