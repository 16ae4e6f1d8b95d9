//! The title-relevance filter collaborator.
//!
//! Extracted article text goes through an external language model that
//! removes everything unrelated to the entry's title (other headlines,
//! related-article teasers, ads, copyright lines the trimmer missed) and
//! condenses what remains. The model's reasoning is opaque; this module only
//! owns the call.
//!
//! # Architecture
//!
//! The module uses a trait-based design so the resolver never sees a
//! concrete client:
//! - [`FilterAsync`]: core trait for the title/full-text exchange
//! - [`ChatFilter`]: speaks an OpenAI-compatible chat-completions endpoint
//! - [`RetryFilter`]: decorator adding retry logic to any `FilterAsync`
//!
//! # Retry strategy
//!
//! - Maximum 5 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::config::FilterConfig;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Trait for the async title-relevance exchange.
///
/// Implementors take an entry title and the raw extracted text and return
/// the filtered excerpt. The trait is the injection seam: production wires
/// in a [`ChatFilter`] behind a [`RetryFilter`], tests wire in a stub.
pub trait FilterAsync {
    /// Reduce `full_text` to the content relevant to `title`.
    async fn filter(&self, title: &str, full_text: &str) -> Result<String, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`FilterAsync`]
/// implementation.
///
/// The delay between retries follows:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFilter<T> {
    /// The underlying filter client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryFilter<T>
where
    T: FilterAsync,
{
    /// Create a new retry wrapper around an existing [`FilterAsync`]
    /// implementation.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFilter")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FilterAsync for RetryFilter<T>
where
    T: FilterAsync,
{
    #[instrument(level = "info", skip_all)]
    async fn filter(&self, title: &str, full_text: &str) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.filter(title, full_text).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                            elapsed_ms_total = total_dt.as_millis() as u128,
                            error = %e,
                            "filter() exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "filter() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct ChatFilter {
    client: reqwest::Client,
    config: FilterConfig,
}

impl ChatFilter {
    /// Build a filter client from the loaded configuration.
    ///
    /// Every request is bounded by the configured timeout; the model call is
    /// the longest suspension point in the pipeline and must not hang a
    /// resolution task indefinitely.
    pub fn new(config: FilterConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    fn prompt(title: &str, full_text: &str) -> String {
        format!(
            "以下はニュース記事の全文です。その中から「{title}」というタイトルに関係ない部分を削除してください。\n\
             他のニュース見出し、関連情報、広告・著作権情報なども削除してください。\
             次に、残ったタイトルに関係ある内容を、要約して出力してください。\n\n\
             全文:\n{full_text}"
        )
    }
}

impl fmt::Debug for ChatFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatFilter")
            .field("api_base", &self.config.api_base)
            .field("model", &self.config.model)
            .finish()
    }
}

impl FilterAsync for ChatFilter {
    #[instrument(level = "info", skip_all, fields(model = %self.config.model))]
    async fn filter(&self, title: &str, full_text: &str) -> Result<String, Box<dyn Error>> {
        let prompt = Self::prompt(title, full_text);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.config.temperature,
        };

        let t0 = Instant::now();
        let endpoint = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ChatResponse = response.json().await?;
        let dt = t0.elapsed();

        match parsed.choices.into_iter().next() {
            Some(choice) => Ok(choice.message.content),
            None => {
                warn!(elapsed_ms = dt.as_millis() as u128, "model returned no choices");
                Err("filter response contained no choices".into())
            }
        }
    }
}
