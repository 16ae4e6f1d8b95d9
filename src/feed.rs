//! Topics feed retrieval and parsing.
//!
//! Parses the aggregator's syndication feed (RSS 2.0, with enough Atom
//! support to survive a format change) into an ordered list of
//! [`FeedEntry`] values. Only `title` and `link` are consumed per item.
//!
//! A feed that cannot be fetched or parsed yields an empty list. That is a
//! signaled "nothing to process" condition, not a fatal error: the caller
//! renders an empty digest instead of crashing.

use crate::fetcher::{Fetch, FetchResult};
use crate::models::FeedEntry;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{info, instrument, warn};
use url::Url;

/// Which child of the current item a text event belongs to.
enum Field {
    None,
    Title,
    Link,
}

/// Fetch and parse the feed at `url`.
///
/// Network failures, error statuses and unparseable documents all degrade to
/// an empty list.
#[instrument(level = "info", skip(fetcher), fields(%url))]
pub async fn fetch<F: Fetch>(fetcher: &F, url: &Url) -> Vec<FeedEntry> {
    let body = match fetcher.get(url).await {
        FetchResult::Body(body) => body,
        FetchResult::HttpError(status) => {
            warn!(status, "feed fetch answered with an error status");
            return Vec::new();
        }
        FetchResult::NetworkError(cause) => {
            warn!(%cause, "feed fetch failed");
            return Vec::new();
        }
    };

    let entries = parse_entries(&body);
    info!(count = entries.len(), "parsed feed entries");
    entries
}

/// Parse feed XML into entries, in document order.
///
/// Items missing a title or carrying an unparseable link are skipped.
/// Malformed XML ends the scan, keeping whatever parsed before the damage.
pub fn parse_entries(xml: &str) -> Vec<FeedEntry> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut in_item = false;
    let mut field = Field::None;
    let mut title = String::new();
    let mut link = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    in_item = true;
                    title.clear();
                    link.clear();
                    field = Field::None;
                }
                b"title" if in_item => field = Field::Title,
                b"link" if in_item => {
                    field = Field::Link;
                    // Atom carries the target as <link href="..">
                    if let Some(href) = attr_value(&e, b"href") {
                        link = href;
                    }
                }
                _ => field = Field::None,
            },
            Ok(Event::Empty(e)) if in_item && e.local_name().as_ref() == b"link" => {
                if let Some(href) = attr_value(&e, b"href") {
                    link = href;
                }
            }
            Ok(Event::Text(t)) if in_item => {
                if let Ok(text) = t.unescape() {
                    match field {
                        Field::Title => title.push_str(&text),
                        Field::Link => link.push_str(&text),
                        Field::None => {}
                    }
                }
            }
            Ok(Event::CData(t)) if in_item => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                match field {
                    Field::Title => title.push_str(&text),
                    Field::Link => link.push_str(&text),
                    Field::None => {}
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    in_item = false;
                    push_entry(&mut entries, &title, &link);
                }
                b"title" | b"link" => field = Field::None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "feed XML malformed; keeping entries parsed so far");
                break;
            }
            Ok(_) => {}
        }
    }

    entries
}

fn attr_value(e: &quick_xml::events::BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn push_entry(entries: &mut Vec<FeedEntry>, title: &str, link: &str) {
    let title = title.trim();
    if title.is_empty() {
        return;
    }
    match Url::parse(link.trim()) {
        Ok(link) => entries.push(FeedEntry {
            title: title.to_string(),
            link,
        }),
        Err(e) => warn!(%title, %link, error = %e, "skipping feed item with bad link"),
    }
}
