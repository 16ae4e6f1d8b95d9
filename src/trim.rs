//! Footer boilerplate truncation.
//!
//! External publisher pages end with a block of legal text: a copyright
//! line, reproduction-prohibited notices, and assorted footer paragraphs
//! that precede them. [`TrimRules::trim`] scans the paragraph list backward
//! for the last marker paragraph and truncates the list a fixed number of
//! paragraphs before it.
//!
//! The lookback window is a blunt, over-inclusive heuristic: footer blocks
//! often start several paragraphs before the literal marker, so cutting an
//! extra ten paragraphs trades occasional loss of real trailing content for
//! reliably removing the boilerplate. That trade-off is intentional.
//!
//! The marker literals and the lookback count are aggregator/locale-specific
//! values carried over from the reference pipeline; they are configurable
//! rather than generalized because no documented rationale exists for them.

use serde::{Deserialize, Serialize};

/// Paragraphs dropped before the marker, in addition to the marker itself
/// and everything after it.
pub const DEFAULT_LOOKBACK: usize = 10;

fn default_lookback() -> usize {
    DEFAULT_LOOKBACK
}

fn default_copyright_prefixes() -> Vec<String> {
    vec!["Copyright".to_string(), "Copyright ©".to_string()]
}

fn default_reprint_suffixes() -> Vec<String> {
    vec![
        "無断転載を禁じます".to_string(),
        "無断転載を禁じます。".to_string(),
    ]
}

/// Marker literals and lookback window for boilerplate truncation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrimRules {
    /// A paragraph starting with any of these is a marker.
    #[serde(default = "default_copyright_prefixes")]
    pub copyright_prefixes: Vec<String>,
    /// A paragraph ending with any of these is a marker.
    #[serde(default = "default_reprint_suffixes")]
    pub reprint_suffixes: Vec<String>,
    /// Paragraphs dropped before the marker as a safety margin.
    #[serde(default = "default_lookback")]
    pub lookback: usize,
}

impl Default for TrimRules {
    fn default() -> Self {
        Self {
            copyright_prefixes: default_copyright_prefixes(),
            reprint_suffixes: default_reprint_suffixes(),
            lookback: default_lookback(),
        }
    }
}

impl TrimRules {
    /// Truncate `paragraphs` before the last boilerplate marker.
    ///
    /// The result is always a prefix of the input: with a marker at index
    /// `i` the list is cut to `max(i - lookback, 0)` entries; without one it
    /// is returned unchanged. The input is expected to hold trimmed,
    /// non-empty paragraphs, so empty fragments never count toward the
    /// lookback window.
    pub fn trim(&self, mut paragraphs: Vec<String>) -> Vec<String> {
        if let Some(marker) = paragraphs.iter().rposition(|p| self.is_marker(p)) {
            paragraphs.truncate(marker.saturating_sub(self.lookback));
        }
        paragraphs
    }

    fn is_marker(&self, text: &str) -> bool {
        self.copyright_prefixes
            .iter()
            .any(|prefix| text.starts_with(prefix.as_str()))
            || self
                .reprint_suffixes
                .iter()
                .any(|suffix| text.ends_with(suffix.as_str()))
    }
}
