//! Utility functions for time classification, log truncation, and file
//! system checks.

use chrono::{Local, NaiveTime};
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Classify current time into morning, afternoon, or evening.
///
/// Used to name the digest edition. The boundaries are:
/// - **Morning**: 00:00 - 08:00
/// - **Afternoon**: 08:00 - 16:00
/// - **Evening**: 16:00 - 24:00
#[instrument]
pub fn time_of_day() -> String {
    let morning_low = NaiveTime::from_hms_opt(0, 00, 0).unwrap();
    let morning_high = NaiveTime::from_hms_opt(8, 00, 0).unwrap();
    let afternoon_low = NaiveTime::from_hms_opt(8, 00, 0).unwrap();
    let afternoon_high = NaiveTime::from_hms_opt(16, 00, 0).unwrap();

    let tod = Local::now().time();
    let which = if (tod >= morning_low) && (tod < morning_high) {
        "morning"
    } else if (tod >= afternoon_low) && (tod < afternoon_high) {
        "afternoon"
    } else {
        "evening"
    };
    tracing::debug!(%tod, %which, "Computed time_of_day");
    which.to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` characters with an ellipsis and a
/// byte count appended. Counting characters rather than bytes keeps the cut
/// off multibyte boundaries; article text here is mostly Japanese.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if missing, then probes it with a throwaway file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
