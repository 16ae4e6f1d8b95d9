//! JSON digest output.
//!
//! Serializes the resolved digest to a date/edition-keyed file for the web
//! layer to serve.
//!
//! # Evening edge case
//!
//! If an "evening" run finishes just after midnight, it uses yesterday's
//! date so the edition stays grouped with the correct day's news.

use crate::models::NewsDigest;
use chrono::{Duration, Local, NaiveTime};
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`NewsDigest`] to `{json_output_dir}/{date}/{time_of_day}.json`.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_digest(
    digest: &NewsDigest,
    json_output_dir: &str,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string(digest)?;

    let midnight = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
    let now = Local::now().time();
    let yesterday = Local::now().date_naive() - Duration::days(1);

    let after_midnight_evening = digest.time_of_day == "evening" && now >= midnight;
    let full_json_dir = if after_midnight_evening {
        format!("{}/{}", json_output_dir, yesterday)
    } else {
        format!("{}/{}", json_output_dir, digest.local_date)
    };

    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = format!("{}/{}.json", full_json_dir, digest.time_of_day);

    info!(path = %output_json_filename, "Writing JSON");
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, "Wrote digest JSON file");

    Ok(())
}
