//! Output formatting and persistence for hotspot statistics.
//!
//! Supports pretty-printing, JSON serialization, CSV append of per-refresh
//! stats rows, and export of the normalized record table for a raw view.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::parser::HotspotRecord;
use crate::stats::HotspotStats;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs hotspot statistics using Rust's debug pretty-print format.
pub fn print_pretty(stats: &HotspotStats) {
    debug!("{:#?}", stats);
}

/// Logs hotspot statistics as pretty-printed JSON.
pub fn print_json(stats: &HotspotStats) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}

/// Flat projection of a snapshot for the CSV stats log. The hourly
/// histogram is packed into one `"HH:count HH:count"` column since CSV has
/// no nested rows.
#[derive(Serialize)]
struct StatsCsvRow<'a> {
    timestamp: DateTime<Utc>,
    source: Option<&'a str>,
    area: Option<&'a str>,
    total_count: usize,
    max_frp_mw: Option<f64>,
    mean_frp_mw: Option<f64>,
    high_confidence_count: usize,
    hourly_counts: String,
    error_type: Option<&'a str>,
    error_message: Option<&'a str>,
}

fn pack_hourly(hourly: &[(String, usize)]) -> String {
    hourly
        .iter()
        .map(|(hour, count)| format!("{hour}:{count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Appends a [`HotspotStats`] snapshot as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, stats: &HotspotStats) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(StatsCsvRow {
        timestamp: stats.timestamp,
        source: stats.source.as_deref(),
        area: stats.area.as_deref(),
        total_count: stats.total_count,
        max_frp_mw: stats.max_frp_mw,
        mean_frp_mw: stats.mean_frp_mw,
        high_confidence_count: stats.high_confidence_count,
        hourly_counts: pack_hourly(&stats.hourly_counts),
        error_type: stats.error_type.as_deref(),
        error_message: stats.error_message.as_deref(),
    })?;
    writer.flush()?;

    Ok(())
}

/// Writes the normalized record table to `path`, replacing any previous
/// contents. This is the raw-view surface consumers read: the feed columns
/// plus the derived `hour_of_day`.
pub fn write_table(path: &str, records: &[HotspotRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!(path, rows = records.len(), "Wrote record table");
    Ok(())
}
