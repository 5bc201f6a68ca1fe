//! Tolerant normalization of FIRMS area CSV payloads.
//!
//! The feed is UTF-8 CSV with at least `latitude`, `longitude`, `acq_time`,
//! `frp`, and `confidence` columns (VIIRS adds more; extras are ignored).
//! A payload that lacks a required column, or a row whose coordinates or
//! time code are unusable, fails wholesale with `MalformedSchema` since
//! every downstream consumer needs those on every row. A malformed optional
//! field only nulls that field; the row itself is kept.

use serde::Serialize;
use tracing::debug;

use crate::errors::{FirmsWatchError, Result};

/// Detection quality category as encoded in the VIIRS feeds (`l`/`n`/`h`).
/// MODIS feeds carry numeric confidence instead; those values normalize to
/// `None` on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    #[serde(rename = "l")]
    Low,
    #[serde(rename = "n")]
    Nominal,
    #[serde(rename = "h")]
    High,
}

impl Confidence {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "l" | "low" => Some(Confidence::Low),
            "n" | "nominal" => Some(Confidence::Nominal),
            "h" | "high" => Some(Confidence::High),
            _ => None,
        }
    }
}

/// Whether the overpass that produced a detection was a day or night pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DayNight {
    #[serde(rename = "D")]
    Day,
    #[serde(rename = "N")]
    Night,
}

impl DayNight {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "D" => Some(DayNight::Day),
            "N" => Some(DayNight::Night),
            _ => None,
        }
    }
}

/// One normalized thermal-anomaly detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Raw acquisition time code, `HHMM` in UTC, `0..=2359`.
    pub acq_time: u32,
    /// First two characters of the zero-padded time code, `"00"..="23"`.
    pub hour_of_day: String,
    /// Fire Radiative Power in MW. `None` when the source value was absent
    /// or malformed.
    pub frp: Option<f64>,
    pub confidence: Option<Confidence>,
    pub daynight: Option<DayNight>,
}

/// Derives the hour bucket from a raw `HHMM` code: zero-pad to 4 digits,
/// take the first two. `7` becomes `"0007"` and thus `"00"`.
/// Callers must have validated `acq_time <= 2359`.
pub fn hour_of_day(acq_time: u32) -> String {
    format!("{acq_time:04}")[..2].to_string()
}

/// Parses a raw CSV payload into normalized records, preserving row order.
pub fn parse_hotspots(bytes: &[u8]) -> Result<Vec<HotspotRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = rdr.headers()?.clone();
    let col = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                FirmsWatchError::MalformedSchema(format!("missing required column '{name}'"))
            })
    };

    let i_lat = col("latitude")?;
    let i_lon = col("longitude")?;
    let i_time = col("acq_time")?;
    let i_frp = col("frp")?;
    let i_conf = col("confidence")?;
    let i_daynight = headers.iter().position(|h| h.eq_ignore_ascii_case("daynight"));

    let mut records = Vec::new();

    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        let line = i + 2; // 1-based, after the header row

        let latitude = parse_coordinate(row.get(i_lat), "latitude", line)?;
        let longitude = parse_coordinate(row.get(i_lon), "longitude", line)?;
        let acq_time = parse_acq_time(row.get(i_time), line)?;

        let frp = row.get(i_frp).and_then(|raw| parse_frp(raw, line));
        let confidence = row.get(i_conf).and_then(|raw| {
            let parsed = Confidence::parse(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                debug!(line, raw, "unrecognized confidence value, treating as absent");
            }
            parsed
        });
        let daynight = i_daynight
            .and_then(|idx| row.get(idx))
            .and_then(DayNight::parse);

        records.push(HotspotRecord {
            latitude,
            longitude,
            acq_time,
            hour_of_day: hour_of_day(acq_time),
            frp,
            confidence,
            daynight,
        });
    }

    Ok(records)
}

fn parse_coordinate(raw: Option<&str>, name: &str, line: usize) -> Result<f64> {
    let raw = raw.unwrap_or("");
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            FirmsWatchError::MalformedSchema(format!("line {line}: unusable {name} '{raw}'"))
        })
}

fn parse_acq_time(raw: Option<&str>, line: usize) -> Result<u32> {
    let raw = raw.unwrap_or("");
    raw.parse::<u32>()
        .ok()
        .filter(|t| *t <= 2359)
        .ok_or_else(|| {
            FirmsWatchError::MalformedSchema(format!("line {line}: unusable acq_time '{raw}'"))
        })
}

fn parse_frp(raw: &str, line: usize) -> Option<f64> {
    let parsed = raw.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0);
    if parsed.is_none() && !raw.trim().is_empty() {
        debug!(line, raw, "unusable frp value, treating as absent");
    }
    parsed
}
