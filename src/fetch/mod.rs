//! HTTP acquisition of FIRMS area CSV data.
//!
//! [`AreaQuery`] carries the validated request parameters and builds the
//! request URL; [`fetch_csv`] performs exactly one GET against it. No retry
//! logic lives here: a failed attempt is surfaced immediately as a typed
//! error and the caller decides what to do with the refresh cycle.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::errors::{FirmsWatchError, Result};

/// Inclusive bounds of the day range the FIRMS area API serves per request.
pub const MIN_DAY_RANGE: u32 = 1;
pub const MAX_DAY_RANGE: u32 = 10;

/// Parameters of one FIRMS area request: credential, satellite source,
/// area of interest, and how many days back to query. Doubles as the cache
/// key, so distinct areas and sources get independent TTL windows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AreaQuery {
    pub map_key: String,
    pub source: String,
    pub area: String,
    pub day_range: u32,
}

impl AreaQuery {
    /// Builds a query, rejecting a `day_range` the provider would refuse.
    /// `source` and `area` are opaque here; the remote service validates them.
    pub fn new(map_key: &str, source: &str, area: &str, day_range: u32) -> Result<Self> {
        if !(MIN_DAY_RANGE..=MAX_DAY_RANGE).contains(&day_range) {
            return Err(FirmsWatchError::InvalidDayRange(day_range));
        }
        Ok(AreaQuery {
            map_key: map_key.to_string(),
            source: source.to_string(),
            area: area.to_string(),
            day_range,
        })
    }

    /// Request URL: `{base}/{map_key}/{source}/{area}/{day_range}`.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            base_url.trim_end_matches('/'),
            self.map_key,
            self.source,
            self.area,
            self.day_range
        )
    }
}

/// Issues one GET for the raw tabular payload.
///
/// Non-2xx statuses become [`FirmsWatchError::RemoteRejected`] with the
/// response body attached (FIRMS reports key problems as plain text).
/// Parsing is the caller's concern; the bytes are returned untouched.
pub async fn fetch_csv<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse()
            .map_err(|e| FirmsWatchError::InvalidUrl(format!("{e}")))?,
    );

    let resp = client.execute(req).await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FirmsWatchError::RemoteRejected {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| FirmsWatchError::NetworkFailure(e.to_string()))?;
    Ok(bytes.to_vec())
}
