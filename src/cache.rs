//! TTL memoization of the fetch+parse step.
//!
//! One [`FetchCache`] lives per process, owned by the refresh loop and
//! passed by reference, never an ambient global. Entries are keyed by the full
//! [`AreaQuery`] tuple, so distinct areas and sources age out independently.
//! Failures are never cached: a failed refresh leaves the map untouched and
//! the next call goes back to the network.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::errors::Result;
use crate::fetch::{AreaQuery, HttpClient, fetch_csv};
use crate::parser::{HotspotRecord, parse_hotspots};

/// Default validity window of a cached record set, matching the feed's
/// near-real-time refresh cadence.
pub const DEFAULT_TTL_SECS: u64 = 600;

struct CacheEntry {
    fetched_at: DateTime<Utc>,
    records: Vec<HotspotRecord>,
}

pub struct FetchCache {
    ttl: Duration,
    entries: HashMap<AreaQuery, CacheEntry>,
}

impl FetchCache {
    pub fn new(ttl_secs: u64) -> Self {
        FetchCache {
            ttl: Duration::seconds(ttl_secs as i64),
            entries: HashMap::new(),
        }
    }

    /// Returns the cached record set for `query` while it is fresh;
    /// otherwise fetches and parses, storing the result on success.
    ///
    /// On failure the error is returned as-is and nothing is stored. An
    /// expired entry stays in the map but is never served, so the caller
    /// always gets either fresh data or a typed error to surface.
    pub async fn get_or_fetch<C: HttpClient>(
        &mut self,
        client: &C,
        base_url: &str,
        query: &AreaQuery,
    ) -> Result<Vec<HotspotRecord>> {
        if let Some(entry) = self.entries.get(query) {
            let age = Utc::now() - entry.fetched_at;
            if age < self.ttl {
                debug!(
                    area = %query.area,
                    source = %query.source,
                    age_secs = age.num_seconds(),
                    "serving cached records"
                );
                return Ok(entry.records.clone());
            }
        }

        let bytes = fetch_csv(client, &query.url(base_url)).await?;
        let records = parse_hotspots(&bytes)?;

        debug!(
            area = %query.area,
            source = %query.source,
            record_count = records.len(),
            "caching fresh records"
        );
        self.entries.insert(
            query.clone(),
            CacheEntry {
                fetched_at: Utc::now(),
                records: records.clone(),
            },
        );
        Ok(records)
    }
}
