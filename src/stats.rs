use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::parser::{Confidence, DayNight, HotspotRecord};

/// Aggregate snapshot over one normalized record set. Pure derivation:
/// recomputed wholesale on every refresh, never updated incrementally.
#[derive(Debug, Default, Serialize)]
pub struct HotspotStats {
    pub timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub area: Option<String>,

    pub total_count: usize,
    /// Maximum FRP over records that carry a value. `None` (not zero) when
    /// no record does, so "no maximum" stays distinguishable from "max 0".
    pub max_frp_mw: Option<f64>,
    pub mean_frp_mw: Option<f64>,
    pub high_confidence_count: usize,
    /// (hour, count) pairs sorted ascending by hour string; only hours that
    /// actually occur are present.
    pub hourly_counts: Vec<(String, usize)>,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl HotspotStats {
    pub fn from_records(records: &[HotspotRecord]) -> Self {
        let mut max_frp: Option<f64> = None;
        let mut frp_sum = 0.0;
        let mut frp_count = 0usize;
        let mut high_confidence = 0usize;
        let mut hours: BTreeMap<String, usize> = BTreeMap::new();

        for r in records {
            if let Some(frp) = r.frp {
                frp_sum += frp;
                frp_count += 1;
                max_frp = Some(max_frp.map_or(frp, |m| m.max(frp)));
            }
            if r.confidence == Some(Confidence::High) {
                high_confidence += 1;
            }
            *hours.entry(r.hour_of_day.clone()).or_default() += 1;
        }

        HotspotStats {
            timestamp: Utc::now(),
            total_count: records.len(),
            max_frp_mw: max_frp,
            mean_frp_mw: (frp_count > 0).then(|| frp_sum / frp_count as f64),
            high_confidence_count: high_confidence,
            hourly_counts: hours.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Create an error record with timestamp and error information
    pub fn from_error(error_type: &str, error_message: &str) -> Self {
        HotspotStats {
            timestamp: Utc::now(),
            error_type: Some(error_type.to_string()),
            error_message: Some(error_message.to_string()),
            ..Default::default()
        }
    }

    /// Set query metadata (source feed and area)
    pub fn with_query_info(mut self, source: &str, area: &str) -> Self {
        self.source = Some(source.to_string());
        self.area = Some(area.to_string());
        self
    }
}

/// Applies the operator's intensity and day/night filters to a record set.
/// `min_frp = Some(t)` keeps records with a known FRP of at least `t`
/// (records without a value cannot pass a threshold); `None` keeps all.
pub fn filter_records(
    records: &[HotspotRecord],
    min_frp: Option<f64>,
    daynight: Option<DayNight>,
) -> Vec<HotspotRecord> {
    records
        .iter()
        .filter(|r| match min_frp {
            Some(t) => r.frp.is_some_and(|v| v >= t),
            None => true,
        })
        .filter(|r| match daynight {
            Some(dn) => r.daynight == Some(dn),
            None => true,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::hour_of_day;

    fn rec(acq_time: u32, frp: Option<f64>, confidence: Option<Confidence>) -> HotspotRecord {
        HotspotRecord {
            latitude: 36.5,
            longitude: -121.0,
            acq_time,
            hour_of_day: hour_of_day(acq_time),
            frp,
            confidence,
            daynight: None,
        }
    }

    #[test]
    fn test_empty_record_set() {
        let stats = HotspotStats::from_records(&[]);

        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.max_frp_mw, None);
        assert_eq!(stats.mean_frp_mw, None);
        assert_eq!(stats.high_confidence_count, 0);
        assert!(stats.hourly_counts.is_empty());
    }

    #[test]
    fn test_max_frp_ignores_absent_values() {
        let records = vec![
            rec(100, Some(1.2), None),
            rec(200, None, None),
            rec(300, Some(5.8), None),
            rec(400, Some(3.0), None),
        ];
        let stats = HotspotStats::from_records(&records);

        assert_eq!(stats.max_frp_mw, Some(5.8));
        let mean = stats.mean_frp_mw.unwrap();
        assert!((mean - 10.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_absent_frp_yields_no_max() {
        let records = vec![rec(100, None, None), rec(200, None, None)];
        let stats = HotspotStats::from_records(&records);

        // "no maximum" must not collapse into "maximum is 0"
        assert_eq!(stats.max_frp_mw, None);
        assert_eq!(stats.mean_frp_mw, None);
        assert_eq!(stats.total_count, 2);
    }

    #[test]
    fn test_high_confidence_counts_exact_category_only() {
        let records = vec![
            rec(100, None, Some(Confidence::High)),
            rec(200, None, Some(Confidence::Low)),
            rec(300, None, Some(Confidence::High)),
            rec(400, None, Some(Confidence::Nominal)),
            rec(500, None, None),
        ];
        let stats = HotspotStats::from_records(&records);

        assert_eq!(stats.high_confidence_count, 2);
    }

    #[test]
    fn test_hourly_counts_sorted_and_sparse() {
        let records = vec![
            rec(315, None, None),  // "03"
            rec(350, None, None),  // "03"
            rec(145, None, None),  // "01"
            rec(1450, None, None), // "14"
        ];
        let stats = HotspotStats::from_records(&records);

        assert_eq!(
            stats.hourly_counts,
            vec![
                ("01".to_string(), 1),
                ("03".to_string(), 2),
                ("14".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_from_error() {
        let stats = HotspotStats::from_error("remote_rejected", "HTTP 403");

        assert_eq!(stats.error_type.as_deref(), Some("remote_rejected"));
        assert_eq!(stats.error_message.as_deref(), Some("HTTP 403"));
        assert_eq!(stats.total_count, 0);
    }

    #[test]
    fn test_with_query_info() {
        let stats = HotspotStats::from_records(&[]).with_query_info("VIIRS_SNPP_NRT", "world");

        assert_eq!(stats.source.as_deref(), Some("VIIRS_SNPP_NRT"));
        assert_eq!(stats.area.as_deref(), Some("world"));
    }

    #[test]
    fn test_filter_records_by_min_frp() {
        let records = vec![
            rec(100, Some(0.5), None),
            rec(200, Some(12.0), None),
            rec(300, None, None),
        ];

        let filtered = filter_records(&records, Some(1.0), None);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].frp, Some(12.0));

        // no threshold keeps rows without an FRP value
        let unfiltered = filter_records(&records, None, None);
        assert_eq!(unfiltered.len(), 3);
    }

    #[test]
    fn test_filter_records_by_daynight() {
        let mut day = rec(100, None, None);
        day.daynight = Some(DayNight::Day);
        let mut night = rec(200, None, None);
        night.daynight = Some(DayNight::Night);
        let unknown = rec(300, None, None);

        let records = vec![day, night, unknown];
        let filtered = filter_records(&records, None, Some(DayNight::Night));

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].acq_time, 200);
    }
}
