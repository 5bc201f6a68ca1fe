use firms_watch::parser::{Confidence, DayNight, parse_hotspots};
use firms_watch::stats::{HotspotStats, filter_records};

#[test]
fn test_full_pipeline() {
    let bytes = include_bytes!("fixtures/sample_viirs.csv");
    let records = parse_hotspots(bytes).expect("Failed to parse fixture");
    let stats = HotspotStats::from_records(&records);

    assert_eq!(records.len(), 10);
    assert_eq!(stats.total_count, 10);

    // one row has an empty frp; the row survives without a value
    assert_eq!(records.iter().filter(|r| r.frp.is_none()).count(), 1);
    assert_eq!(stats.max_frp_mw, Some(22.06));
    assert_eq!(stats.high_confidence_count, 4);

    // hours present in the fixture, ascending, no zero-fill
    assert_eq!(
        stats.hourly_counts,
        vec![
            ("01".to_string(), 3),
            ("09".to_string(), 2),
            ("11".to_string(), 3),
            ("17".to_string(), 2),
        ]
    );
}

#[test]
fn test_pipeline_with_operator_filters() {
    let bytes = include_bytes!("fixtures/sample_viirs.csv");
    let records = parse_hotspots(bytes).unwrap();

    let night = filter_records(&records, None, Some(DayNight::Night));
    assert_eq!(night.len(), 3);
    assert!(night.iter().all(|r| r.hour_of_day == "01"));

    let intense = filter_records(&records, Some(10.0), None);
    assert_eq!(intense.len(), 3);
    assert!(
        intense
            .iter()
            .all(|r| r.frp.is_some_and(|v| v >= 10.0))
    );

    let stats = HotspotStats::from_records(&intense);
    assert_eq!(stats.total_count, 3);
    assert_eq!(stats.max_frp_mw, Some(22.06));
    assert_eq!(
        intense
            .iter()
            .filter(|r| r.confidence == Some(Confidence::High))
            .count(),
        3
    );
}
