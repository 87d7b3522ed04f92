//! Property-based tests for the scoring engine
//!
//! These tests verify invariants that should hold for all batches:
//! - AQI stays in [0, 1]
//! - Tags partition every column
//! - Scoring is bit-for-bit deterministic
//! - Quartile ties resolve to the extreme tags
//! - The HIGH AQI tag is exactly "AQI >= Q3"
//! - Raising an in-band blur value keeps its ambiguity at the nearest boundary distance

use aqimap::scoring::{ambiguity, compute_quantiles, score_batch, tag, EngineConfig};
use aqimap::{Metric, MetricRecord, Tag};
use proptest::prelude::*;

/// Metric value in a realistic range, with a small alphabet to force ties
fn metric_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        0.0f64..5000.0,
        (0u8..8).prop_map(|v| v as f64 * 10.0),
    ]
}

fn batch(max_len: usize) -> impl Strategy<Value = Vec<MetricRecord>> {
    prop::collection::vec(
        (metric_value(), metric_value(), metric_value(), metric_value()),
        1..max_len,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (b, br, c, e))| MetricRecord::new(format!("img_{i}"), b, br, c, e))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_aqi_is_within_unit_interval(records in batch(40)) {
        let scored = score_batch(records, &EngineConfig::default()).unwrap();
        for image in &scored.images {
            prop_assert!((0.0..=1.0).contains(&image.aqi), "AQI {} out of range", image.aqi);
            for n in image.normalized {
                prop_assert!((0.0..=1.0).contains(&n));
            }
        }
    }

    #[test]
    fn prop_tags_partition_every_column(records in batch(40)) {
        let n = records.len();
        let scored = score_batch(records, &EngineConfig::default()).unwrap();
        let summary = scored.summary();

        for metric in Metric::ALL {
            prop_assert_eq!(summary.metric_tags[&metric].total(), n);
        }
        prop_assert_eq!(summary.aqi_tags.total(), n);
    }

    #[test]
    fn prop_scoring_is_idempotent(records in batch(30)) {
        let first = score_batch(records.clone(), &EngineConfig::default()).unwrap();
        let second = score_batch(records, &EngineConfig::default()).unwrap();

        for (a, b) in first.images.iter().zip(&second.images) {
            prop_assert_eq!(a.aqi.to_bits(), b.aqi.to_bits());
            prop_assert_eq!(
                a.acquisition_ambiguity.to_bits(),
                b.acquisition_ambiguity.to_bits()
            );
            prop_assert_eq!(a.tags, b.tags);
            prop_assert_eq!(a.flags, b.flags);
        }
        prop_assert_eq!(first.stats, second.stats);
    }

    #[test]
    fn prop_high_aqi_tag_iff_at_or_above_q3(records in batch(40)) {
        let scored = score_batch(records, &EngineConfig::default()).unwrap();
        let q = scored.stats.aqi_quartiles;

        for image in &scored.images {
            // LOW wins when Q1 == Q3 and the value sits on both boundaries
            let expected_high = image.aqi >= q.q3 && image.aqi > q.q1;
            prop_assert_eq!(image.aqi_tag == Tag::High, expected_high);
        }
    }

    #[test]
    fn prop_output_order_matches_input(records in batch(30)) {
        let ids: Vec<String> = records.iter().map(|r| r.image_id.clone()).collect();
        let scored = score_batch(records, &EngineConfig::default()).unwrap();
        let scored_ids: Vec<&str> = scored.images.iter().map(|i| i.image_id()).collect();
        prop_assert_eq!(scored_ids, ids.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn prop_quartile_ties_resolve_to_extremes(values in prop::collection::vec(metric_value(), 1..50)) {
        let q = compute_quantiles(&values).unwrap();
        prop_assert!(q.q1 <= q.q3);
        prop_assert_eq!(tag(q.q1, q), Tag::Low);
        if q.q3 > q.q1 {
            prop_assert_eq!(tag(q.q3, q), Tag::High);
        }
    }

    #[test]
    fn prop_in_band_ambiguity_is_nearest_boundary_distance(
        values in prop::collection::vec(metric_value(), 2..50),
        t in 0.0f64..=1.0,
    ) {
        let q = compute_quantiles(&values).unwrap();
        let v = q.q1 + t * (q.q3 - q.q1);
        let a = ambiguity(v, q);

        prop_assert!(a >= 0.0);
        prop_assert!(a <= (v - q.q1).min(q.q3 - v) + 1e-9);
        prop_assert!(a >= (v - q.q1).min(q.q3 - v) - 1e-9);
    }

    #[test]
    fn prop_raising_in_band_blur_keeps_boundary_distance(
        records in batch(40),
        t in 0.0f64..1.0,
    ) {
        prop_assume!(records.len() >= 3);
        let before = score_batch(records.clone(), &EngineConfig::default()).unwrap();
        let q = before.stats.quartiles(Metric::Blur);

        // Lower median: always inside [Q1, Q3]
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by(|&a, &b| records[a].blur.total_cmp(&records[b].blur));
        let i = order[(records.len() - 1) / 2];

        let mut raised = records;
        raised[i].blur += t * (q.q3 - raised[i].blur);
        let v = raised[i].blur;

        let after = score_batch(raised, &EngineConfig::default()).unwrap();
        let q = after.stats.quartiles(Metric::Blur);
        prop_assume!(q.q1 <= v && v <= q.q3);

        let nearest = (v - q.q1).min(q.q3 - v);
        prop_assert!(
            after.images[i].ambiguity(Metric::Blur) >= nearest - 1e-9,
            "ambiguity {} below boundary distance {}",
            after.images[i].ambiguity(Metric::Blur),
            nearest
        );
    }

    #[test]
    fn prop_extreme_and_ambiguous_implies_both(records in batch(40)) {
        let scored = score_batch(records, &EngineConfig::default()).unwrap();
        for image in &scored.images {
            prop_assert_eq!(
                image.flags.high_ambiguity,
                image.acquisition_ambiguity >= scored.stats.ambiguity_q3
            );
            prop_assert_eq!(
                image.flags.extreme_and_ambiguous,
                image.aqi_tag.is_extreme() && image.flags.high_ambiguity
            );
        }
    }
}
