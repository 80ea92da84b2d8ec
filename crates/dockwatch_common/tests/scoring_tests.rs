//! Golden tests for the risk scorer, classifier and bottleneck predicate.
//!
//! Tests verify:
//! - Reference scenarios produce pinned scores and levels
//! - Scores stay in [0, 100] for any finite input
//! - Monotonicity holds on each side of the baseline
//! - The classifier partitions the score range
//! - Analysis is idempotent

use dockwatch_common::analysis::analyze;
use dockwatch_common::bottleneck::{is_bottleneck, is_bottleneck_strict};
use dockwatch_common::config::Thresholds;
use dockwatch_common::observation::{ProcessObservation, ProcessStatus};
use dockwatch_common::scoring::{delay_percentage, percentage_points, score, score_breakdown};
use dockwatch_common::severity::{classify, RiskLevel};
use approx::assert_relative_eq;
use proptest::prelude::*;

fn any_status() -> impl Strategy<Value = ProcessStatus> {
    prop_oneof![
        Just(ProcessStatus::Completed),
        Just(ProcessStatus::InProgress),
        Just(ProcessStatus::Delayed),
        Just(ProcessStatus::Critical),
        Just(ProcessStatus::Failed),
        Just(ProcessStatus::Unknown),
    ]
}

/// GOLDEN: critical dispatch, 9 minutes over a 12 minute baseline
#[test]
fn golden_critical_dispatch() {
    let breakdown = score_breakdown(1260.0, 720.0, ProcessStatus::Critical);
    assert_relative_eq!(breakdown.delay_percentage, 75.0);
    assert_eq!(breakdown.percentage_points, 50.0);
    assert_eq!(breakdown.status_points, 40.0);
    assert_eq!(breakdown.duration_points, 3.0);
    assert_eq!(breakdown.total, 93);

    let analysis = analyze(
        &ProcessObservation::new("Dispatch", 1260.0, 720.0, ProcessStatus::Critical),
        &Thresholds::default(),
    )
    .unwrap();
    assert_eq!(analysis.risk_level, RiskLevel::Critical);
    assert!(analysis.is_potential_bottleneck);
}

/// GOLDEN: receiving finished a minute early
#[test]
fn golden_early_receiving() {
    let breakdown = score_breakdown(840.0, 900.0, ProcessStatus::Completed);
    assert_relative_eq!(breakdown.delay_percentage, -6.666_666, epsilon = 1e-5);
    assert_relative_eq!(breakdown.percentage_points, 6.666_666, epsilon = 1e-5);
    assert_eq!(breakdown.duration_points, 0.0);
    assert_eq!(breakdown.total, 7);

    let analysis = analyze(
        &ProcessObservation::new("Receiving", 840.0, 900.0, ProcessStatus::Completed),
        &Thresholds::default(),
    )
    .unwrap();
    assert_eq!(analysis.delay_percentage, -6.7);
    assert_eq!(analysis.risk_level, RiskLevel::Low);
    assert!(!analysis.is_potential_bottleneck);
}

/// GOLDEN: zero baseline is scored, not rejected
#[test]
fn golden_zero_baseline() {
    assert_eq!(delay_percentage(500.0, 0.0), 0.0);
    let analysis = analyze(
        &ProcessObservation::new("Storing", 500.0, 0.0, ProcessStatus::Delayed),
        &Thresholds::default(),
    )
    .unwrap();
    assert_eq!(analysis.delay_percentage, 0.0);
    assert_eq!(analysis.risk_score, 23);
}

#[test]
fn zero_delay_has_no_percentage_component() {
    assert_eq!(percentage_points(delay_percentage(600.0, 600.0)), 0.0);
    assert_eq!(score(600.0, 600.0, ProcessStatus::Completed), 0);
    assert_eq!(score(600.0, 600.0, ProcessStatus::Critical), 40);
}

#[test]
fn bottleneck_predicates() {
    let t = Thresholds::default();
    assert!(is_bottleneck_strict(60, &t));
    assert!(!is_bottleneck_strict(59, &t));
    assert!(is_bottleneck(10, 20.0, &t));
    assert!(!is_bottleneck(10, 19.9, &t));
}

proptest! {
    #[test]
    fn score_is_clamped(
        actual in 0.0f64..1.0e9,
        average in 0.0f64..1.0e9,
        status in any_status(),
    ) {
        let s = score(actual, average, status);
        prop_assert!(s <= 100);
    }

    #[test]
    fn score_monotone_above_baseline(
        average in 1.0f64..100_000.0,
        over_a in 0.0f64..500_000.0,
        over_b in 0.0f64..500_000.0,
        status in any_status(),
    ) {
        let (lo, hi) = if over_a <= over_b { (over_a, over_b) } else { (over_b, over_a) };
        prop_assert!(score(average + lo, average, status) <= score(average + hi, average, status));
    }

    #[test]
    fn score_monotone_below_baseline(
        average in 1.0f64..100_000.0,
        frac_a in 0.0f64..1.0,
        frac_b in 0.0f64..1.0,
        status in any_status(),
    ) {
        // Finishing earlier is a larger deviation, never a smaller score
        let (near, far) = if frac_a <= frac_b { (frac_a, frac_b) } else { (frac_b, frac_a) };
        let closer = average * (1.0 - near);
        let further = average * (1.0 - far);
        prop_assert!(score(further, average, status) >= score(closer, average, status));
    }

    #[test]
    fn classifier_partitions_scores(s in 0u8..=100) {
        let t = Thresholds::default();
        let level = classify(s, &t);
        let matches = [
            s >= t.critical,
            s >= t.high && s < t.critical,
            s >= t.medium && s < t.high,
            s < t.medium,
        ];
        prop_assert_eq!(matches.iter().filter(|m| **m).count(), 1);
        let expected = match matches.iter().position(|m| *m) {
            Some(0) => RiskLevel::Critical,
            Some(1) => RiskLevel::High,
            Some(2) => RiskLevel::Medium,
            _ => RiskLevel::Low,
        };
        prop_assert_eq!(level, expected);
    }

    #[test]
    fn classifier_is_monotone(a in 0u8..=100, b in 0u8..=100) {
        let t = Thresholds::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(classify(lo, &t) <= classify(hi, &t));
    }

    #[test]
    fn analysis_is_idempotent(
        actual in 0.0f64..100_000.0,
        average in 0.0f64..100_000.0,
        status in any_status(),
    ) {
        let t = Thresholds::default();
        let obs = ProcessObservation::new("Picking", actual, average, status);
        prop_assert_eq!(analyze(&obs, &t).unwrap(), analyze(&obs, &t).unwrap());
    }
}
