//! Bottleneck predicates.
//!
//! Two named rules so callers pick the one that fits: panels flag on score
//! alone, summary counting also accepts large relative overruns.

use crate::config::{BottleneckRule, Thresholds};

/// score >= bottleneck_score
pub fn is_bottleneck_strict(score: u8, thresholds: &Thresholds) -> bool {
    score >= thresholds.bottleneck_score
}

/// Strict rule OR delay% >= bottleneck_delay_percentage
pub fn is_bottleneck(score: u8, delay_percentage: f64, thresholds: &Thresholds) -> bool {
    is_bottleneck_strict(score, thresholds)
        || delay_percentage >= thresholds.bottleneck_delay_percentage
}

/// Apply whichever rule the configuration selects
pub fn is_bottleneck_by_rule(score: u8, delay_percentage: f64, thresholds: &Thresholds) -> bool {
    match thresholds.bottleneck_rule {
        BottleneckRule::ScoreOnly => is_bottleneck_strict(score, thresholds),
        BottleneckRule::ScoreOrDelay => is_bottleneck(score, delay_percentage, thresholds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_edge() {
        let t = Thresholds::default();
        assert!(!is_bottleneck_strict(59, &t));
        assert!(is_bottleneck_strict(60, &t));
    }

    #[test]
    fn test_combined_accepts_delay() {
        let t = Thresholds::default();
        assert!(is_bottleneck(25, 20.0, &t));
        assert!(!is_bottleneck(25, 19.9, &t));
        // Early finishes never qualify through the delay arm
        assert!(!is_bottleneck(25, -40.0, &t));
    }

    #[test]
    fn test_rule_selection() {
        let mut t = Thresholds::default();
        assert!(!is_bottleneck_by_rule(30, 35.0, &t));
        t.bottleneck_rule = BottleneckRule::ScoreOrDelay;
        assert!(is_bottleneck_by_rule(30, 35.0, &t));
    }
}
