//! Plain-text risk report for consoles and logs.

use crate::analysis::RiskAnalysis;
use crate::severity::RiskLevel;
use crate::summary::summarize;

const BOTTLENECK_MARKER: &str = "⚠️";

/// Render totals, distribution, bottleneck list and per-process detail
pub fn format_risk_report(analyses: &[RiskAnalysis]) -> String {
    let summary = summarize(analyses);
    let mut report = String::from("\n=== Bottleneck Risk Analysis ===\n\n");

    report.push_str(&format!("Total Processes: {}\n", summary.total_processes));
    report.push_str(&format!("Average Risk Score: {}/100\n", summary.average_risk_score));
    report.push_str(&format!("Potential Bottlenecks: {}\n", summary.bottleneck_count));
    report.push_str(&format!("Total Delay: {:.1}s\n", summary.total_delay));
    report.push_str(&format!("Most Problematic: {}\n\n", summary.most_problematic));

    report.push_str("=== Risk Distribution ===\n");
    for level in RiskLevel::ALL {
        report.push_str(&format!(
            "{} {}: {}\n",
            level.marker(),
            level,
            summary.risk_distribution.count(level)
        ));
    }
    report.push('\n');

    if !summary.bottlenecks.is_empty() {
        report.push_str("=== Identified Bottlenecks ===\n");
        for (index, name) in summary.bottlenecks.iter().enumerate() {
            report.push_str(&format!("{}. {}\n", index + 1, name));
        }
        report.push('\n');
    }

    report.push_str("=== Detailed Analysis ===\n");
    if analyses.is_empty() {
        report.push_str("(no processes)\n");
    }
    for (index, analysis) in analyses.iter().enumerate() {
        let icon = if analysis.is_potential_bottleneck {
            format!("{} ", BOTTLENECK_MARKER)
        } else {
            "  ".to_string()
        };
        report.push_str(&format!("{}{}. {}\n", icon, index + 1, analysis.process_name));
        report.push_str(&format!(
            "   Risk Score: {}/100 ({})\n",
            analysis.risk_score, analysis.risk_level
        ));
        report.push_str(&format!("   Status: {}\n", analysis.status));
        report.push_str(&format!("   Delay: {:.1}%\n", analysis.delay_percentage));
        report.push_str(&format!(
            "   Actual: {:.1}s vs Average: {:.1}s\n",
            analysis.actual_duration, analysis.average_duration
        ));
        if analysis.is_potential_bottleneck {
            report.push_str(&format!("   {}  POTENTIAL BOTTLENECK DETECTED\n", BOTTLENECK_MARKER));
        }
        if let Some(message) = &analysis.message {
            report.push_str(&format!("   Insight: {}\n", message));
        }
        report.push('\n');
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_well_formed() {
        let report = format_risk_report(&[]);
        assert!(report.contains("Total Processes: 0"));
        assert!(report.contains("Average Risk Score: 0/100"));
        assert!(report.contains("Most Problematic: None"));
        assert!(report.contains("🟢 Low: 0"));
        assert!(!report.contains("Identified Bottlenecks"));
        assert!(report.contains("(no processes)"));
    }
}
