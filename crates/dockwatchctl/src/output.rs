//! Output formatting for terminal display
//!
//! Renderers return strings so commands and tests share them.

use dockwatch_common::analysis::RiskAnalysis;
use dockwatch_common::cost::CostReport;
use dockwatch_common::enrich::{GeneratedInsight, MessageSource};
use dockwatch_common::insight::InsightTier;
use dockwatch_common::scoring::ScoreBreakdown;
use dockwatch_common::severity::RiskLevel;
use dockwatch_common::summary::AggregateSummary;
use owo_colors::OwoColorize;
use std::fmt::Write;

pub const SEPARATOR: &str = "----------------------------------------";

pub fn colored_level(level: RiskLevel) -> String {
    match level {
        RiskLevel::Critical => level.as_str().bright_red().bold().to_string(),
        RiskLevel::High => level.as_str().red().to_string(),
        RiskLevel::Medium => level.as_str().yellow().to_string(),
        RiskLevel::Low => level.as_str().green().to_string(),
    }
}

/// Component-by-component view of one score
pub fn render_breakdown(
    breakdown: &ScoreBreakdown,
    level: RiskLevel,
    strict_bottleneck: bool,
    relaxed_bottleneck: bool,
    tier: InsightTier,
    message: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Risk Score Breakdown".bold());
    let _ = writeln!(out, "{}", SEPARATOR.dimmed());
    let _ = writeln!(out, "  Delay:            {:.1}%", breakdown.delay_percentage);
    let _ = writeln!(out, "  Percentage pts:   {:.2}", breakdown.percentage_points);
    let _ = writeln!(out, "  Status pts:       {:.0}", breakdown.status_points);
    let _ = writeln!(out, "  Duration pts:     {:.0}", breakdown.duration_points);
    let _ = writeln!(out, "{}", SEPARATOR.dimmed());
    let _ = writeln!(out, "  Score:            {}/100", breakdown.total.bold());
    let _ = writeln!(out, "  Level:            {} {}", level.marker(), colored_level(level));
    let _ = writeln!(out, "  Bottleneck:       {}", yes_no(strict_bottleneck));
    let _ = writeln!(out, "  Bottleneck (20%): {}", yes_no(relaxed_bottleneck));
    let _ = writeln!(out, "  Insight tier:     {}", tier);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", message);
    out
}

fn yes_no(flag: bool) -> String {
    if flag {
        "yes".bright_red().to_string()
    } else {
        "no".green().to_string()
    }
}

/// One line per analysis, worst first as given
pub fn render_table(analyses: &[RiskAnalysis]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:>6} {:<9} {:>8} {:<12}",
        "PROCESS", "SCORE", "LEVEL", "DELAY", "STATUS"
    );
    for analysis in analyses {
        let flag = if analysis.is_potential_bottleneck { " *" } else { "" };
        let _ = writeln!(
            out,
            "{:<24} {:>6} {:<9} {:>7.1}% {:<12}{}",
            analysis.process_name,
            analysis.risk_score,
            analysis.risk_level.as_str(),
            analysis.delay_percentage,
            analysis.status.as_str(),
            flag.bright_red()
        );
    }
    out
}

pub fn render_summary(summary: &AggregateSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", SEPARATOR.dimmed());
    let _ = writeln!(
        out,
        "{} processes, average risk {}/100, {} potential bottleneck(s)",
        summary.total_processes, summary.average_risk_score, summary.bottleneck_count
    );
    let _ = writeln!(out, "Most problematic: {}", summary.most_problematic.bold());
    out
}

pub fn render_insights(insights: &[GeneratedInsight]) -> String {
    let mut out = String::new();
    for insight in insights {
        let source = match insight.source {
            MessageSource::Enriched => "[enriched]".cyan().to_string(),
            MessageSource::Fallback => "[rule]".dimmed().to_string(),
        };
        let _ = writeln!(out, "{} {}", source, insight.message);
    }
    out
}

pub fn render_cost(report: &CostReport) -> String {
    let mut out = String::new();
    if report.impacts.is_empty() {
        let _ = writeln!(out, "No bottlenecks detected.");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<24} {:>9} {:>8} {:>12} {:>14}",
        "PROCESS", "DELAY", "ORDERS", "PER DAY", "PER MONTH"
    );
    for impact in &report.impacts {
        let _ = writeln!(
            out,
            "{:<24} {:>7.1}m {:>8} {:>12} {:>14}",
            impact.process_name,
            impact.delay_minutes,
            impact.orders_affected,
            format!("${:.0}", impact.cost_per_day),
            format!("${:.0}", impact.cost_per_month)
        );
    }
    let _ = writeln!(out, "{}", SEPARATOR.dimmed());
    let _ = writeln!(
        out,
        "Total: ${:.0}/day, ${:.0}/week, ${:.0}/month across {} bottleneck(s)",
        report.totals.cost_per_day,
        report.totals.cost_per_week,
        report.totals.cost_per_month,
        report.totals.bottleneck_count
    );
    out
}

/// Display an error
pub fn display_error(message: &str) {
    eprintln!();
    eprintln!("[ERROR] {}", message.red());
    eprintln!();
}

/// Display a warning
pub fn display_warning(message: &str) {
    eprintln!("[WARN] {}", message.yellow());
}
