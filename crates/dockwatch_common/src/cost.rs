//! Cost impact of potential bottlenecks.
//!
//! cost/day = delay minutes × (hourly cost / 60) × orders affected, where
//! orders affected = floor(orders/day × min(delay% / 100, 1)).

use crate::analysis::RiskAnalysis;
use crate::config::CostConfig;
use crate::scoring::{round_half_up, round_one_decimal, saturate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostImpact {
    pub process_name: String,
    /// One decimal
    pub delay_minutes: f64,
    pub orders_affected: u32,
    pub cost_per_day: f64,
    pub cost_per_week: f64,
    pub cost_per_month: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostTotals {
    pub cost_per_day: f64,
    pub cost_per_week: f64,
    pub cost_per_month: f64,
    pub orders_affected: u32,
    pub bottleneck_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub impacts: Vec<CostImpact>,
    pub totals: CostTotals,
}

/// Impact of one analysis, regardless of its bottleneck flag
pub fn impact(analysis: &RiskAnalysis, config: &CostConfig) -> CostImpact {
    let delay_minutes = analysis.delay_time.max(0.0) / 60.0;
    let affected_share = (analysis.delay_percentage / 100.0).clamp(0.0, 1.0);
    let orders_affected = (f64::from(config.orders_per_day) * affected_share).floor() as u32;
    let cost_per_minute = config.hourly_operation_cost / 60.0;
    let cost_per_day = saturate(delay_minutes * cost_per_minute * f64::from(orders_affected));

    CostImpact {
        process_name: analysis.process_name.clone(),
        delay_minutes: saturate(round_one_decimal(delay_minutes)),
        orders_affected,
        cost_per_day: saturate(round_half_up(cost_per_day)),
        cost_per_week: saturate(round_half_up(cost_per_day * 7.0)),
        cost_per_month: saturate(round_half_up(cost_per_day * 30.0)),
    }
}

/// Impacts for every flagged bottleneck, in input order, with totals
pub fn estimate(analyses: &[RiskAnalysis], config: &CostConfig) -> CostReport {
    let impacts: Vec<CostImpact> = analyses
        .iter()
        .filter(|a| a.is_potential_bottleneck)
        .map(|a| impact(a, config))
        .collect();

    let totals = impacts.iter().fold(CostTotals::default(), |mut totals, i| {
        totals.cost_per_day = saturate(totals.cost_per_day + i.cost_per_day);
        totals.cost_per_week = saturate(totals.cost_per_week + i.cost_per_week);
        totals.cost_per_month = saturate(totals.cost_per_month + i.cost_per_month);
        totals.orders_affected = totals.orders_affected.saturating_add(i.orders_affected);
        totals.bottleneck_count += 1;
        totals
    });

    CostReport { impacts, totals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::Thresholds;
    use crate::observation::{ProcessObservation, ProcessStatus};

    fn run(name: &str, actual: f64, average: f64, status: ProcessStatus) -> RiskAnalysis {
        analyze(
            &ProcessObservation::new(name, actual, average, status),
            &Thresholds::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_dispatch_impact() {
        // 9 min late, 75% over: 750 orders at $500/h
        let report = estimate(
            &[run("Dispatch", 1260.0, 720.0, ProcessStatus::Critical)],
            &CostConfig::default(),
        );
        let dispatch = &report.impacts[0];
        assert_eq!(dispatch.delay_minutes, 9.0);
        assert_eq!(dispatch.orders_affected, 750);
        assert_eq!(dispatch.cost_per_day, 56_250.0);
        assert_eq!(dispatch.cost_per_week, 393_750.0);
        assert_eq!(dispatch.cost_per_month, 1_687_500.0);
        assert_eq!(report.totals.bottleneck_count, 1);
    }

    #[test]
    fn test_only_bottlenecks_counted() {
        let report = estimate(
            &[
                run("Receiving", 840.0, 900.0, ProcessStatus::Completed),
                run("Dispatch", 1260.0, 720.0, ProcessStatus::Critical),
            ],
            &CostConfig::default(),
        );
        assert_eq!(report.impacts.len(), 1);
        assert_eq!(report.impacts[0].process_name, "Dispatch");
    }

    #[test]
    fn test_orders_capped_at_daily_volume() {
        let analysis = run("Picking", 300.0, 100.0, ProcessStatus::Critical);
        assert_eq!(impact(&analysis, &CostConfig::default()).orders_affected, 1000);
    }

    #[test]
    fn test_early_finish_costs_nothing() {
        let analysis = run("Receiving", 840.0, 900.0, ProcessStatus::Completed);
        let impact = impact(&analysis, &CostConfig::default());
        assert_eq!(impact.orders_affected, 0);
        assert_eq!(impact.cost_per_day, 0.0);
    }

    #[test]
    fn test_order_totals_saturate() {
        let config = CostConfig {
            orders_per_day: u32::MAX,
            ..CostConfig::default()
        };
        let analyses: Vec<_> = ["Dispatch", "Packing", "Picking"]
            .iter()
            .map(|name| run(name, 1500.0, 600.0, ProcessStatus::Critical))
            .collect();

        let report = estimate(&analyses, &config);
        assert_eq!(report.impacts[0].orders_affected, u32::MAX);
        assert_eq!(report.totals.orders_affected, u32::MAX);
        assert_eq!(report.totals.bottleneck_count, 3);
        assert!(report.totals.cost_per_month.is_finite());
    }

    #[test]
    fn test_huge_delay_stays_finite() {
        let config = CostConfig {
            orders_per_day: u32::MAX,
            ..CostConfig::default()
        };
        let analysis = run("Dispatch", f64::MAX, 1.0, ProcessStatus::Critical);
        let report = estimate(&[analysis.clone(), analysis], &config);
        assert_eq!(report.impacts[0].cost_per_month, f64::MAX);
        assert_eq!(report.totals.cost_per_day, f64::MAX);
    }

    #[test]
    fn test_empty() {
        let report = estimate(&[], &CostConfig::default());
        assert!(report.impacts.is_empty());
        assert_eq!(report.totals, CostTotals::default());
    }
}
