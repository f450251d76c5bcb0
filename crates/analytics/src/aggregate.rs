//! Per-canonical-campaign aggregation, daily trend, and dataset totals.

use crate::stats::{quantile, safe_mean};
use campaign_canonicalizer::CanonicalIndex;
use campaign_core::types::{
    CampaignGroupSummary, CampaignRow, DataSummary, DateRange, GlobalSummary, TrendPoint,
};
use std::collections::BTreeMap;

/// Groups whose mean CTR is at or below this quantile of group CTRs are
/// reported as low-CTR.
pub const LOW_CTR_QUANTILE: f64 = 0.25;

#[derive(Default)]
struct Accumulator {
    spend: f64,
    revenue: f64,
    clicks: f64,
    impressions: f64,
    ctr: Vec<f64>,
    roas: Vec<f64>,
    rows: usize,
}

impl Accumulator {
    fn add(&mut self, row: &CampaignRow) {
        self.spend += row.spend.unwrap_or(0.0);
        self.revenue += row.revenue.unwrap_or(0.0);
        self.clicks += row.clicks.unwrap_or(0.0);
        self.impressions += row.impressions.unwrap_or(0.0);
        self.ctr.extend(row.ctr);
        self.roas.extend(row.roas);
        self.rows += 1;
    }
}

fn as_count(total: f64) -> u64 {
    total.round().max(0.0) as u64
}

/// Build the summary consumed by every downstream stage. `index` must have
/// been built from the same rows.
pub fn summarize(rows: &[CampaignRow], index: &CanonicalIndex) -> DataSummary {
    let campaign_summaries = summarize_groups(rows, index);
    let low_ctr_campaigns = low_ctr_groups(&campaign_summaries, rows, index);

    DataSummary {
        global: global_summary(rows),
        trend: daily_trend(rows),
        campaign_summaries,
        low_ctr_campaigns,
    }
}

/// Group rows by canonical name, ordered by canonical name.
pub fn summarize_groups(rows: &[CampaignRow], index: &CanonicalIndex) -> Vec<CampaignGroupSummary> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for row in rows {
        let canonical = index.canonical_of(row.campaign_name.as_deref());
        groups.entry(canonical).or_default().add(row);
    }

    groups
        .into_iter()
        .map(|(canonical_name, acc)| CampaignGroupSummary {
            display_label: index
                .display_label(&canonical_name)
                .unwrap_or_default()
                .to_string(),
            canonical_name,
            ctr: safe_mean(&acc.ctr),
            roas: safe_mean(&acc.roas),
            spend: acc.spend,
            revenue: acc.revenue,
            clicks: as_count(acc.clicks),
            impressions: as_count(acc.impressions),
            row_count: acc.rows,
        })
        .collect()
}

/// Canonical names of groups in the bottom CTR quartile. Groups without any
/// CTR observation take no part in the ranking.
fn low_ctr_groups(
    groups: &[CampaignGroupSummary],
    rows: &[CampaignRow],
    index: &CanonicalIndex,
) -> Vec<String> {
    let mut with_ctr: BTreeMap<String, bool> = BTreeMap::new();
    for row in rows {
        let canonical = index.canonical_of(row.campaign_name.as_deref());
        *with_ctr.entry(canonical).or_insert(false) |= row.ctr.is_some();
    }

    let ranked: Vec<&CampaignGroupSummary> = groups
        .iter()
        .filter(|g| with_ctr.get(&g.canonical_name).copied().unwrap_or(false))
        .collect();
    let ctrs: Vec<f64> = ranked.iter().map(|g| g.ctr).collect();
    let Some(threshold) = quantile(&ctrs, LOW_CTR_QUANTILE) else {
        return Vec::new();
    };

    ranked
        .into_iter()
        .filter(|g| g.ctr <= threshold)
        .map(|g| g.canonical_name.clone())
        .collect()
}

pub fn global_summary(rows: &[CampaignRow]) -> GlobalSummary {
    let mut acc = Accumulator::default();
    for row in rows {
        acc.add(row);
    }

    let dates = rows.iter().map(|r| r.date.as_str()).filter(|d| !d.is_empty());
    let date_range = DateRange {
        min: dates.clone().min().map(str::to_string),
        max: dates.max().map(str::to_string),
    };

    GlobalSummary {
        total_spend: acc.spend,
        total_revenue: acc.revenue,
        avg_ctr: safe_mean(&acc.ctr),
        avg_roas: safe_mean(&acc.roas),
        total_clicks: as_count(acc.clicks),
        total_impressions: as_count(acc.impressions),
        date_range,
    }
}

/// One point per distinct non-empty date, ascending. ISO-8601 dates order
/// correctly as strings.
pub fn daily_trend(rows: &[CampaignRow]) -> Vec<TrendPoint> {
    let mut days: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for row in rows.iter().filter(|r| !r.date.is_empty()) {
        days.entry(row.date.as_str()).or_default().add(row);
    }

    days.into_iter()
        .map(|(date, acc)| TrendPoint {
            date: date.to_string(),
            roas: safe_mean(&acc.roas),
            ctr: safe_mean(&acc.ctr),
            spend: acc.spend,
            clicks: as_count(acc.clicks),
            impressions: as_count(acc.impressions),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, date: &str, spend: f64, ctr: f64, roas: f64, clicks: f64, imps: f64) -> CampaignRow {
        CampaignRow {
            campaign_name: Some(name.to_string()),
            date: date.to_string(),
            spend: Some(spend),
            revenue: Some(spend * roas),
            ctr: Some(ctr),
            roas: Some(roas),
            clicks: Some(clicks),
            impressions: Some(imps),
            creative_message: None,
        }
    }

    fn index_for(rows: &[CampaignRow]) -> CanonicalIndex {
        CanonicalIndex::build(rows.iter().map(|r| r.campaign_name.as_deref()), 0.78)
    }

    #[test]
    fn test_variant_rows_sum_under_one_canonical() {
        let rows = vec![
            row("Launch Sale!!", "2025-01-01", 100.0, 0.02, 2.0, 20.0, 1000.0),
            row("la u nch sale", "2025-01-02", 50.0, 0.04, 1.0, 10.0, 250.0),
        ];
        let index = index_for(&rows);
        let groups = summarize_groups(&rows, &index);

        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.canonical_name, "launch sale");
        assert_eq!(g.display_label, "Launch Sale!!");
        assert_eq!(g.spend, 150.0);
        assert_eq!(g.revenue, 250.0);
        assert_eq!(g.clicks, 30);
        assert_eq!(g.impressions, 1250);
        assert!((g.ctr - 0.03).abs() < 1e-12);
        assert!((g.roas - 1.5).abs() < 1e-12);
        assert_eq!(g.row_count, 2);
    }

    #[test]
    fn test_similar_names_merge_under_frequent_canonical() {
        let rows = vec![
            row("Big Winter Boots Clearance Sale Event", "2025-01-01", 30.0, 0.01, 1.0, 3.0, 300.0),
            row("big winter boots clearance sale", "2025-01-02", 20.0, 0.02, 2.0, 4.0, 200.0),
            row("big winter boots clearance sale", "2025-01-03", 10.0, 0.06, 3.0, 5.0, 100.0),
            row("summer sandals", "2025-01-01", 5.0, 0.10, 4.0, 1.0, 10.0),
        ];
        let index = index_for(&rows);
        let groups = summarize_groups(&rows, &index);

        assert_eq!(groups.len(), 2);
        let g = &groups[0];
        assert_eq!(g.canonical_name, "big winter boots clearance sale");
        assert_eq!(g.display_label, "Big Winter Boots Clearance Sale Event");
        assert_eq!(g.row_count, 3);
        assert_eq!(g.spend, 60.0);
        assert_eq!(g.clicks, 12);
        assert_eq!(g.impressions, 600);
        assert!((g.ctr - 0.03).abs() < 1e-12);
        assert!((g.roas - 2.0).abs() < 1e-12);
        assert_eq!(groups[1].canonical_name, "summer sandals");
    }

    #[test]
    fn test_missing_values_skipped() {
        let mut sparse = row("Boots", "2025-01-01", 10.0, 0.5, 1.0, 1.0, 10.0);
        sparse.ctr = None;
        sparse.spend = None;
        let rows = vec![sparse, row("Boots", "2025-01-01", 20.0, 0.1, 3.0, 2.0, 20.0)];
        let summary = summarize(&rows, &index_for(&rows));

        let g = &summary.campaign_summaries[0];
        assert_eq!(g.spend, 20.0);
        assert!((g.ctr - 0.1).abs() < 1e-12);
        assert!((g.roas - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_low_ctr_bottom_quartile() {
        let rows = vec![
            row("alpha promo", "2025-01-01", 1.0, 0.01, 1.0, 1.0, 100.0),
            row("bravo deals", "2025-01-01", 1.0, 0.02, 1.0, 1.0, 100.0),
            row("charlie boots", "2025-01-01", 1.0, 0.03, 1.0, 1.0, 100.0),
            row("delta socks", "2025-01-01", 1.0, 0.04, 1.0, 1.0, 100.0),
            row("echo sandals", "2025-01-01", 1.0, 0.05, 1.0, 1.0, 100.0),
        ];
        let summary = summarize(&rows, &index_for(&rows));
        // 25th percentile of [.01 .. .05] is .02
        assert_eq!(summary.low_ctr_campaigns, vec!["alpha promo", "bravo deals"]);
    }

    #[test]
    fn test_groups_without_ctr_are_not_ranked() {
        let mut no_ctr = row("ghost campaign", "2025-01-01", 1.0, 0.0, 1.0, 0.0, 0.0);
        no_ctr.ctr = None;
        let rows = vec![no_ctr, row("winter boots", "2025-01-01", 1.0, 0.2, 1.0, 1.0, 5.0)];
        let summary = summarize(&rows, &index_for(&rows));
        assert_eq!(summary.low_ctr_campaigns, vec!["winter boots"]);
    }

    #[test]
    fn test_global_and_trend() {
        let rows = vec![
            row("a campaign", "2025-01-02", 10.0, 0.1, 2.0, 1.0, 10.0),
            row("b campaign", "2025-01-01", 30.0, 0.3, 4.0, 3.0, 30.0),
            row("b campaign", "2025-01-02", 20.0, 0.2, 1.0, 2.0, 20.0),
        ];
        let summary = summarize(&rows, &index_for(&rows));

        assert_eq!(summary.global.total_spend, 60.0);
        assert_eq!(summary.global.total_clicks, 6);
        assert!((summary.global.avg_ctr - 0.2).abs() < 1e-12);
        assert_eq!(summary.global.date_range.min.as_deref(), Some("2025-01-01"));
        assert_eq!(summary.global.date_range.max.as_deref(), Some("2025-01-02"));

        assert_eq!(summary.trend.len(), 2);
        assert_eq!(summary.trend[0].date, "2025-01-01");
        assert_eq!(summary.trend[0].roas, 4.0);
        assert_eq!(summary.trend[1].spend, 30.0);
        assert!((summary.trend[1].roas - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_dataset() {
        let summary = summarize(&[], &index_for(&[]));
        assert!(summary.campaign_summaries.is_empty());
        assert!(summary.low_ctr_campaigns.is_empty());
        assert!(summary.trend.is_empty());
        assert_eq!(summary.global.avg_ctr, 0.0);
        assert_eq!(summary.global.date_range, DateRange::default());
    }
}
