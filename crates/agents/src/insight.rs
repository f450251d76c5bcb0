//! Heuristic hypothesis generation over the data summary.

use crate::agent::{evidence, AgentKind, StageContext};
use crate::planner::InsightFocus;
use campaign_analytics::stats::safe_mean;
use campaign_core::types::{CampaignGroupSummary, DataSummary, Hypothesis, HypothesisKind};
use campaign_core::StageOutcome;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Relative ROAS movement at or above which the trend is called out with
/// higher confidence.
const ROAS_CHANGE_MATERIAL: f64 = 0.05;
/// Groups below this share of the global CTR with heavy delivery are fatigue
/// candidates.
pub const FATIGUE_CTR_RATIO: f64 = 0.7;
pub const FATIGUE_MIN_IMPRESSIONS: u64 = 1000;
const SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpAction {
    RequestMoreData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedQuery {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightPayload {
    pub hypotheses: Vec<Hypothesis>,
    pub avg_confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<FollowUpAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_queries: Vec<SuggestedQuery>,
}

/// Groups with low CTR despite heavy delivery.
pub fn fatigue_candidates(summary: &DataSummary) -> Vec<&CampaignGroupSummary> {
    let ceiling = summary.global.avg_ctr * FATIGUE_CTR_RATIO;
    summary
        .campaign_summaries
        .iter()
        .filter(|g| g.ctr < ceiling && g.impressions > FATIGUE_MIN_IMPRESSIONS)
        .collect()
}

pub struct InsightAgent {
    ctx: StageContext,
}

impl InsightAgent {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    pub fn run(
        &self,
        summary: Option<&DataSummary>,
        focus: InsightFocus,
    ) -> StageOutcome<InsightPayload> {
        let Some(summary) = summary else {
            self.ctx
                .warn(AgentKind::InsightAgent, "ERROR: Missing summary in inputs");
            return StageOutcome::failed("Missing summary in inputs");
        };

        self.ctx.info(
            AgentKind::InsightAgent,
            format!("Generating hypotheses from summary (focus: {focus:?})"),
        );
        let hypotheses = generate_hypotheses(summary);
        self.ctx.info(
            AgentKind::InsightAgent,
            format!("Generated {} hypotheses", hypotheses.len()),
        );

        let confidences: Vec<f64> = hypotheses.iter().map(|h| h.confidence).collect();
        let avg_confidence = safe_mean(&confidences);

        let mut payload = InsightPayload {
            hypotheses,
            avg_confidence,
            action: None,
            suggested_queries: Vec::new(),
        };
        if avg_confidence < self.ctx.config.confidence_min {
            payload.action = Some(FollowUpAction::RequestMoreData);
            payload.suggested_queries = vec![
                SuggestedQuery {
                    query: "Provide campaign-level daily CTR for the last 14 days".into(),
                },
                SuggestedQuery {
                    query: "Breakdown by audience_type and creative_type for low CTR campaigns"
                        .into(),
                },
            ];
        }

        StageOutcome::ok(payload, avg_confidence)
    }
}

pub fn generate_hypotheses(summary: &DataSummary) -> Vec<Hypothesis> {
    let mut hypotheses = Vec::new();
    let global = &summary.global;

    // ROAS trend, last point against first
    if let (Some(first), Some(last)) = (summary.trend.first(), summary.trend.last()) {
        let change = if summary.trend.len() < 2 || first.roas == 0.0 {
            0.0
        } else {
            (last.roas - first.roas) / first.roas.abs().max(1e-9)
        };
        let statement = if change < 0.0 {
            "ROAS has decreased over the observed period."
        } else {
            "ROAS is stable or increasing."
        };
        let confidence = if change.abs() >= ROAS_CHANGE_MATERIAL { 0.7 } else { 0.45 };
        hypotheses.push(Hypothesis {
            id: HypothesisKind::RoasTrend,
            statement: statement.to_string(),
            reasoning: format!(
                "Daily mean ROAS moved from {:.2} on {} to {:.2} on {} ({:+.1}%).",
                first.roas,
                first.date,
                last.roas,
                last.date,
                change * 100.0
            ),
            confidence,
            evidence: evidence(json!({
                "first_roas": first.roas,
                "last_roas": last.roas,
                "roas_change": change,
            })),
            evidence_needed: vec![
                "statistical_test_on_roas_last_vs_first_period".into(),
                "per_campaign_roas_trend".into(),
            ],
        });
    }

    let mut low_ctr: Vec<&str> = Vec::new();
    for name in &summary.low_ctr_campaigns {
        if !low_ctr.contains(&name.as_str()) {
            low_ctr.push(name);
        }
    }
    if !low_ctr.is_empty() {
        let sample: Vec<&str> = low_ctr.iter().copied().take(SAMPLE_SIZE).collect();
        hypotheses.push(Hypothesis {
            id: HypothesisKind::LowCtr,
            statement: format!(
                "Several campaigns show low CTR (bottom 25%): {}",
                sample.join(", ")
            ),
            reasoning: format!(
                "{} campaign group(s) sit at or below the 25th percentile of group CTR; the dataset average is {:.4}.",
                low_ctr.len(),
                global.avg_ctr
            ),
            confidence: 0.75,
            evidence: evidence(json!({
                "avg_ctr": global.avg_ctr,
                "low_ctr_campaigns_sample": sample,
            })),
            evidence_needed: vec![
                "per_campaign_creative_messages".into(),
                "audience_overlap_analysis".into(),
            ],
        });
    }

    if global.total_spend > 0.0 && global.total_revenue / (global.total_spend + 1e-9) < 1.0 {
        hypotheses.push(Hypothesis {
            id: HypothesisKind::SpendEfficiency,
            statement: "Spend has increased relative to revenue, indicating efficiency loss."
                .to_string(),
            reasoning: format!(
                "Total revenue {:.2} does not cover total spend {:.2}.",
                global.total_revenue, global.total_spend
            ),
            confidence: 0.6,
            evidence: evidence(json!({
                "total_spend": global.total_spend,
                "total_revenue": global.total_revenue,
                "avg_roas": global.avg_roas,
            })),
            evidence_needed: vec![
                "time_series_spend_vs_revenue".into(),
                "per_adset_conversion_rates".into(),
            ],
        });
    }

    let fatigued = fatigue_candidates(summary);
    if !fatigued.is_empty() {
        let sample: Vec<serde_json::Value> = fatigued
            .iter()
            .take(SAMPLE_SIZE)
            .map(|g| {
                json!({
                    "campaign": g.canonical_name,
                    "ctr": g.ctr,
                    "impressions": g.impressions,
                })
            })
            .collect();
        hypotheses.push(Hypothesis {
            id: HypothesisKind::AudienceFatigue,
            statement: "Some campaigns show low CTR despite high impressions, suggesting possible audience fatigue or frequency issues.".to_string(),
            reasoning: format!(
                "{} campaign group(s) have CTR below {:.0}% of the average with more than {} impressions.",
                fatigued.len(),
                FATIGUE_CTR_RATIO * 100.0,
                FATIGUE_MIN_IMPRESSIONS
            ),
            confidence: 0.6,
            evidence: evidence(json!({ "fatigue_candidates": sample })),
            evidence_needed: vec![
                "frequency_by_audience".into(),
                "audience_overlap_matrix".into(),
            ],
        });
    }

    if hypotheses.is_empty() {
        hypotheses.push(Hypothesis {
            id: HypothesisKind::NoSignal,
            statement: "No strong hypotheses could be generated from the provided summary."
                .to_string(),
            reasoning: "None of the trend, CTR, efficiency or fatigue checks fired.".to_string(),
            confidence: 0.2,
            evidence: Default::default(),
            evidence_needed: vec![
                "more_granular_time_series".into(),
                "creative_text_samples".into(),
            ],
        });
    }

    for h in &mut hypotheses {
        h.confidence = h.confidence.clamp(0.0, 1.0);
    }
    hypotheses
}
