//! Numeric checks that confirm or reject each hypothesis.

use crate::agent::{evidence, AgentKind, StageContext};
use crate::insight::fatigue_candidates;
use campaign_analytics::stats::{pct_change, safe_mean, z_test_proportions};
use campaign_core::types::{DataSummary, Evaluation, Hypothesis, HypothesisKind};
use campaign_core::StageOutcome;
use serde_json::json;

/// Number of trend points in each comparison window.
const TREND_WINDOW: usize = 7;
const ROAS_DROP_THRESHOLD: f64 = -0.05;

pub struct EvaluatorAgent {
    ctx: StageContext,
}

impl EvaluatorAgent {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    pub fn run(
        &self,
        hypotheses: &[Hypothesis],
        summary: &DataSummary,
    ) -> StageOutcome<Vec<Evaluation>> {
        if hypotheses.is_empty() {
            self.ctx.warn(
                AgentKind::Evaluator,
                "ERROR: No hypotheses provided to EvaluatorAgent",
            );
            return StageOutcome::failed("No hypotheses provided to EvaluatorAgent");
        }

        self.ctx.info(
            AgentKind::Evaluator,
            format!("Evaluating {} hypotheses", hypotheses.len()),
        );
        let evaluations: Vec<Evaluation> = hypotheses
            .iter()
            .map(|h| evaluate(h, summary))
            .collect();

        let confidences: Vec<f64> = evaluations.iter().map(|e| e.confidence).collect();
        let confidence = safe_mean(&confidences);
        StageOutcome::ok(evaluations, confidence)
    }
}

/// Evaluate one hypothesis. Unknown or unsupported kinds come back
/// unvalidated with their original confidence.
pub fn evaluate(hypothesis: &Hypothesis, summary: &DataSummary) -> Evaluation {
    let base = hypothesis.confidence;
    let mut result = Evaluation {
        hypothesis_id: Some(hypothesis.id),
        statement: hypothesis.statement.clone(),
        validated: false,
        p_value: None,
        metrics: Default::default(),
        confidence: base,
    };
    let global = &summary.global;

    match hypothesis.id {
        HypothesisKind::RoasTrend if !summary.trend.is_empty() => {
            let window = TREND_WINDOW.min(summary.trend.len());
            let first: Vec<f64> = summary.trend[..window].iter().map(|p| p.roas).collect();
            let last: Vec<f64> = summary.trend[summary.trend.len() - window..]
                .iter()
                .map(|p| p.roas)
                .collect();
            let first_roas = safe_mean(&first);
            let last_roas = safe_mean(&last);
            let change = pct_change(first_roas, last_roas);

            result.metrics = evidence(json!({
                "first_period_roas": first_roas,
                "last_period_roas": last_roas,
                "pct_change": change,
            }));
            if change < ROAS_DROP_THRESHOLD {
                result.validated = true;
                result.confidence = (base + 0.15).min(1.0);
            }
        }
        HypothesisKind::LowCtr if !summary.low_ctr_campaigns.is_empty() => {
            result.validated = true;
            result.confidence = (base + 0.2).min(1.0);
            let mut metrics = json!({
                "low_ctr_campaigns": summary.low_ctr_campaigns,
            });
            if let Some((z, p)) = low_ctr_z_test(summary) {
                result.p_value = Some(p);
                metrics["z_score"] = json!(z);
            }
            result.metrics = evidence(metrics);
        }
        HypothesisKind::SpendEfficiency => {
            let roas_estimate = if global.total_spend > 0.0 {
                global.total_revenue / global.total_spend
            } else {
                0.0
            };
            result.metrics = evidence(json!({
                "spend": global.total_spend,
                "revenue": global.total_revenue,
                "roas": roas_estimate,
            }));
            if roas_estimate < 1.0 {
                result.validated = true;
                result.confidence = (base + 0.1).min(1.0);
            }
        }
        HypothesisKind::AudienceFatigue => {
            let fatigued: Vec<&str> = fatigue_candidates(summary)
                .into_iter()
                .map(|g| g.canonical_name.as_str())
                .collect();
            result.validated = !fatigued.is_empty();
            if result.validated {
                result.confidence = (base + 0.1).min(1.0);
            }
            result.metrics = evidence(json!({ "fatigue_candidates": fatigued }));
        }
        _ => {}
    }

    result
}

/// Pooled CTR of the low-CTR groups against every other group. `None` when
/// either side has no impressions.
fn low_ctr_z_test(summary: &DataSummary) -> Option<(f64, f64)> {
    let (mut low_clicks, mut low_imps, mut rest_clicks, mut rest_imps) = (0.0, 0.0, 0.0, 0.0);
    for group in &summary.campaign_summaries {
        let (clicks, imps) = if summary.low_ctr_campaigns.contains(&group.canonical_name) {
            (&mut low_clicks, &mut low_imps)
        } else {
            (&mut rest_clicks, &mut rest_imps)
        };
        *clicks += group.clicks as f64;
        *imps += group.impressions as f64;
    }
    if low_imps <= 0.0 || rest_imps <= 0.0 {
        return None;
    }
    Some(z_test_proportions(
        low_clicks / low_imps,
        low_imps,
        rest_clicks / rest_imps,
        rest_imps,
    ))
}
