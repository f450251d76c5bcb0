//! Report builder — turns a finished pipeline run into the insights and
//! creatives JSON payloads and the human-readable markdown report.

use crate::merge::{merge_validated, ValidatedInsight};
use campaign_agents::PipelineRun;
use campaign_core::types::{CampaignCreatives, DataSummary, Evaluation, Hypothesis};
use campaign_core::{PipelineObserver, StageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use uuid::Uuid;

// ─── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsReport {
    pub query: String,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub status: StageStatus,
    pub summary: Option<DataSummary>,
    pub validated_insights: Vec<ValidatedInsight>,
    pub all_raw_hypotheses: Vec<Hypothesis>,
    pub all_raw_evaluations: Vec<Evaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativesReport {
    pub query: String,
    pub run_id: Uuid,
    pub creatives: Vec<CampaignCreatives>,
}

// ─── Builders ───────────────────────────────────────────────────────────────

impl InsightsReport {
    /// Only evaluations at or above `min_confidence` become validated
    /// insights; every raw hypothesis and evaluation is kept alongside.
    pub fn from_run(
        run: &PipelineRun,
        min_confidence: f64,
        observer: &dyn PipelineObserver,
    ) -> Self {
        let hypotheses = run.hypotheses().to_vec();
        let validated_insights =
            merge_validated(&hypotheses, &run.evaluations, min_confidence, observer);

        Self {
            query: run.query.clone(),
            run_id: run.run_id,
            generated_at: Utc::now(),
            status: run.status,
            summary: run.summary().cloned(),
            validated_insights,
            all_raw_hypotheses: hypotheses,
            all_raw_evaluations: run.evaluations.clone(),
            error: run.error.clone(),
        }
    }
}

impl CreativesReport {
    pub fn from_run(run: &PipelineRun) -> Self {
        Self {
            query: run.query.clone(),
            run_id: run.run_id,
            creatives: run.creatives.clone(),
        }
    }
}

pub fn render_markdown(report: &InsightsReport) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# Campaign Performance Analysis\n");
    let _ = writeln!(md, "### Query: {}\n", report.query);

    if let Some(error) = &report.error {
        let _ = writeln!(md, "## Run Failed\n");
        let _ = writeln!(md, "{error}\n");
    }

    let _ = writeln!(md, "## Key Insights (Validated)\n");
    if report.validated_insights.is_empty() {
        let _ = writeln!(md, "No high-confidence insights found.\n");
    }
    for item in &report.validated_insights {
        let reasoning = if item.hypothesis.reasoning.is_empty() {
            "<no reasoning provided>"
        } else {
            item.hypothesis.reasoning.as_str()
        };
        let _ = writeln!(md, "- **{}**", item.hypothesis.statement);
        let _ = writeln!(md, "  - *Reasoning:* {reasoning}");
        let _ = writeln!(
            md,
            "  - *Confidence:* {:.2} (Validated by Evaluator)\n",
            item.evaluation.confidence
        );
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_agents::{AnalyzedDataset, InsightPayload};
    use campaign_core::types::{CampaignRow, HypothesisKind};
    use campaign_core::RecordingObserver;

    fn hypothesis(id: HypothesisKind, statement: &str, reasoning: &str) -> Hypothesis {
        Hypothesis {
            id,
            statement: statement.to_string(),
            reasoning: reasoning.to_string(),
            confidence: 0.7,
            evidence: Default::default(),
            evidence_needed: Vec::new(),
        }
    }

    fn evaluation(id: HypothesisKind, confidence: f64) -> Evaluation {
        Evaluation {
            hypothesis_id: Some(id),
            statement: String::new(),
            validated: true,
            p_value: None,
            metrics: Default::default(),
            confidence,
        }
    }

    fn sample_run() -> PipelineRun {
        let rows = vec![CampaignRow {
            campaign_name: Some("Winter Boots".into()),
            date: "2025-01-01".into(),
            spend: Some(10.0),
            ..CampaignRow::default()
        }];
        PipelineRun {
            run_id: Uuid::nil(),
            query: "Why did ROAS drop?".into(),
            status: StageStatus::Ok,
            error: None,
            tasks: Vec::new(),
            dataset: Some(AnalyzedDataset::from_rows(rows, 0.78)),
            insights: Some(InsightPayload {
                hypotheses: vec![
                    hypothesis(HypothesisKind::RoasTrend, "ROAS fell", "Daily ROAS dropped."),
                    hypothesis(HypothesisKind::LowCtr, "CTR is low", ""),
                ],
                avg_confidence: 0.7,
                action: None,
                suggested_queries: Vec::new(),
            }),
            evaluations: vec![
                evaluation(HypothesisKind::RoasTrend, 0.85),
                evaluation(HypothesisKind::LowCtr, 0.4),
            ],
            creatives: Vec::new(),
        }
    }

    #[test]
    fn test_insights_report_keeps_raw_and_validated() {
        let run = sample_run();
        let report = InsightsReport::from_run(&run, 0.6, &RecordingObserver::new());

        assert_eq!(report.validated_insights.len(), 1);
        assert_eq!(report.all_raw_hypotheses.len(), 2);
        assert_eq!(report.all_raw_evaluations.len(), 2);
        assert_eq!(
            report.summary.as_ref().unwrap().campaign_summaries[0].canonical_name,
            "winter boots"
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["validated_insights"][0]["hypothesis"]["id"], "h_roas_trend");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_markdown_lists_validated_insights() {
        let report = InsightsReport::from_run(&sample_run(), 0.6, &RecordingObserver::new());
        let md = render_markdown(&report);

        assert!(md.starts_with("# Campaign Performance Analysis"));
        assert!(md.contains("### Query: Why did ROAS drop?"));
        assert!(md.contains("- **ROAS fell**"));
        assert!(md.contains("*Reasoning:* Daily ROAS dropped."));
        assert!(md.contains("*Confidence:* 0.85 (Validated by Evaluator)"));
        assert!(!md.contains("CTR is low"));
    }

    #[test]
    fn test_failed_run_report() {
        let mut run = sample_run();
        run.status = StageStatus::Error;
        run.error = Some("Dataset missing required columns: ctr".into());
        run.dataset = None;
        run.insights = None;
        run.evaluations.clear();

        let report = InsightsReport::from_run(&run, 0.6, &RecordingObserver::new());
        assert!(report.summary.is_none());
        let md = render_markdown(&report);
        assert!(md.contains("## Run Failed"));
        assert!(md.contains("No high-confidence insights found."));

        let creatives = CreativesReport::from_run(&run);
        assert!(creatives.creatives.is_empty());
        assert_eq!(creatives.query, run.query);
    }
}
