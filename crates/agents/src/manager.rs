//! Pipeline manager — plans a query and runs every stage in priority order.

use crate::agent::{AgentKind, StageContext};
use crate::creative::CreativeGenerator;
use crate::data::{AnalyzedDataset, DataAgent};
use crate::evaluator::EvaluatorAgent;
use crate::insight::{InsightAgent, InsightPayload};
use crate::planner::{CreativeFilter, InsightFocus, PlannedTask, PlannerAgent};
use campaign_core::types::{CampaignCreatives, DataSummary, Evaluation, Hypothesis};
use campaign_core::StageStatus;
use std::time::Instant;
use uuid::Uuid;

const RUN_STAGE: &str = "run";

/// Everything one pipeline run produced. Stages that did not run or failed
/// leave their slot empty.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub query: String,
    pub status: StageStatus,
    pub error: Option<String>,
    pub tasks: Vec<PlannedTask>,
    pub dataset: Option<AnalyzedDataset>,
    pub insights: Option<InsightPayload>,
    pub evaluations: Vec<Evaluation>,
    pub creatives: Vec<CampaignCreatives>,
}

impl PipelineRun {
    fn new(query: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            query: query.to_string(),
            status: StageStatus::Ok,
            error: None,
            tasks: Vec::new(),
            dataset: None,
            insights: None,
            evaluations: Vec::new(),
            creatives: Vec::new(),
        }
    }

    fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = StageStatus::Error;
        self.error = Some(error.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == StageStatus::Ok
    }

    pub fn summary(&self) -> Option<&DataSummary> {
        self.dataset.as_ref().map(|d| &d.summary)
    }

    pub fn hypotheses(&self) -> &[Hypothesis] {
        self.insights
            .as_ref()
            .map(|p| p.hypotheses.as_slice())
            .unwrap_or_default()
    }
}

/// Owns one instance of every stage, all sharing the same context.
pub struct PipelineManager {
    ctx: StageContext,
    planner: PlannerAgent,
    data: DataAgent,
    insight: InsightAgent,
    evaluator: EvaluatorAgent,
    creative: CreativeGenerator,
}

impl PipelineManager {
    pub fn new(ctx: StageContext) -> Self {
        Self {
            planner: PlannerAgent::new(ctx.clone()),
            data: DataAgent::new(ctx.clone()),
            insight: InsightAgent::new(ctx.clone()),
            evaluator: EvaluatorAgent::new(ctx.clone()),
            creative: CreativeGenerator::new(ctx.clone()),
            ctx,
        }
    }

    pub fn run(&self, query: &str) -> PipelineRun {
        let started = Instant::now();
        let observer = self.ctx.observer();
        observer.info(RUN_STAGE, &format!("Starting pipeline for query: '{query}'"));

        let run = self.execute(PipelineRun::new(query));

        let status = if run.is_ok() { "ok" } else { "error" };
        metrics::counter!("pipeline.runs", "status" => status).increment(1);
        metrics::histogram!("pipeline.duration_seconds").record(started.elapsed().as_secs_f64());
        match &run.error {
            None => observer.info(RUN_STAGE, "Pipeline completed successfully."),
            Some(e) => observer.warn(RUN_STAGE, &format!("Pipeline failed: {e}")),
        }
        run
    }

    fn execute(&self, mut run: PipelineRun) -> PipelineRun {
        let observer = self.ctx.observer();

        let plan = self.planner.run(&run.query);
        let mut tasks = match plan.into_payload() {
            Some(tasks) if !tasks.is_empty() => tasks,
            _ => return run.fail("Planner could not generate tasks."),
        };
        tasks.sort_by_key(|t| t.priority);
        run.tasks = tasks.clone();

        for task in tasks {
            observer.info(
                RUN_STAGE,
                &format!("Executing task: {} with agent {}", task.task_id, task.agent),
            );
            match task.agent {
                AgentKind::DataAgent => {
                    let outcome = self.data.run();
                    let error = outcome.error.clone();
                    match outcome.into_payload() {
                        Some(dataset) => run.dataset = Some(dataset),
                        None => {
                            return run.fail(
                                error.unwrap_or_else(|| "Data stage produced no dataset".into()),
                            );
                        }
                    }
                }
                AgentKind::InsightAgent => {
                    let focus = task.params.focus.unwrap_or(InsightFocus::General);
                    run.insights = self.insight.run(run.summary(), focus).into_payload();
                }
                AgentKind::Evaluator => {
                    let summary = run.summary().cloned().unwrap_or_default();
                    run.evaluations = self
                        .evaluator
                        .run(run.hypotheses(), &summary)
                        .into_payload()
                        .unwrap_or_default();
                }
                AgentKind::CreativeGenerator => {
                    let filter = task.params.filter.unwrap_or(CreativeFilter::LowCtr);
                    run.creatives = self
                        .creative
                        .run(run.dataset.as_ref(), filter)
                        .into_payload()
                        .unwrap_or_default();
                }
                AgentKind::Planner => {
                    observer.warn(RUN_STAGE, &format!("Unknown agent: {}", task.agent));
                }
            }
        }
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::{AnalysisConfig, RecordingObserver};
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;

    fn manager(path: &Path) -> (PipelineManager, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::new());
        let mut config = AnalysisConfig {
            data_csv: path.to_path_buf(),
            ..AnalysisConfig::default()
        };
        config.creative.seed = Some(11);
        (
            PipelineManager::new(StageContext::new(config, observer.clone())),
            observer,
        )
    }

    #[test]
    fn test_full_run_threads_stage_outputs() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "campaign_name,date,spend,revenue,ctr,roas,clicks,impressions,creative_message"
        )
        .unwrap();
        writeln!(file, "Launch Sale!!,2025-01-01,100,300,0.01,3,10,1000,Fresh launch deals").unwrap();
        writeln!(file, "la u nch sale,2025-01-02,100,100,0.01,1,10,1000,Launch week only").unwrap();
        writeln!(file, "winter boots,2025-01-01,50,150,0.05,3,25,500,Warm boots").unwrap();
        writeln!(file, "winter boots,2025-01-02,50,100,0.06,2,30,500,Snow ready boots").unwrap();

        let (manager, observer) = manager(file.path());
        let run = manager.run("Why did ROAS drop?");

        assert!(run.is_ok(), "{:?}", run.error);
        assert_eq!(run.tasks.len(), 4);
        let summary = run.summary().unwrap();
        assert_eq!(summary.campaign_summaries.len(), 2);
        assert_eq!(summary.low_ctr_campaigns, vec!["launch sale"]);
        assert!(!run.hypotheses().is_empty());
        assert_eq!(run.evaluations.len(), run.hypotheses().len());
        assert_eq!(run.creatives[0].canonical_name, "launch sale");
        assert!(observer
            .messages_for("run")
            .iter()
            .any(|m| m == "Pipeline completed successfully."));
    }

    #[test]
    fn test_data_failure_stops_the_run() {
        let (manager, _) = manager(Path::new("/no/such/file.csv"));
        let run = manager.run("anything");

        assert!(!run.is_ok());
        assert!(run.error.is_some());
        assert!(run.dataset.is_none());
        assert!(run.insights.is_none());
        assert!(run.creatives.is_empty());
    }
}
