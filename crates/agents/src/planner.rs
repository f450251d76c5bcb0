//! Turns a free-text analysis query into an ordered task plan.

use crate::agent::{AgentKind, StageContext};
use campaign_core::StageOutcome;
use serde::{Deserialize, Serialize};

pub const PLAN_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightFocus {
    Roas,
    General,
}

/// Which campaign groups the creative stage writes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreativeFilter {
    LowCtr,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<InsightFocus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<CreativeFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub task_id: String,
    pub agent: AgentKind,
    /// Lower runs first.
    pub priority: u32,
    pub params: TaskParams,
}

impl PlannedTask {
    fn new(task_id: &str, agent: AgentKind, priority: u32, params: TaskParams) -> Self {
        Self {
            task_id: task_id.to_string(),
            agent,
            priority,
            params,
        }
    }
}

pub struct PlannerAgent {
    ctx: StageContext,
}

impl PlannerAgent {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    /// The plan shape is fixed; the query only decides the insight focus.
    pub fn run(&self, query: &str) -> StageOutcome<Vec<PlannedTask>> {
        self.ctx
            .info(AgentKind::Planner, format!("Received query: {query}"));

        let focus = if query.to_lowercase().contains("roas") {
            InsightFocus::Roas
        } else {
            InsightFocus::General
        };

        let tasks = vec![
            PlannedTask::new("load_data", AgentKind::DataAgent, 1, TaskParams::default()),
            PlannedTask::new(
                "generate_insights",
                AgentKind::InsightAgent,
                2,
                TaskParams {
                    focus: Some(focus),
                    ..TaskParams::default()
                },
            ),
            PlannedTask::new(
                "evaluate_insights",
                AgentKind::Evaluator,
                3,
                TaskParams::default(),
            ),
            PlannedTask::new(
                "generate_creatives",
                AgentKind::CreativeGenerator,
                4,
                TaskParams {
                    filter: Some(CreativeFilter::LowCtr),
                    ..TaskParams::default()
                },
            ),
        ];

        self.ctx.info(AgentKind::Planner, "Plan created successfully");
        StageOutcome::ok(tasks, PLAN_CONFIDENCE)
    }
}
