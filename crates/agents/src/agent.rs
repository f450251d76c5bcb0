//! Shared plumbing for the analysis stages: stage identities and the
//! context every stage is constructed with.

use campaign_core::types::Evidence;
use campaign_core::{AnalysisConfig, PipelineObserver};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The stage a planned task is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Planner,
    DataAgent,
    InsightAgent,
    Evaluator,
    CreativeGenerator,
}

impl AgentKind {
    pub fn name(&self) -> &'static str {
        match self {
            AgentKind::Planner => "planner",
            AgentKind::DataAgent => "data_agent",
            AgentKind::InsightAgent => "insight_agent",
            AgentKind::Evaluator => "evaluator",
            AgentKind::CreativeGenerator => "creative_generator",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration and observer handed to every stage at construction.
#[derive(Clone)]
pub struct StageContext {
    pub config: Arc<AnalysisConfig>,
    observer: Arc<dyn PipelineObserver>,
}

impl StageContext {
    pub fn new(config: AnalysisConfig, observer: Arc<dyn PipelineObserver>) -> Self {
        Self {
            config: Arc::new(config),
            observer,
        }
    }

    pub fn observer(&self) -> Arc<dyn PipelineObserver> {
        self.observer.clone()
    }

    pub(crate) fn info(&self, agent: AgentKind, message: impl AsRef<str>) {
        self.observer.info(agent.name(), message.as_ref());
    }

    pub(crate) fn warn(&self, agent: AgentKind, message: impl AsRef<str>) {
        self.observer.warn(agent.name(), message.as_ref());
    }
}

/// Unwrap a `json!` object literal into an evidence map.
pub(crate) fn evidence(value: serde_json::Value) -> Evidence {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Evidence::new(),
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
