//! Analysis stages of the campaign insights pipeline and the manager that
//! runs them in planned order.

pub mod agent;
pub mod creative;
pub mod data;
pub mod evaluator;
pub mod insight;
pub mod manager;
pub mod planner;
pub mod terms;

pub use agent::{AgentKind, StageContext};
pub use creative::CreativeGenerator;
pub use data::{AnalyzedDataset, DataAgent};
pub use evaluator::EvaluatorAgent;
pub use insight::{InsightAgent, InsightPayload};
pub use manager::{PipelineManager, PipelineRun};
pub use planner::{PlannedTask, PlannerAgent};
