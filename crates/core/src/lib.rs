pub mod config;
pub mod error;
pub mod observer;
pub mod outcome;
pub mod types;

pub use config::{AnalysisConfig, CreativeConfig};
pub use error::{CampaignError, CampaignResult};
pub use observer::{PipelineObserver, RecordingObserver, TracingObserver};
pub use outcome::{StageOutcome, StageStatus};
