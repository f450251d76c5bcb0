//! Observability seam for pipeline stages.
//!
//! Stages receive an `Arc<dyn PipelineObserver>` at construction and report
//! progress through it. [`TracingObserver`] forwards to `tracing`;
//! [`RecordingObserver`] keeps events in memory for assertions.

use parking_lot::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedEvent {
    pub level: ObservedLevel,
    pub stage: String,
    pub message: String,
}

pub trait PipelineObserver: Send + Sync {
    fn info(&self, stage: &str, message: &str);

    fn warn(&self, stage: &str, message: &str);
}

/// Emits every event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn info(&self, stage: &str, message: &str) {
        info!(agent = %stage, "{}", message);
    }

    fn warn(&self, stage: &str, message: &str) {
        warn!(agent = %stage, "{}", message);
    }
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().clone()
    }

    pub fn messages_for(&self, stage: &str) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.stage == stage)
            .map(|e| e.message.clone())
            .collect()
    }

    fn push(&self, level: ObservedLevel, stage: &str, message: &str) {
        self.events.lock().push(ObservedEvent {
            level,
            stage: stage.to_string(),
            message: message.to_string(),
        });
    }
}

impl PipelineObserver for RecordingObserver {
    fn info(&self, stage: &str, message: &str) {
        self.push(ObservedLevel::Info, stage, message);
    }

    fn warn(&self, stage: &str, message: &str) {
        self.push(ObservedLevel::Warn, stage, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.info("data_agent", "loaded");
        observer.warn("evaluator", "dropped");
        observer.info("data_agent", "summarized");

        let events = observer.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].level, ObservedLevel::Warn);
        assert_eq!(
            observer.messages_for("data_agent"),
            vec!["loaded".to_string(), "summarized".to_string()]
        );
    }
}
