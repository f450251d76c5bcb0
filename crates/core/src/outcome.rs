//! Structured stage results. Every pipeline stage reports through
//! [`StageOutcome`] instead of raising, so a failed stage is a value the
//! caller can inspect, log, and serialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome<T> {
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> StageOutcome<T> {
    pub fn ok(payload: T, confidence: f64) -> Self {
        Self {
            status: StageStatus::Ok,
            payload: Some(payload),
            confidence,
            error: None,
        }
    }

    /// Failure with zero confidence and no payload.
    pub fn failed(error: impl ToString) -> Self {
        Self {
            status: StageStatus::Error,
            payload: None,
            confidence: 0.0,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StageStatus::Ok
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }
}
