use std::collections::BTreeSet;
use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Dataset missing required columns: {}", join_names(.0))]
    MissingColumns(BTreeSet<String>),

    #[error("Malformed value {value:?} in column '{column}' at row {row}")]
    MalformedValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CampaignError {
    /// Whether the error comes from the shape or content of the dataset
    /// rather than from the environment.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            CampaignError::MissingColumns(_) | CampaignError::MalformedValue { .. }
        )
    }
}

fn join_names(names: &BTreeSet<String>) -> String {
    names.iter().cloned().collect::<Vec<_>>().join(", ")
}
