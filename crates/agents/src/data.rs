//! Data stage: load the export, canonicalize campaign names, summarize.

use crate::agent::{AgentKind, StageContext};
use campaign_analytics::{load_rows, summarize};
use campaign_canonicalizer::CanonicalIndex;
use campaign_core::types::{CampaignRow, DataSummary};
use campaign_core::{CampaignResult, StageOutcome};
use std::path::Path;

pub const DATA_CONFIDENCE: f64 = 0.95;

/// Everything later stages need from the dataset: the decoded rows, the
/// canonical-name index built over them, and the summary.
#[derive(Debug, Clone)]
pub struct AnalyzedDataset {
    pub rows: Vec<CampaignRow>,
    pub index: CanonicalIndex,
    pub summary: DataSummary,
}

impl AnalyzedDataset {
    pub fn from_rows(rows: Vec<CampaignRow>, similarity_threshold: f64) -> Self {
        let index = CanonicalIndex::build(
            rows.iter().map(|r| r.campaign_name.as_deref()),
            similarity_threshold,
        );
        let summary = summarize(&rows, &index);
        Self {
            rows,
            index,
            summary,
        }
    }

    /// Canonical name of every row, in row order.
    pub fn row_canonicals(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| self.index.canonical_of(r.campaign_name.as_deref()))
            .collect()
    }
}

pub struct DataAgent {
    ctx: StageContext,
}

impl DataAgent {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    pub fn run(&self) -> StageOutcome<AnalyzedDataset> {
        let path = self.ctx.config.data_csv.clone();
        match self.analyze(&path) {
            Ok(dataset) => {
                self.ctx.info(
                    AgentKind::DataAgent,
                    format!(
                        "Summarized {} rows into {} canonical campaigns ({} name comparisons)",
                        dataset.rows.len(),
                        dataset.summary.campaign_summaries.len(),
                        dataset.index.cluster_map().comparisons()
                    ),
                );
                StageOutcome::ok(dataset, DATA_CONFIDENCE)
            }
            Err(e) => {
                self.ctx
                    .warn(AgentKind::DataAgent, format!("ERROR: {e}"));
                StageOutcome::failed(e)
            }
        }
    }

    fn analyze(&self, path: &Path) -> CampaignResult<AnalyzedDataset> {
        let rows = load_rows(path)?;
        self.ctx.info(
            AgentKind::DataAgent,
            format!("Loaded CSV at: {}", path.display()),
        );
        Ok(AnalyzedDataset::from_rows(
            rows,
            self.ctx.config.similarity_threshold,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::{AnalysisConfig, RecordingObserver};
    use std::io::Write;
    use std::sync::Arc;

    const HEADER: &str =
        "campaign_name,date,spend,revenue,ctr,roas,clicks,impressions,creative_message";

    fn agent_for(path: &Path) -> (DataAgent, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::new());
        let config = AnalysisConfig {
            data_csv: path.to_path_buf(),
            ..AnalysisConfig::default()
        };
        (
            DataAgent::new(StageContext::new(config, observer.clone())),
            observer,
        )
    }

    #[test]
    fn test_summarizes_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "Launch Sale!!,2025-01-01,100,200,0.02,2,20,1000,New drop").unwrap();
        writeln!(file, "la u nch sale,2025-01-02,50,50,0.04,1,10,250,New drop").unwrap();
        writeln!(file, "winter boots,2025-01-02,10,40,0.05,4,5,100,Stay warm").unwrap();

        let (agent, observer) = agent_for(file.path());
        let outcome = agent.run();

        assert!(outcome.is_ok());
        assert_eq!(outcome.confidence, DATA_CONFIDENCE);
        let dataset = outcome.into_payload().unwrap();
        assert_eq!(dataset.summary.campaign_summaries.len(), 2);
        assert_eq!(
            dataset.row_canonicals(),
            vec!["launch sale", "launch sale", "winter boots"]
        );
        assert!(!observer.messages_for("data_agent").is_empty());
    }

    #[test]
    fn test_missing_columns_fail_with_zero_confidence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "campaign_name,date,spend,revenue,clicks,impressions,creative_message").unwrap();
        writeln!(file, "A,2025-01-01,1,1,1,1,msg").unwrap();

        let (agent, _) = agent_for(file.path());
        let outcome = agent.run();

        assert!(!outcome.is_ok());
        assert_eq!(outcome.confidence, 0.0);
        assert!(outcome.payload().is_none());
        let error = outcome.error.unwrap();
        assert!(error.contains("ctr"));
        assert!(error.contains("roas"));
    }

    #[test]
    fn test_missing_file_fails() {
        let (agent, _) = agent_for(Path::new("/no/such/dataset.csv"));
        assert!(!agent.run().is_ok());
    }
}
