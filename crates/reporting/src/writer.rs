//! Writes the three run artifacts into the reports directory.

use crate::report_builder::{render_markdown, CreativesReport, InsightsReport};
use campaign_agents::PipelineRun;
use campaign_core::{CampaignResult, PipelineObserver};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INSIGHTS_FILE: &str = "insights.json";
pub const CREATIVES_FILE: &str = "creatives.json";
pub const MARKDOWN_FILE: &str = "report.md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub insights: PathBuf,
    pub creatives: PathBuf,
    pub markdown: PathBuf,
}

pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `insights.json`, `creatives.json` and `report.md`, creating the
    /// directory when needed. Failed runs are written too.
    pub fn write_all(
        &self,
        run: &PipelineRun,
        min_confidence: f64,
        observer: &dyn PipelineObserver,
    ) -> CampaignResult<ReportPaths> {
        fs::create_dir_all(&self.dir)?;

        let insights = InsightsReport::from_run(run, min_confidence, observer);
        let creatives = CreativesReport::from_run(run);

        let paths = ReportPaths {
            insights: self.dir.join(INSIGHTS_FILE),
            creatives: self.dir.join(CREATIVES_FILE),
            markdown: self.dir.join(MARKDOWN_FILE),
        };
        write_json(&paths.insights, &insights)?;
        write_json(&paths.creatives, &creatives)?;
        fs::write(&paths.markdown, render_markdown(&insights))?;

        debug!(dir = %self.dir.display(), run_id = %run.run_id, "Reports written");
        Ok(paths)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> CampaignResult<()> {
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body)?;
    Ok(())
}
