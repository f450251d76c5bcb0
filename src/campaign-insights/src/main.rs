//! Campaign Insights — canonicalizes noisy campaign exports, explains
//! performance shifts, and drafts creative copy for weak campaigns.

use campaign_agents::{PipelineManager, StageContext};
use campaign_core::{AnalysisConfig, TracingObserver};
use campaign_reporting::ReportWriter;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "campaign-insights")]
#[command(about = "Analyze ad campaign performance and draft creative improvements")]
#[command(version)]
struct Cli {
    /// Free-text analysis query, e.g. "Why did ROAS drop last week?"
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Config file (YAML or TOML)
    #[arg(long, default_value = "config/config.yaml")]
    config: PathBuf,

    /// Campaign CSV export (overrides config)
    #[arg(long, env = "CAMPAIGN_INSIGHTS__DATA_CSV")]
    data_csv: Option<PathBuf>,

    /// Output directory for reports (overrides config)
    #[arg(long, env = "CAMPAIGN_INSIGHTS__REPORTS_DIR")]
    reports_dir: Option<PathBuf>,

    /// Campaign-name similarity threshold (overrides config)
    #[arg(long, env = "CAMPAIGN_INSIGHTS__SIMILARITY_THRESHOLD")]
    similarity_threshold: Option<f64>,

    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campaign_insights=info,campaign_agents=info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// A missing config file falls back to defaults; a present file that does
/// not parse aborts the run.
fn load_config(cli: &Cli) -> anyhow::Result<AnalysisConfig> {
    if !cli.config.exists() {
        warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }
    let mut config = AnalysisConfig::load(Some(&cli.config))
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    if let Some(path) = &cli.data_csv {
        config.data_csv = path.clone();
    }
    if let Some(dir) = &cli.reports_dir {
        config.reports_dir = dir.clone();
    }
    if let Some(threshold) = cli.similarity_threshold {
        config.similarity_threshold = threshold;
    }
    Ok(config)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let query = cli.query.join(" ");
    let config = load_config(&cli)?;
    info!(
        data_csv = %config.data_csv.display(),
        reports_dir = %config.reports_dir.display(),
        similarity_threshold = config.similarity_threshold,
        "Configuration loaded"
    );

    let observer = Arc::new(TracingObserver);
    let writer = ReportWriter::new(config.reports_dir.clone());
    let min_confidence = config.confidence_min;

    let manager = PipelineManager::new(StageContext::new(config, observer.clone()));
    let run = manager.run(&query);

    let paths = writer.write_all(&run, min_confidence, observer.as_ref())?;
    info!(
        run_id = %run.run_id,
        insights = %paths.insights.display(),
        creatives = %paths.creatives.display(),
        markdown = %paths.markdown.display(),
        "Reports written"
    );

    if let Some(e) = &run.error {
        error!(run_id = %run.run_id, error = %e, "Analysis failed");
        return Ok(ExitCode::FAILURE);
    }
    println!(
        "Analysis complete. Reports generated in {}.",
        writer.dir().display()
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn cli_for(config: &std::path::Path) -> Cli {
        Cli::parse_from([
            "campaign-insights",
            "--config",
            config.to_str().unwrap(),
            "--similarity-threshold",
            "0.8",
            "why",
        ])
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "similarity_threshold: [not, a, number]\nconfidence_min: 0.9\n").unwrap();

        let err = load_config(&cli_for(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("loading config"));
    }

    #[test]
    fn test_missing_config_uses_defaults_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&cli_for(&dir.path().join("absent.yaml"))).unwrap();
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.confidence_min, 0.6);
    }
}
