use crate::error::{CampaignError, CampaignResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root analysis configuration. Loaded from an optional YAML/TOML file and
/// environment variables with the prefix `CAMPAIGN_INSIGHTS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_data_csv")]
    pub data_csv: PathBuf,
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
    /// Minimum combined similarity for two normalized campaign names to share
    /// a cluster. Expected in (0, 1]; not validated.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Evaluations below this confidence are left out of validated insights.
    #[serde(default = "default_confidence_min")]
    pub confidence_min: f64,
    #[serde(default)]
    pub creative: CreativeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreativeConfig {
    /// Fixed RNG seed for CTA selection. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_candidates")]
    pub max_candidates_per_campaign: usize,
}

// Default functions
fn default_data_csv() -> PathBuf {
    PathBuf::from("data/sample_fb_ads.csv")
}
fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}
fn default_similarity_threshold() -> f64 {
    0.78
}
fn default_confidence_min() -> f64 {
    0.6
}
fn default_max_candidates() -> usize {
    5
}

impl Default for CreativeConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_candidates_per_campaign: default_max_candidates(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_csv: default_data_csv(),
            reports_dir: default_reports_dir(),
            similarity_threshold: default_similarity_threshold(),
            confidence_min: default_confidence_min(),
            creative: CreativeConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from an optional config file and the environment.
    ///
    /// The file is optional: a missing file yields defaults overlaid with
    /// environment overrides. A present but unparsable file is an error.
    pub fn load(path: Option<&Path>) -> CampaignResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_INSIGHTS")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CampaignError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.similarity_threshold, 0.78);
        assert_eq!(config.confidence_min, 0.6);
        assert_eq!(config.creative.max_candidates_per_campaign, 5);
        assert!(config.creative.seed.is_none());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::load(Some(&dir.path().join("absent.yaml"))).unwrap();
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert_eq!(config.similarity_threshold, 0.78);
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "data_csv: data/other.csv").unwrap();
        writeln!(file, "similarity_threshold: 0.9").unwrap();
        writeln!(file, "creative:").unwrap();
        writeln!(file, "  seed: 7").unwrap();

        let config = AnalysisConfig::load(Some(&path)).unwrap();
        assert_eq!(config.data_csv, PathBuf::from("data/other.csv"));
        assert_eq!(config.similarity_threshold, 0.9);
        assert_eq!(config.creative.seed, Some(7));
        assert_eq!(config.confidence_min, 0.6);
    }

    #[test]
    fn test_load_malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "similarity_threshold: [not, a, number]").unwrap();
        writeln!(file, "confidence_min: 0.9").unwrap();

        let err = AnalysisConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, CampaignError::Config(_)));
        assert!(!err.is_schema_error());
    }
}
