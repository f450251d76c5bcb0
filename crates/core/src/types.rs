use serde::{Deserialize, Serialize};

/// One decoded row of the campaign performance export.
///
/// Numeric cells that were blank in the source are `None` and are skipped by
/// sums and means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignRow {
    pub campaign_name: Option<String>,
    pub date: String,
    pub spend: Option<f64>,
    pub revenue: Option<f64>,
    pub ctr: Option<f64>,
    pub roas: Option<f64>,
    pub clicks: Option<f64>,
    pub impressions: Option<f64>,
    pub creative_message: Option<String>,
}

impl CampaignRow {
    /// Raw campaign label with a missing value read as empty.
    pub fn raw_name(&self) -> &str {
        self.campaign_name.as_deref().unwrap_or("")
    }
}

/// Per-canonical-campaign aggregate consumed by every downstream stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignGroupSummary {
    pub canonical_name: String,
    /// First raw campaign label seen for this group, in row order.
    pub display_label: String,
    pub ctr: f64,
    pub roas: f64,
    pub spend: f64,
    pub revenue: f64,
    pub clicks: u64,
    pub impressions: u64,
    pub row_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: Option<String>,
    pub max: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalSummary {
    pub total_spend: f64,
    pub total_revenue: f64,
    pub avg_ctr: f64,
    pub avg_roas: f64,
    pub total_clicks: u64,
    pub total_impressions: u64,
    pub date_range: DateRange,
}

/// Daily aggregate: means for ratios, sums for volumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub roas: f64,
    pub ctr: f64,
    pub spend: f64,
    pub clicks: u64,
    pub impressions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub global: GlobalSummary,
    pub trend: Vec<TrendPoint>,
    pub campaign_summaries: Vec<CampaignGroupSummary>,
    /// Canonical names of groups in the bottom CTR quartile.
    pub low_ctr_campaigns: Vec<String>,
}

impl DataSummary {
    pub fn group(&self, canonical_name: &str) -> Option<&CampaignGroupSummary> {
        self.campaign_summaries
            .iter()
            .find(|g| g.canonical_name == canonical_name)
    }
}

/// Open-ended evidence/metrics payload attached to hypotheses and evaluations.
pub type Evidence = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HypothesisKind {
    #[serde(rename = "h_roas_trend")]
    RoasTrend,
    #[serde(rename = "h_low_ctr")]
    LowCtr,
    #[serde(rename = "h_spend_efficiency")]
    SpendEfficiency,
    #[serde(rename = "h_audience_fatigue")]
    AudienceFatigue,
    #[serde(rename = "h_none")]
    NoSignal,
}

impl HypothesisKind {
    pub fn id(&self) -> &'static str {
        match self {
            HypothesisKind::RoasTrend => "h_roas_trend",
            HypothesisKind::LowCtr => "h_low_ctr",
            HypothesisKind::SpendEfficiency => "h_spend_efficiency",
            HypothesisKind::AudienceFatigue => "h_audience_fatigue",
            HypothesisKind::NoSignal => "h_none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: HypothesisKind,
    pub statement: String,
    pub reasoning: String,
    pub confidence: f64,
    pub evidence: Evidence,
    pub evidence_needed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub hypothesis_id: Option<HypothesisKind>,
    pub statement: String,
    pub validated: bool,
    pub p_value: Option<f64>,
    pub metrics: Evidence,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeCandidate {
    pub headline: String,
    pub message: String,
    pub cta: String,
    pub rationale: String,
    pub anchor_examples: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignCreatives {
    /// Display label for the campaign group.
    pub campaign: String,
    pub canonical_name: String,
    pub generated: Vec<CreativeCandidate>,
}
