//! Templated creative-copy suggestions for underperforming campaign groups.

use crate::agent::{round2, AgentKind, StageContext};
use crate::data::AnalyzedDataset;
use crate::planner::CreativeFilter;
use crate::terms::top_terms;
use campaign_analytics::stats::safe_mean;
use campaign_core::types::{CampaignCreatives, CreativeCandidate};
use campaign_core::StageOutcome;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

pub const GLOBAL_RECOMMENDATIONS: &str = "global_recommendations";

const TERMS_PER_CAMPAIGN: usize = 6;
const MIN_MESSAGES: usize = 3;
const GLOBAL_FALLBACK_MESSAGES: usize = 20;
const ANCHOR_EXAMPLES: usize = 3;
const BOTTOM_CTR_FALLBACK: usize = 10;
const GLOBAL_CANDIDATES: usize = 4;
const GLOBAL_CONFIDENCE: f64 = 0.5;

const AUDIENCE_WORDS: &[&str] = &[
    "men", "women", "man", "woman", "male", "female", "girls", "boys", "kid", "kids", "mens",
    "womens",
];

const CTAS: &[&str] = &[
    "Shop Now",
    "Buy Now",
    "Get Yours",
    "Learn More",
    "Grab It",
    "See More",
    "Try Now",
    "Order Today",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CopyTemplate {
    pub headline: String,
    pub message: String,
    pub rationale: &'static str,
}

/// First term with a word that is neither an audience word, a number, nor
/// shorter than three characters.
pub fn choose_primary_term(terms: &[String]) -> String {
    terms
        .iter()
        .find(|term| {
            term.split_whitespace().any(|word| {
                !AUDIENCE_WORDS.contains(&word)
                    && word.len() > 2
                    && !word.chars().all(|c| c.is_ascii_digit())
            })
        })
        .or_else(|| terms.first())
        .cloned()
        .unwrap_or_else(|| "comfort".to_string())
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn templates_from_terms(terms: &[String]) -> Vec<CopyTemplate> {
    let primary = choose_primary_term(terms);
    let secondary = terms.get(1).map(String::as_str).unwrap_or("fit");
    let tertiary = terms.get(2).map(String::as_str).unwrap_or("breathable");
    let title = title_case(&primary);

    vec![
        CopyTemplate {
            headline: format!("{title} - Limited Stock!"),
            message: format!(
                "Popular for its {secondary} and {tertiary}. Hurry, limited stock available."
            ),
            rationale: "urgency + product benefit",
        },
        CopyTemplate {
            headline: format!("Feel the {title} Difference"),
            message: format!("Experience {secondary} and all-day comfort with our {primary}."),
            rationale: "benefit-led",
        },
        CopyTemplate {
            headline: format!("Tired of Uncomfortable {title}?"),
            message: format!(
                "Switch to {primary} that offers {secondary} and stays breathable all day."
            ),
            rationale: "question hook",
        },
        CopyTemplate {
            headline: format!("Thousands Love Our {title}"),
            message: "Join thousands who chose comfort and fit, rated 4.7/5 by customers."
                .to_string(),
            rationale: "social proof",
        },
        CopyTemplate {
            headline: format!("Today's Offer: {title} at 20% Off"),
            message: format!(
                "Get the perfect {secondary} and breathable {tertiary}. Limited time discount."
            ),
            rationale: "discount + urgency",
        },
    ]
}

pub fn message_confidence(messages: usize) -> f64 {
    round2((0.4 + 0.05 * messages as f64).min(0.9))
}

pub struct CreativeGenerator {
    ctx: StageContext,
}

impl CreativeGenerator {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    fn rng(&self) -> StdRng {
        match self.ctx.config.creative.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn run(
        &self,
        dataset: Option<&AnalyzedDataset>,
        filter: CreativeFilter,
    ) -> StageOutcome<Vec<CampaignCreatives>> {
        let Some(dataset) = dataset else {
            self.ctx.warn(
                AgentKind::CreativeGenerator,
                "ERROR: Dataset not available for creative generation",
            );
            return StageOutcome::failed("Dataset not available for creative generation");
        };

        let mut rng = self.rng();
        let limit = self.ctx.config.creative.max_candidates_per_campaign;
        let canonicals = dataset.row_canonicals();
        let all_messages: Vec<String> = dataset
            .rows
            .iter()
            .filter_map(|r| r.creative_message.clone())
            .collect();

        let mut output = Vec::new();
        for target in target_campaigns(dataset, filter) {
            let messages = campaign_messages(dataset, &canonicals, &target, &all_messages);
            let terms = top_terms(&messages, TERMS_PER_CAMPAIGN);
            let confidence = message_confidence(messages.len());

            let generated = templates_from_terms(&terms)
                .into_iter()
                .take(limit)
                .map(|t| candidate(t, &messages, confidence, &mut rng))
                .collect();

            let campaign = dataset
                .summary
                .group(&target)
                .map(|g| g.display_label.clone())
                .unwrap_or_else(|| target.clone());
            output.push(CampaignCreatives {
                campaign,
                canonical_name: target,
                generated,
            });
        }

        if output.is_empty() {
            let terms = top_terms(&all_messages, TERMS_PER_CAMPAIGN);
            let generated = templates_from_terms(&terms)
                .into_iter()
                .take(GLOBAL_CANDIDATES.min(limit))
                .map(|t| candidate(t, &all_messages, GLOBAL_CONFIDENCE, &mut rng))
                .collect();
            output.push(CampaignCreatives {
                campaign: GLOBAL_RECOMMENDATIONS.to_string(),
                canonical_name: GLOBAL_RECOMMENDATIONS.to_string(),
                generated,
            });
        }

        let firsts: Vec<f64> = output
            .iter()
            .filter_map(|c| c.generated.first().map(|g| g.confidence))
            .collect();
        self.ctx.info(
            AgentKind::CreativeGenerator,
            format!("Generated creatives for {} canonical campaigns", output.len()),
        );
        StageOutcome::ok(output, safe_mean(&firsts))
    }
}

fn candidate(
    template: CopyTemplate,
    messages: &[String],
    confidence: f64,
    rng: &mut StdRng,
) -> CreativeCandidate {
    CreativeCandidate {
        headline: template.headline,
        message: template.message,
        cta: CTAS.choose(rng).copied().unwrap_or("Shop Now").to_string(),
        rationale: template.rationale.to_string(),
        anchor_examples: messages.iter().take(ANCHOR_EXAMPLES).cloned().collect(),
        confidence,
    }
}

/// Distinct, non-empty canonical names to write copy for. An empty low-CTR
/// list falls back to the lowest-CTR groups.
fn target_campaigns(dataset: &AnalyzedDataset, filter: CreativeFilter) -> Vec<String> {
    let summary = &dataset.summary;
    let mut candidates: Vec<String> = match filter {
        CreativeFilter::LowCtr => summary.low_ctr_campaigns.clone(),
        CreativeFilter::All => summary
            .campaign_summaries
            .iter()
            .map(|g| g.canonical_name.clone())
            .collect(),
    };
    if candidates.is_empty() {
        let mut by_ctr: Vec<_> = summary.campaign_summaries.iter().collect();
        by_ctr.sort_by(|a, b| a.ctr.total_cmp(&b.ctr));
        candidates = by_ctr
            .into_iter()
            .take(BOTTOM_CTR_FALLBACK)
            .map(|g| g.canonical_name.clone())
            .collect();
    }

    let mut targets: Vec<String> = Vec::new();
    for name in candidates {
        if !name.is_empty() && !targets.contains(&name) {
            targets.push(name);
        }
    }
    targets
}

/// The group's own messages; too few widens to groups sharing the first
/// word of the name, then to the head of the whole dataset.
fn campaign_messages(
    dataset: &AnalyzedDataset,
    canonicals: &[String],
    target: &str,
    all_messages: &[String],
) -> Vec<String> {
    let messages_where = |accept: &dyn Fn(&str) -> bool| -> Vec<String> {
        dataset
            .rows
            .iter()
            .zip(canonicals)
            .filter(|(_, canonical)| accept(canonical))
            .filter_map(|(row, _)| row.creative_message.clone())
            .collect()
    };

    let mut messages = messages_where(&|c: &str| c == target);
    if messages.len() < MIN_MESSAGES {
        if let Some(first_word) = target.split_whitespace().next() {
            let widened = messages_where(&|c: &str| c.contains(first_word));
            if !widened.is_empty() {
                messages = widened;
            }
        }
    }
    if messages.len() < MIN_MESSAGES {
        messages = all_messages
            .iter()
            .take(GLOBAL_FALLBACK_MESSAGES)
            .cloned()
            .collect();
    }
    messages
}
