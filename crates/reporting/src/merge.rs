//! Pairs hypotheses with their evaluations and keeps the confident ones.

use campaign_core::types::{Evaluation, Hypothesis};
use campaign_core::PipelineObserver;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedInsight {
    pub hypothesis: Hypothesis,
    pub evaluation: Evaluation,
}

/// Match each hypothesis to the evaluation carrying its id, falling back to
/// the evaluation at the same position. Pairs whose evaluation confidence is
/// below `min_confidence` are dropped and reported; a hypothesis with no
/// evaluation at all counts as zero confidence.
pub fn merge_validated(
    hypotheses: &[Hypothesis],
    evaluations: &[Evaluation],
    min_confidence: f64,
    observer: &dyn PipelineObserver,
) -> Vec<ValidatedInsight> {
    let mut by_id = HashMap::new();
    for evaluation in evaluations {
        if let Some(id) = evaluation.hypothesis_id {
            by_id.entry(id).or_insert(evaluation);
        }
    }

    let mut validated = Vec::new();
    for (i, hypothesis) in hypotheses.iter().enumerate() {
        let matched = by_id
            .get(&hypothesis.id)
            .copied()
            .or_else(|| evaluations.get(i));
        let confidence = matched.map(|e| e.confidence).unwrap_or(0.0);

        match matched {
            Some(evaluation) if confidence >= min_confidence => validated.push(ValidatedInsight {
                hypothesis: hypothesis.clone(),
                evaluation: evaluation.clone(),
            }),
            _ => observer.info(
                "run",
                &format!(
                    "Dropping low-confidence insight: {} ({confidence})",
                    hypothesis.statement
                ),
            ),
        }
    }
    validated
}
