//! Raw-name → canonical-name index for one dataset.

use crate::cluster::{cluster_names, ClusterMap};
use crate::normalize::normalize;
use std::collections::HashMap;

/// Canonicalization snapshot built once from every raw campaign name in a
/// dataset. Immutable after construction.
#[derive(Debug, Clone)]
pub struct CanonicalIndex {
    clusters: ClusterMap,
    /// Raw label of the first row seen per canonical name.
    labels: HashMap<String, String>,
}

impl CanonicalIndex {
    /// Normalize every raw name, count occurrences, then cluster the distinct
    /// normalized names.
    pub fn build<'a, I>(raw_names: I, threshold: f64) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        // distinct normalized names in first-seen order
        let mut order = Vec::new();
        let mut first_raw: HashMap<String, &'a str> = HashMap::new();

        for raw in raw_names {
            let normalized = normalize(raw);
            let count = counts.entry(normalized.clone()).or_insert(0);
            if *count == 0 {
                order.push(normalized.clone());
                first_raw.insert(normalized, raw.unwrap_or(""));
            }
            *count += 1;
        }

        let clusters = cluster_names(&order, &counts, threshold);

        // The earliest first-seen member of a cluster carries its first row.
        let mut labels = HashMap::new();
        for name in &order {
            let canonical = clusters.canonical(name).unwrap_or(name.as_str());
            if !labels.contains_key(canonical) {
                let raw = first_raw.get(name).copied().unwrap_or("");
                labels.insert(canonical.to_string(), raw.to_string());
            }
        }

        Self { clusters, labels }
    }

    /// Canonical name for an already-normalized name. Names the index has
    /// never seen map to themselves.
    pub fn canonical_of_normalized<'s>(&'s self, normalized: &'s str) -> &'s str {
        self.clusters.canonical(normalized).unwrap_or(normalized)
    }

    /// Normalize `raw` and return its canonical name.
    pub fn canonical_of(&self, raw: Option<&str>) -> String {
        let normalized = normalize(raw);
        self.canonical_of_normalized(&normalized).to_string()
    }

    /// Raw label of the first row, in input order, whose name canonicalizes
    /// to `canonical`.
    pub fn display_label(&self, canonical: &str) -> Option<&str> {
        self.labels.get(canonical).map(String::as_str)
    }

    pub fn cluster_map(&self) -> &ClusterMap {
        &self.clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_variants_share_canonical() {
        let mut raw: Vec<Option<&str>> = Vec::new();
        raw.extend(std::iter::repeat(Some("launch sale")).take(5));
        raw.push(Some("la u nch sale"));
        raw.extend(std::iter::repeat(Some("Launch Sale!!")).take(3));
        raw.extend(std::iter::repeat(Some("winter boots")).take(10));

        let index = CanonicalIndex::build(raw, 0.78);

        assert_eq!(index.canonical_of(Some("la u nch sale")), "launch sale");
        assert_eq!(index.canonical_of(Some("Launch Sale!!")), "launch sale");
        assert_eq!(index.canonical_of(Some("winter boots")), "winter boots");
        assert_eq!(index.cluster_map().cluster_count(), 2);
        assert_eq!(index.display_label("launch sale"), Some("launch sale"));
        assert_eq!(index.display_label("winter boots"), Some("winter boots"));
    }

    #[test]
    fn test_missing_names_bucket_as_empty() {
        let index = CanonicalIndex::build([None, Some("  "), Some("Boots")], 0.78);
        assert_eq!(index.canonical_of(None), "");
        assert_eq!(index.canonical_of(Some("  ")), "");
        assert_eq!(index.display_label(""), Some(""));
    }

    #[test]
    fn test_cluster_label_comes_from_first_member_row() {
        let index = CanonicalIndex::build(
            [
                Some("Big Winter Boots Clearance Sale Event"),
                Some("big winter boots clearance sale"),
                Some("big winter boots clearance sale"),
            ],
            0.78,
        );
        assert_eq!(
            index.canonical_of(Some("Big Winter Boots Clearance Sale Event")),
            "big winter boots clearance sale"
        );
        assert_eq!(
            index.display_label("big winter boots clearance sale"),
            Some("Big Winter Boots Clearance Sale Event")
        );
        assert_eq!(index.display_label("big winter boots clearance sale event"), None);
    }

    #[test]
    fn test_unknown_name_maps_to_itself() {
        let index = CanonicalIndex::build([Some("winter boots")], 0.78);
        assert_eq!(index.canonical_of_normalized("summer sandals"), "summer sandals");
        assert_eq!(index.cluster_map().comparisons(), 0);
    }
}
