//! Greedy, frequency-ordered clustering of normalized campaign names.
//!
//! Names are visited from most to least frequent. Each name joins the first
//! cluster (in creation order) whose canonical representative clears the
//! threshold; failing that, the first cluster holding any member that clears
//! it; failing that, it founds a new cluster and becomes its canonical name.
//! The result is order-sensitive and not globally optimal.

use crate::similarity::similarity;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.78;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameCluster {
    pub canonical: String,
    /// Members in assignment order; the canonical name is always first.
    pub members: Vec<String>,
}

/// Total mapping from every input name to its canonical name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterMap {
    mapping: BTreeMap<String, String>,
    clusters: Vec<NameCluster>,
    #[serde(skip)]
    comparisons: usize,
}

impl ClusterMap {
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.mapping.get(name).map(String::as_str)
    }

    pub fn mapping(&self) -> &BTreeMap<String, String> {
        &self.mapping
    }

    pub fn clusters(&self) -> &[NameCluster] {
        &self.clusters
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Number of pairwise similarity evaluations performed while building.
    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    fn identity<'a>(names: impl IntoIterator<Item = &'a String>) -> Self {
        let mut map = ClusterMap::default();
        for name in names {
            if map.mapping.contains_key(name) {
                continue;
            }
            map.mapping.insert(name.clone(), name.clone());
            map.clusters.push(NameCluster {
                canonical: name.clone(),
                members: vec![name.clone()],
            });
        }
        map
    }
}

/// Cluster distinct `names` (given in first-seen order) by similarity.
///
/// `counts` holds occurrence counts computed before clustering; names absent
/// from it count as zero. Duplicate entries in `names` are ignored after
/// their first occurrence. `threshold` is used as given.
pub fn cluster_names(
    names: &[String],
    counts: &HashMap<String, usize>,
    threshold: f64,
) -> ClusterMap {
    let mut distinct: Vec<&String> = Vec::with_capacity(names.len());
    let mut seen = std::collections::HashSet::with_capacity(names.len());
    for name in names {
        if seen.insert(name.as_str()) {
            distinct.push(name);
        }
    }

    if distinct.len() <= 1 {
        return ClusterMap::identity(distinct);
    }

    // Stable: equal counts keep first-seen order.
    distinct.sort_by(|a, b| {
        let ca = counts.get(*a).copied().unwrap_or(0);
        let cb = counts.get(*b).copied().unwrap_or(0);
        cb.cmp(&ca)
    });

    let mut map = ClusterMap::default();
    for name in distinct {
        let slot = find_cluster(&map.clusters, name, threshold, &mut map.comparisons);
        match slot {
            Some(idx) => {
                let cluster = &mut map.clusters[idx];
                cluster.members.push(name.clone());
                map.mapping.insert(name.clone(), cluster.canonical.clone());
            }
            None => {
                map.mapping.insert(name.clone(), name.clone());
                map.clusters.push(NameCluster {
                    canonical: name.clone(),
                    members: vec![name.clone()],
                });
            }
        }
    }
    map
}

fn find_cluster(
    clusters: &[NameCluster],
    name: &str,
    threshold: f64,
    comparisons: &mut usize,
) -> Option<usize> {
    let mut accepts = |other: &str| {
        *comparisons += 1;
        similarity(name, other) >= threshold
    };

    if let Some(idx) = clusters.iter().position(|c| accepts(&c.canonical)) {
        return Some(idx);
    }
    // Canonicals already failed above; only non-canonical members remain.
    clusters
        .iter()
        .position(|c| c.members.iter().skip(1).any(|m| accepts(m)))
}
