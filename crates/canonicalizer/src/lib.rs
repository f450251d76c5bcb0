//! Campaign-name canonicalization: normalization, hybrid similarity, and
//! greedy frequency-ordered clustering of near-duplicate names.

pub mod cluster;
pub mod index;
pub mod normalize;
pub mod similarity;

pub use cluster::{cluster_names, ClusterMap, NameCluster, DEFAULT_SIMILARITY_THRESHOLD};
pub use index::CanonicalIndex;
pub use normalize::normalize;
pub use similarity::{sequence_ratio, similarity, token_jaccard};
