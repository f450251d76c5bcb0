//! Dataset loading, canonical-campaign aggregation and the numeric helpers
//! used by the analysis stages.

pub mod aggregate;
pub mod loader;
pub mod stats;

pub use aggregate::{summarize, LOW_CTR_QUANTILE};
pub use loader::{load_rows, parse_rows, REQUIRED_COLUMNS};
