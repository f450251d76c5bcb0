//! Run reports — validated-insight merge, JSON and markdown report builders,
//! and the writer that puts them on disk.

pub mod merge;
pub mod report_builder;
pub mod writer;

pub use merge::{merge_validated, ValidatedInsight};
pub use report_builder::{render_markdown, CreativesReport, InsightsReport};
pub use writer::{ReportPaths, ReportWriter};
