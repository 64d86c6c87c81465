//! Statistics module - dataset summaries and descriptive statistics.

mod summary;

pub use summary::{column_summaries, ColumnSummary, DatasetSummary};
