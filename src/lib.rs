//! evpop - Electric vehicle population data explorer & chart builder.
//!
//! The crate loads the Washington State EV registration CSV into a cleaned
//! read-only [`Dataset`], then builds declarative [`ChartSpec`] values from
//! `(Dataset, FilterSpec, ChartKind)` inputs. Specs are pure data: they can
//! be serialized as JSON for any front end or rendered to static PNGs with
//! the bundled [`ChartRenderer`].

pub mod charts;
pub mod data;
pub mod filter;
pub mod stats;

pub use charts::{
    Annotation, ChartBuilder, ChartError, ChartKind, ChartRenderer, ChartSpec, Dimension,
    RenderError, Series, SeriesData, Theme,
};
pub use data::{DataError, Dataset, DatasetLoader};
pub use filter::FilterSpec;
pub use stats::{column_summaries, ColumnSummary, DatasetSummary};
