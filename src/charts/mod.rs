//! Charts module - declarative chart specs, building, and rendering.

mod builder;
mod renderer;
mod spec;
mod theme;

pub use builder::ChartBuilder;
pub use renderer::{ChartRenderer, RenderError};
pub use spec::{Annotation, ChartError, ChartKind, ChartSpec, Dimension, Series, SeriesData};
pub use theme::{Theme, PALETTE};
