//! Data module - CSV loading, preprocessing, and the cleaned dataset.

mod dataset;
mod loader;
mod processor;

pub use dataset::Dataset;
pub use loader::DatasetLoader;
pub use processor::Preprocessor;

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Column names of the EV population CSV schema.
pub mod columns {
    pub const MAKE: &str = "Make";
    pub const MODEL: &str = "Model";
    pub const MODEL_YEAR: &str = "Model Year";
    pub const ELECTRIC_RANGE: &str = "Electric Range";
    pub const BASE_MSRP: &str = "Base MSRP";
    pub const EV_TYPE: &str = "Electric Vehicle Type";
    pub const CAFV: &str = "Clean Alternative Fuel Vehicle (CAFV) Eligibility";
    pub const COUNTY: &str = "County";
    pub const CITY: &str = "City";
    pub const UTILITY: &str = "Electric Utility";
    pub const LOCATION: &str = "Vehicle Location";

    // Derived during preprocessing.
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const RANGE_CATEGORY: &str = "Range Category";
    pub const AGE_BUCKET: &str = "Age Bucket";

    /// Columns that must be present for a load to succeed.
    pub const REQUIRED: [&str; 6] = [MAKE, MODEL, MODEL_YEAR, ELECTRIC_RANGE, EV_TYPE, COUNTY];
}

/// Placeholder for missing or unparseable categorical values.
pub const UNKNOWN: &str = "Unknown";

#[derive(Error, Debug)]
pub enum DataError {
    #[error("data file unavailable: {path} ({reason})")]
    DataUnavailable { path: PathBuf, reason: String },
    #[error("schema mismatch: missing required column(s) {missing:?}")]
    SchemaMismatch { missing: Vec<String> },
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}
