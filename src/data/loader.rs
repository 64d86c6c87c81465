//! CSV Data Loader Module
//! Handles CSV file loading and schema validation using Polars.

use super::columns;
use super::{DataError, Dataset, Preprocessor};
use log::info;
use polars::prelude::*;
use std::path::Path;

/// Loads the EV population CSV into a cleaned [`Dataset`].
///
/// Loading happens once at process start; the resulting dataset is
/// read-only and shared by all chart builds.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load and preprocess a CSV file.
    ///
    /// Fails with [`DataError::DataUnavailable`] if the file is missing or
    /// unreadable and [`DataError::SchemaMismatch`] if required columns are
    /// absent. Malformed individual values never fail the load; they are
    /// coerced to null / 0 / "Unknown" by the preprocessor.
    pub fn load(path: impl AsRef<Path>) -> Result<Dataset, DataError> {
        let path = path.as_ref();
        if let Err(e) = std::fs::metadata(path) {
            return Err(DataError::DataUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }

        info!("loading dataset from {}", path.display());

        // Lazy scan for memory efficiency, then collect
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| DataError::DataUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Self::validate_schema(&df)?;

        let df = Preprocessor::preprocess(df)?;
        info!("loaded {} vehicle records", df.height());

        Dataset::from_frame(df)
    }

    /// Check that every required column is present.
    fn validate_schema(df: &DataFrame) -> Result<(), DataError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let missing: Vec<String> = columns::REQUIRED
            .iter()
            .filter(|required| !names.iter().any(|n| n == *required))
            .map(|required| required.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DataError::SchemaMismatch { missing })
        }
    }
}
