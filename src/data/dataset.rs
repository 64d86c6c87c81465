//! The cleaned, read-only dataset shared by all chart builds.

use super::DataError;
use crate::data::columns;
use crate::stats::DatasetSummary;
use polars::prelude::*;

/// Cleaned EV population data plus derived summary statistics.
///
/// Owned by the loading path; every consumer works through `&Dataset`.
/// There is no write path after construction.
#[derive(Debug)]
pub struct Dataset {
    df: DataFrame,
    summary: DatasetSummary,
}

impl Dataset {
    pub(crate) fn from_frame(df: DataFrame) -> Result<Self, DataError> {
        let summary = DatasetSummary::from_frame(&df)?;
        Ok(Self { df, summary })
    }

    /// The cleaned rows.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Aggregate statistics computed at load time.
    pub fn summary(&self) -> &DatasetSummary {
        &self.summary
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// Distinct non-null values of a column, sorted for stable display.
    /// Unknown columns yield an empty list.
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        let mut values: Vec<String> = self
            .df
            .column(column)
            .ok()
            .and_then(|col| col.unique().ok())
            .map(|unique| {
                let series = unique.as_materialized_series();
                (0..series.len())
                    .filter_map(|i| {
                        let val = series.get(i).ok()?;
                        if val.is_null() {
                            None
                        } else {
                            Some(val.to_string().trim_matches('"').to_string())
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        values.sort();
        values
    }

    /// Names of numeric columns, for summary statistics.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| {
                matches!(
                    col.dtype(),
                    DataType::Float32
                        | DataType::Float64
                        | DataType::Int8
                        | DataType::Int16
                        | DataType::Int32
                        | DataType::Int64
                        | DataType::UInt8
                        | DataType::UInt16
                        | DataType::UInt32
                        | DataType::UInt64
                )
            })
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Min and max model year present, if any year parsed.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let years = self.df.column(columns::MODEL_YEAR).ok()?.i32().ok()?;
        Some((years.min()?, years.max()?))
    }
}
