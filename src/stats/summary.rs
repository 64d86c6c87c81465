//! Summary Statistics Module
//! Descriptive statistics over the cleaned dataset.

use crate::data::columns::*;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Aggregate figures shown in the dashboard header, computed once at load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_vehicles: usize,
    pub bev_count: usize,
    pub phev_count: usize,
    /// Mean of the nonzero electric ranges; 0 when no range data exists.
    pub avg_electric_range: f64,
    pub max_electric_range: f64,
    pub min_model_year: Option<i32>,
    pub max_model_year: Option<i32>,
    pub county_count: usize,
    pub make_count: usize,
}

impl DatasetSummary {
    pub fn from_frame(df: &DataFrame) -> PolarsResult<Self> {
        let ev_types = df.column(EV_TYPE)?.str()?;
        let mut bev_count = 0;
        let mut phev_count = 0;
        for value in ev_types.into_iter().flatten() {
            if value.contains("Battery Electric Vehicle") {
                bev_count += 1;
            } else if value.contains("Plug-in Hybrid") {
                phev_count += 1;
            }
        }

        let ranges = df.column(ELECTRIC_RANGE)?.f64()?;
        let nonzero: Vec<f64> = ranges.into_iter().flatten().filter(|v| *v > 0.0).collect();
        let avg_electric_range = if nonzero.is_empty() {
            0.0
        } else {
            nonzero.iter().sum::<f64>() / nonzero.len() as f64
        };
        let max_electric_range = nonzero.iter().cloned().fold(0.0, f64::max);

        let years = df.column(MODEL_YEAR)?.i32()?;

        Ok(Self {
            total_vehicles: df.height(),
            bev_count,
            phev_count,
            avg_electric_range,
            max_electric_range,
            min_model_year: years.min(),
            max_model_year: years.max(),
            county_count: df.column(COUNTY)?.n_unique()?,
            make_count: df.column(MAKE)?.n_unique()?,
        })
    }
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p05: f64,
    pub p95: f64,
}

/// Compute descriptive statistics for every numeric column in parallel.
/// Column order follows the frame, so output order is stable.
pub fn column_summaries(df: &DataFrame) -> Vec<ColumnSummary> {
    let numeric: Vec<String> = df
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
        .collect();

    numeric
        .par_iter()
        .filter_map(|name| {
            let values = numeric_values(df, name);
            describe(&values).map(|summary| ColumnSummary {
                column: name.clone(),
                ..summary
            })
        })
        .collect()
}

/// Non-null finite values of a column as f64.
fn numeric_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .and_then(|col| col.cast(&DataType::Float64))
        .ok()
        .and_then(|cast| {
            cast.f64().ok().map(|ca| {
                ca.into_iter()
                    .flatten()
                    .filter(|v| v.is_finite())
                    .collect()
            })
        })
        .unwrap_or_default()
}

/// Descriptive statistics over a value slice; None when empty.
fn describe(values: &[f64]) -> Option<ColumnSummary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let variance = if n > 1 {
        sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    };

    Some(ColumnSummary {
        column: String::new(),
        count: n,
        mean,
        median: percentile(&sorted, 50.0),
        std: variance.sqrt(),
        min: sorted[0],
        max: sorted[n - 1],
        p05: percentile(&sorted, 5.0),
        p95: percentile(&sorted, 95.0),
    })
}

/// Percentile using linear interpolation (NumPy compatible).
pub(crate) fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&values, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile(&values, 0.0) - 1.0).abs() < 1e-12);
        assert!((percentile(&values, 100.0) - 4.0).abs() < 1e-12);
        assert!((percentile(&values, 25.0) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn describe_handles_single_value() {
        let summary = describe(&[42.0]).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean, 42.0);
        assert_eq!(summary.median, 42.0);
        assert_eq!(summary.std, 0.0);
    }

    #[test]
    fn describe_matches_hand_computed_stats() {
        let summary = describe(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(summary.count, 8);
        assert!((summary.mean - 5.0).abs() < 1e-12);
        assert!((summary.median - 4.5).abs() < 1e-12);
        // Sample standard deviation with n - 1 in the denominator.
        assert!((summary.std - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
    }
}
