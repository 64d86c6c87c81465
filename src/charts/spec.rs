//! Chart Specification Module
//! Declarative, renderer-independent chart descriptions.

use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::data::columns;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("invalid chart kind: {0:?}")]
    InvalidChartKind(String),
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Categorical dimension a chart can aggregate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Make,
    Model,
    County,
    City,
    EvType,
    Cafv,
    Utility,
    RangeCategory,
    AgeBucket,
}

impl Dimension {
    pub(crate) fn column(self) -> &'static str {
        match self {
            Dimension::Make => columns::MAKE,
            Dimension::Model => columns::MODEL,
            Dimension::County => columns::COUNTY,
            Dimension::City => columns::CITY,
            Dimension::EvType => columns::EV_TYPE,
            Dimension::Cafv => columns::CAFV,
            Dimension::Utility => columns::UTILITY,
            Dimension::RangeCategory => columns::RANGE_CATEGORY,
            Dimension::AgeBucket => columns::AGE_BUCKET,
        }
    }

    /// Axis label for the dimension.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Make => "Manufacturer",
            Dimension::Model => "Vehicle Model",
            Dimension::County => "County",
            Dimension::City => "City",
            Dimension::EvType => "Electric Vehicle Type",
            Dimension::Cafv => "CAFV Eligibility",
            Dimension::Utility => "Electric Utility",
            Dimension::RangeCategory => "Range Category",
            Dimension::AgeBucket => "Vehicle Age",
        }
    }

    /// Display cap for busy dimensions; None keeps every category.
    pub(crate) fn top_n(self) -> Option<usize> {
        match self {
            Dimension::Make | Dimension::Model | Dimension::Utility => Some(10),
            Dimension::County | Dimension::City => Some(15),
            _ => None,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "make" | "manufacturer" => Some(Dimension::Make),
            "model" => Some(Dimension::Model),
            "county" => Some(Dimension::County),
            "city" => Some(Dimension::City),
            "type" | "ev-type" | "ev_type" => Some(Dimension::EvType),
            "cafv" => Some(Dimension::Cafv),
            "utility" => Some(Dimension::Utility),
            "range" | "range-category" | "range_category" => Some(Dimension::RangeCategory),
            "age" | "age-bucket" | "age_bucket" => Some(Dimension::AgeBucket),
            _ => None,
        }
    }
}

/// The chart catalog. Parsed from strings like `bar:make` or `histogram`;
/// an unrecognized kind or dimension is an [`ChartError::InvalidChartKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "chart", content = "dimension", rename_all = "snake_case")]
pub enum ChartKind {
    /// Count per category, descending.
    Bar(Dimension),
    /// Category shares of the filtered total.
    Pie(Dimension),
    /// Counts per model year; with a dimension, one line per category.
    Line(Option<Dimension>),
    /// Binned electric ranges, one series per vehicle type.
    Histogram,
    /// Electric range against model year.
    Scatter,
    /// Registered vehicle coordinates.
    Map,
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, dimension) = match s.split_once(':') {
            Some((kind, dimension)) => (kind, Some(dimension)),
            None => (s, None),
        };

        let parse_dim = |d: &str| Dimension::parse(d).ok_or_else(|| invalid(s));

        match kind.trim().to_ascii_lowercase().as_str() {
            "bar" => Ok(ChartKind::Bar(match dimension {
                Some(d) => parse_dim(d)?,
                None => Dimension::Make,
            })),
            "pie" => Ok(ChartKind::Pie(match dimension {
                Some(d) => parse_dim(d)?,
                None => Dimension::Utility,
            })),
            "line" | "trend" => Ok(ChartKind::Line(match dimension {
                Some(d) => Some(parse_dim(d)?),
                None => None,
            })),
            "histogram" | "hist" if dimension.is_none() => Ok(ChartKind::Histogram),
            "scatter" if dimension.is_none() => Ok(ChartKind::Scatter),
            "map" if dimension.is_none() => Ok(ChartKind::Map),
            _ => Err(invalid(s)),
        }
    }
}

fn invalid(s: &str) -> ChartError {
    ChartError::InvalidChartKind(s.to_string())
}

/// One data series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    /// Hex color assigned from the theme.
    pub color: String,
    pub data: SeriesData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesData {
    /// Categorical axis: parallel label/value arrays.
    Categories {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    /// Binned numeric axis: `edges` has one more entry than `counts`.
    Bins { edges: Vec<f64>, counts: Vec<f64> },
    /// Raw (x, y) coordinate pairs.
    Points { points: Vec<(f64, f64)> },
}

impl SeriesData {
    /// Total count carried by the series (number of points for xy data).
    pub fn total(&self) -> f64 {
        match self {
            SeriesData::Categories { values, .. } => values.iter().sum(),
            SeriesData::Bins { counts, .. } => counts.iter().sum(),
            SeriesData::Points { points } => points.len() as f64,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SeriesData::Categories { labels, .. } => labels.is_empty(),
            SeriesData::Bins { counts, .. } => counts.is_empty(),
            SeriesData::Points { points } => points.is_empty(),
        }
    }
}

/// A vertical reference line, e.g. the mean electric range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub label: String,
    pub value: f64,
}

/// A complete, self-contained chart description.
///
/// Pure value object: derived from `(Dataset, FilterSpec, ChartKind, Theme)`
/// and safe to hand to any rendering layer. Identical inputs always produce
/// identical specs, including series order and colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Visual attributes carried over from the theme.
    pub background: String,
    pub foreground: String,
    pub palette: Vec<String>,
}

impl ChartSpec {
    /// Sum of all series totals.
    pub fn total_count(&self) -> f64 {
        self.series.iter().map(|s| s.data.total()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.data.is_empty())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_with_default_dimension() {
        assert_eq!("bar".parse::<ChartKind>().unwrap(), ChartKind::Bar(Dimension::Make));
        assert_eq!(
            "pie".parse::<ChartKind>().unwrap(),
            ChartKind::Pie(Dimension::Utility)
        );
        assert_eq!("line".parse::<ChartKind>().unwrap(), ChartKind::Line(None));
        assert_eq!("histogram".parse::<ChartKind>().unwrap(), ChartKind::Histogram);
        assert_eq!("map".parse::<ChartKind>().unwrap(), ChartKind::Map);
    }

    #[test]
    fn parses_kind_with_explicit_dimension() {
        assert_eq!(
            "bar:county".parse::<ChartKind>().unwrap(),
            ChartKind::Bar(Dimension::County)
        );
        assert_eq!(
            "line:type".parse::<ChartKind>().unwrap(),
            ChartKind::Line(Some(Dimension::EvType))
        );
        assert_eq!(
            "BAR:Make".parse::<ChartKind>().unwrap(),
            ChartKind::Bar(Dimension::Make)
        );
    }

    #[test]
    fn rejects_unrecognized_kinds() {
        for input in ["donut", "bar:flavor", "histogram:make", ""] {
            assert!(matches!(
                input.parse::<ChartKind>(),
                Err(ChartError::InvalidChartKind(_))
            ));
        }
    }
}
