//! Chart Builder Module
//! Turns a dataset, filter selection, and chart kind into a declarative spec.

use std::collections::HashMap;

use polars::prelude::*;

use crate::charts::spec::{
    Annotation, ChartError, ChartKind, ChartSpec, Dimension, Series, SeriesData,
};
use crate::charts::theme::Theme;
use crate::data::columns::*;
use crate::data::{Dataset, UNKNOWN};
use crate::filter::FilterSpec;

/// Bin count for the electric-range histogram.
const HISTOGRAM_BINS: usize = 30;

/// Maximum number of category series on a trend chart.
const LINE_SERIES_CAP: usize = 5;

/// Maximum number of points on a map chart.
const MAP_POINT_CAP: usize = 5000;

/// Builds [`ChartSpec`] values from `(Dataset, FilterSpec, ChartKind)`.
///
/// Stateless apart from the theme; identical inputs always produce
/// identical specs. Empty filter results yield valid zero-length specs.
pub struct ChartBuilder {
    theme: Theme,
}

impl ChartBuilder {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn build(
        &self,
        dataset: &Dataset,
        filter: &FilterSpec,
        kind: ChartKind,
    ) -> Result<ChartSpec, ChartError> {
        let df = filter.apply(dataset.frame())?;
        match kind {
            ChartKind::Bar(dim) | ChartKind::Pie(dim) => self.category_chart(&df, kind, dim),
            ChartKind::Line(dim) => self.trend_chart(&df, dim),
            ChartKind::Histogram => self.range_histogram(&df),
            ChartKind::Scatter => self.range_scatter(&df),
            ChartKind::Map => self.location_map(&df),
        }
    }

    /// Count-per-category chart (bar and pie share the aggregation).
    fn category_chart(
        &self,
        df: &DataFrame,
        kind: ChartKind,
        dim: Dimension,
    ) -> Result<ChartSpec, ChartError> {
        let mut counts = match dim {
            Dimension::Utility => Self::utility_counts(df)?,
            Dimension::Model => Self::model_counts(df)?,
            _ => Self::value_counts(df, dim.column())?,
        };
        sort_counts(&mut counts);
        if let Some(cap) = dim.top_n() {
            counts.truncate(cap);
        }

        let series = if counts.is_empty() {
            Vec::new()
        } else {
            let (labels, values) = counts
                .into_iter()
                .map(|(label, count)| (label, count as f64))
                .unzip();
            vec![Series {
                name: dim.label().to_string(),
                color: self.theme.accent.clone(),
                data: SeriesData::Categories { labels, values },
            }]
        };

        let title = match kind {
            ChartKind::Pie(_) => format!("EV Distribution by {}", dim.label()),
            _ => bar_title(dim).to_string(),
        };
        Ok(self.spec(kind, title, dim.label(), "Number of Vehicles", series, None))
    }

    /// Counts over model year; with a dimension, one line per top category.
    fn trend_chart(&self, df: &DataFrame, dim: Option<Dimension>) -> Result<ChartSpec, ChartError> {
        let kind = ChartKind::Line(dim);
        let years = df.column(MODEL_YEAR)?.i32()?;

        let (title, series) = match dim {
            None => {
                let mut counts: HashMap<i32, u64> = HashMap::new();
                for year in years.into_iter().flatten() {
                    *counts.entry(year).or_insert(0) += 1;
                }
                let points = year_points(counts);
                let series = if points.is_empty() {
                    Vec::new()
                } else {
                    vec![Series {
                        name: "All Vehicles".to_string(),
                        color: self.theme.text.clone(),
                        data: SeriesData::Points { points },
                    }]
                };
                ("EV Adoption Trend by Model Year".to_string(), series)
            }
            Some(dim) => {
                let title = match dim {
                    Dimension::EvType => "EV Type Adoption Trend by Year".to_string(),
                    Dimension::Make => "Top 5 Manufacturers Adoption Trend".to_string(),
                    _ => format!("{} Trend by Model Year", dim.label()),
                };
                let Ok(categories) = df.column(dim.column()) else {
                    return Ok(self.spec(
                        kind,
                        title,
                        "Model Year",
                        "Number of Vehicles",
                        Vec::new(),
                        None,
                    ));
                };
                let categories = categories.str()?;

                let mut totals: HashMap<String, u64> = HashMap::new();
                let mut per_year: HashMap<(String, i32), u64> = HashMap::new();
                for (category, year) in categories.into_iter().zip(years.into_iter()) {
                    let (Some(category), Some(year)) = (category, year) else {
                        continue;
                    };
                    *totals.entry(category.to_string()).or_insert(0) += 1;
                    *per_year.entry((category.to_string(), year)).or_insert(0) += 1;
                }

                let mut top: Vec<(String, u64)> = totals.into_iter().collect();
                sort_counts(&mut top);
                top.truncate(LINE_SERIES_CAP);

                let series = top
                    .into_iter()
                    .enumerate()
                    .map(|(i, (name, _))| {
                        let counts: HashMap<i32, u64> = per_year
                            .iter()
                            .filter(|((category, _), _)| *category == name)
                            .map(|((_, year), count)| (*year, *count))
                            .collect();
                        Series {
                            name,
                            color: self.theme.series_color(i),
                            data: SeriesData::Points {
                                points: year_points(counts),
                            },
                        }
                    })
                    .collect();
                (title, series)
            }
        };

        Ok(self.spec(kind, title, "Model Year", "Number of Vehicles", series, None))
    }

    /// Electric-range histogram, one series per vehicle type, with a mean
    /// reference line. Zero ranges mean "no range data" and are excluded.
    fn range_histogram(&self, df: &DataFrame) -> Result<ChartSpec, ChartError> {
        let ranges = df.column(ELECTRIC_RANGE)?.f64()?;
        let types = df.column(EV_TYPE)?.str()?;

        let mut by_type: HashMap<String, Vec<f64>> = HashMap::new();
        let mut all: Vec<f64> = Vec::new();
        for (range, ev_type) in ranges.into_iter().zip(types.into_iter()) {
            let Some(range) = range else { continue };
            if range <= 0.0 {
                continue;
            }
            all.push(range);
            by_type
                .entry(ev_type.unwrap_or(UNKNOWN).to_string())
                .or_default()
                .push(range);
        }

        let title = "Distribution of Electric Range";
        if all.is_empty() {
            return Ok(self.spec(
                ChartKind::Histogram,
                title,
                "Electric Range (miles)",
                "Number of Vehicles",
                Vec::new(),
                None,
            ));
        }

        let min = all.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = all.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let edges = bin_edges(min, max, HISTOGRAM_BINS);

        let mut order: Vec<(String, u64)> = by_type
            .iter()
            .map(|(name, values)| (name.clone(), values.len() as u64))
            .collect();
        sort_counts(&mut order);

        let series = order
            .into_iter()
            .enumerate()
            .map(|(i, (name, _))| {
                let counts = bin_counts(&by_type[&name], &edges);
                Series {
                    name,
                    color: self.theme.series_color(i),
                    data: SeriesData::Bins {
                        edges: edges.clone(),
                        counts,
                    },
                }
            })
            .collect();

        let mean = all.iter().sum::<f64>() / all.len() as f64;
        let annotation = Some(Annotation {
            label: format!("Avg: {mean:.1} miles"),
            value: mean,
        });
        Ok(self.spec(
            ChartKind::Histogram,
            title,
            "Electric Range (miles)",
            "Number of Vehicles",
            series,
            annotation,
        ))
    }

    /// Electric range against model year, one series per vehicle type.
    fn range_scatter(&self, df: &DataFrame) -> Result<ChartSpec, ChartError> {
        let years = df.column(MODEL_YEAR)?.i32()?;
        let ranges = df.column(ELECTRIC_RANGE)?.f64()?;
        let types = df.column(EV_TYPE)?.str()?;

        let mut by_type: HashMap<String, Vec<(f64, f64)>> = HashMap::new();
        for ((year, range), ev_type) in years
            .into_iter()
            .zip(ranges.into_iter())
            .zip(types.into_iter())
        {
            let (Some(year), Some(range)) = (year, range) else {
                continue;
            };
            if range <= 0.0 {
                continue;
            }
            by_type
                .entry(ev_type.unwrap_or(UNKNOWN).to_string())
                .or_default()
                .push((year as f64, range));
        }

        Ok(self.spec(
            ChartKind::Scatter,
            "Electric Range by Model Year",
            "Model Year",
            "Electric Range (miles)",
            self.point_series(by_type),
            None,
        ))
    }

    /// Registered vehicle coordinates, one series per vehicle type, capped
    /// by a deterministic stride so identical inputs keep identical output.
    fn location_map(&self, df: &DataFrame) -> Result<ChartSpec, ChartError> {
        let title = "EV Locations";
        let has_coords = df.get_column_names().iter().any(|c| c.as_str() == LATITUDE);
        if !has_coords {
            return Ok(self.spec(
                ChartKind::Map,
                title,
                "Longitude",
                "Latitude",
                Vec::new(),
                None,
            ));
        }

        let lons = df.column(LONGITUDE)?.f64()?;
        let lats = df.column(LATITUDE)?.f64()?;
        let types = df.column(EV_TYPE)?.str()?;

        let eligible: Vec<(String, f64, f64)> = lons
            .into_iter()
            .zip(lats.into_iter())
            .zip(types.into_iter())
            .filter_map(|((lon, lat), ev_type)| {
                Some((ev_type.unwrap_or(UNKNOWN).to_string(), lon?, lat?))
            })
            .collect();

        let stride = eligible.len().div_ceil(MAP_POINT_CAP).max(1);
        let mut by_type: HashMap<String, Vec<(f64, f64)>> = HashMap::new();
        for (ev_type, lon, lat) in eligible.into_iter().step_by(stride) {
            by_type.entry(ev_type).or_default().push((lon, lat));
        }

        Ok(self.spec(
            ChartKind::Map,
            title,
            "Longitude",
            "Latitude",
            self.point_series(by_type),
            None,
        ))
    }

    /// Point series ordered by descending size, alphabetical on ties.
    fn point_series(&self, by_type: HashMap<String, Vec<(f64, f64)>>) -> Vec<Series> {
        let mut order: Vec<(String, u64)> = by_type
            .iter()
            .map(|(name, points)| (name.clone(), points.len() as u64))
            .collect();
        sort_counts(&mut order);

        let mut by_type = by_type;
        order
            .into_iter()
            .enumerate()
            .map(|(i, (name, _))| {
                let points = by_type.remove(&name).unwrap_or_default();
                Series {
                    name,
                    color: self.theme.series_color(i),
                    data: SeriesData::Points { points },
                }
            })
            .collect()
    }

    fn spec(
        &self,
        kind: ChartKind,
        title: impl Into<String>,
        x_label: &str,
        y_label: &str,
        series: Vec<Series>,
        annotation: Option<Annotation>,
    ) -> ChartSpec {
        ChartSpec {
            kind,
            title: title.into(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series,
            annotation,
            background: self.theme.background.clone(),
            foreground: self.theme.text.clone(),
            palette: self.theme.palette.clone(),
        }
    }

    /// Count occurrences of each value in a string column. A column the
    /// frame does not have yields no categories.
    fn value_counts(df: &DataFrame, column: &str) -> Result<Vec<(String, u64)>, ChartError> {
        let Ok(col) = df.column(column) else {
            return Ok(Vec::new());
        };
        let ca = col.str()?;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for value in ca.into_iter().flatten() {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
        Ok(counts.into_iter().collect())
    }

    /// Model popularity counts over the combined "Make Model" label.
    fn model_counts(df: &DataFrame) -> Result<Vec<(String, u64)>, ChartError> {
        let makes = df.column(MAKE)?.str()?;
        let models = df.column(MODEL)?.str()?;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for (make, model) in makes.into_iter().zip(models.into_iter()) {
            let make = make.unwrap_or(UNKNOWN);
            let model = model.unwrap_or(UNKNOWN);
            *counts.entry(format!("{make} {model}")).or_insert(0) += 1;
        }
        Ok(counts.into_iter().collect())
    }

    /// Utility counts. A record may list several utilities separated by
    /// `|`, each optionally tagged with the state suffix; every listed
    /// utility counts once. Records without utility data are skipped.
    fn utility_counts(df: &DataFrame) -> Result<Vec<(String, u64)>, ChartError> {
        let Ok(col) = df.column(UTILITY) else {
            return Ok(Vec::new());
        };
        let ca = col.str()?;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for entry in ca.into_iter().flatten() {
            if entry == UNKNOWN {
                continue;
            }
            for utility in entry.split('|') {
                let utility = utility.trim();
                let utility = utility.strip_suffix(" - (WA)").unwrap_or(utility).trim_end();
                if utility.is_empty() {
                    continue;
                }
                *counts.entry(utility.to_string()).or_insert(0) += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }
}

fn bar_title(dim: Dimension) -> &'static str {
    match dim {
        Dimension::Make => "Top 10 EV Manufacturers",
        Dimension::Model => "Top 10 EV Models by Popularity",
        Dimension::County => "Top 15 Counties by EV Population",
        Dimension::City => "Top 15 Cities by EV Population",
        Dimension::Utility => "Top 10 Electric Utilities",
        Dimension::EvType => "EV Population by Type",
        Dimension::Cafv => "EV Population by CAFV Eligibility",
        Dimension::RangeCategory => "EV Population by Range Category",
        Dimension::AgeBucket => "EV Population by Vehicle Age",
    }
}

/// Descending count, alphabetical tie-break: fully deterministic ordering.
fn sort_counts(counts: &mut [(String, u64)]) {
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

/// Year/count pairs in natural ascending year order (ordinal axis).
fn year_points(counts: HashMap<i32, u64>) -> Vec<(f64, f64)> {
    let mut points: Vec<(f64, f64)> = counts
        .into_iter()
        .map(|(year, count)| (year as f64, count as f64))
        .collect();
    points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    points
}

/// `bins` equal-width bin edges over [min, max]; a degenerate span still
/// produces one usable bin.
fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    if !(max > min) {
        return vec![min - 0.5, min + 0.5];
    }
    let width = (max - min) / bins as f64;
    (0..=bins).map(|i| min + i as f64 * width).collect()
}

fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let bins = edges.len() - 1;
    let min = edges[0];
    let width = (edges[bins] - min) / bins as f64;
    let mut counts = vec![0.0; bins];
    for &value in values {
        let index = if width > 0.0 {
            (((value - min) / width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        counts[index] += 1.0;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_counts_breaks_ties_alphabetically() {
        let mut counts = vec![
            ("NISSAN".to_string(), 3),
            ("KIA".to_string(), 3),
            ("TESLA".to_string(), 7),
        ];
        sort_counts(&mut counts);
        let names: Vec<&str> = counts.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["TESLA", "KIA", "NISSAN"]);
    }

    #[test]
    fn bin_edges_span_the_range() {
        let edges = bin_edges(0.0, 300.0, 30);
        assert_eq!(edges.len(), 31);
        assert_eq!(edges[0], 0.0);
        assert_eq!(edges[30], 300.0);
    }

    #[test]
    fn bin_counts_include_the_upper_edge() {
        let edges = bin_edges(0.0, 30.0, 3);
        let counts = bin_counts(&[0.0, 9.9, 10.0, 29.9, 30.0], &edges);
        assert_eq!(counts, vec![2.0, 1.0, 2.0]);
    }

    #[test]
    fn degenerate_span_gets_a_single_bin() {
        let edges = bin_edges(5.0, 5.0, 30);
        assert_eq!(edges.len(), 2);
        let counts = bin_counts(&[5.0, 5.0, 5.0], &edges);
        assert_eq!(counts, vec![3.0]);
    }

    #[test]
    fn year_points_sort_ascending() {
        let mut counts = HashMap::new();
        counts.insert(2021, 4u64);
        counts.insert(2013, 1);
        counts.insert(2017, 2);
        let points = year_points(counts);
        assert_eq!(
            points,
            vec![(2013.0, 1.0), (2017.0, 2.0), (2021.0, 4.0)]
        );
    }
}
