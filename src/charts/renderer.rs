//! Static Chart Renderer
//! Draws chart specs to PNG images with plotters.
//!
//! Consumes only the self-contained [`ChartSpec`] (no dataset access),
//! so any other rendering layer could replace it.

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::ranged1d::Ranged;
use plotters::element::Pie;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::charts::spec::{ChartKind, ChartSpec, SeriesData};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Backend(String),
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Backend(e.to_string())
}

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

/// Renders chart specs to static PNG files.
pub struct ChartRenderer {
    width: u32,
    height: u32,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(1000, 700)
    }
}

impl ChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn render_png(&self, spec: &ChartSpec, path: &Path) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        let bg = parse_color(&spec.background);
        let fg = parse_color(&spec.foreground);
        root.fill(&bg).map_err(draw_err)?;

        // An empty result set is a valid, displayable state: title only.
        if spec.is_empty() {
            root.titled(&spec.title, ("sans-serif", 22).into_font().color(&fg))
                .map_err(draw_err)?;
        } else {
            match spec.kind {
                ChartKind::Bar(_) => self.draw_bars(&root, spec, fg)?,
                ChartKind::Pie(_) => self.draw_pie(&root, spec, fg)?,
                ChartKind::Histogram => self.draw_histogram(&root, spec, fg)?,
                ChartKind::Line(_) => self.draw_lines(&root, spec, fg)?,
                ChartKind::Scatter | ChartKind::Map => self.draw_points(&root, spec, fg)?,
            }
        }

        root.present().map_err(draw_err)
    }

    /// Vertical bars over a categorical axis.
    fn draw_bars(&self, root: &Canvas, spec: &ChartSpec, fg: RGBColor) -> Result<(), RenderError> {
        let Some(series) = spec.series.first() else {
            return Ok(());
        };
        let SeriesData::Categories { labels, values } = &series.data else {
            return Ok(());
        };

        let n = labels.len();
        let y_max = values.iter().cloned().fold(0.0, f64::max).max(1.0) * 1.1;
        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, ("sans-serif", 22).into_font().color(&fg))
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..y_max)
            .map_err(draw_err)?;

        let tick_labels = labels.clone();
        chart
            .configure_mesh()
            .x_desc(spec.x_label.clone())
            .y_desc(spec.y_label.clone())
            .axis_style(fg)
            .label_style(("sans-serif", 13).into_font().color(&fg))
            .light_line_style(fg.mix(0.08))
            .x_labels(n.max(1))
            .x_label_formatter(&move |x| {
                let index = x.round();
                if (x - index).abs() < 0.3 && index >= 0.0 && (index as usize) < tick_labels.len()
                {
                    tick_labels[index as usize].clone()
                } else {
                    String::new()
                }
            })
            .draw()
            .map_err(draw_err)?;

        let color = parse_color(&series.color);
        chart
            .draw_series(values.iter().enumerate().map(|(i, &value)| {
                Rectangle::new(
                    [(i as f64 - 0.35, 0.0), (i as f64 + 0.35, value)],
                    color.mix(0.85).filled(),
                )
            }))
            .map_err(draw_err)?;
        Ok(())
    }

    /// Overlaid per-series histograms with an optional reference line.
    fn draw_histogram(
        &self,
        root: &Canvas,
        spec: &ChartSpec,
        fg: RGBColor,
    ) -> Result<(), RenderError> {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_max = 1.0f64;
        for series in &spec.series {
            if let SeriesData::Bins { edges, counts } = &series.data {
                x_min = x_min.min(edges[0]);
                x_max = x_max.max(edges[edges.len() - 1]);
                y_max = y_max.max(counts.iter().cloned().fold(0.0, f64::max));
            }
        }
        if !x_max.is_finite() {
            return Ok(());
        }

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, ("sans-serif", 22).into_font().color(&fg))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.1)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label.clone())
            .y_desc(spec.y_label.clone())
            .axis_style(fg)
            .label_style(("sans-serif", 13).into_font().color(&fg))
            .light_line_style(fg.mix(0.08))
            .draw()
            .map_err(draw_err)?;

        for series in &spec.series {
            let SeriesData::Bins { edges, counts } = &series.data else {
                continue;
            };
            let color = parse_color(&series.color);
            chart
                .draw_series(counts.iter().enumerate().map(|(i, &count)| {
                    Rectangle::new(
                        [(edges[i], 0.0), (edges[i + 1], count)],
                        color.mix(0.55).filled(),
                    )
                }))
                .map_err(draw_err)?
                .label(series.name.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.mix(0.55).filled())
                });
        }

        if let Some(annotation) = &spec.annotation {
            let value = annotation.value;
            chart
                .draw_series(LineSeries::new(
                    [(value, 0.0), (value, y_max * 1.1)],
                    fg.stroke_width(2),
                ))
                .map_err(draw_err)?
                .label(annotation.label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 12, y)], fg.stroke_width(2))
                });
        }

        self.legend(&mut chart, fg)
    }

    /// One polyline with point markers per series.
    fn draw_lines(&self, root: &Canvas, spec: &ChartSpec, fg: RGBColor) -> Result<(), RenderError> {
        let (x_range, y_max) = point_bounds(spec);
        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, ("sans-serif", 22).into_font().color(&fg))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, 0.0..y_max * 1.1)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label.clone())
            .y_desc(spec.y_label.clone())
            .axis_style(fg)
            .label_style(("sans-serif", 13).into_font().color(&fg))
            .light_line_style(fg.mix(0.08))
            .x_label_formatter(&|x| format!("{x:.0}"))
            .draw()
            .map_err(draw_err)?;

        for series in &spec.series {
            let SeriesData::Points { points } = &series.data else {
                continue;
            };
            let color = parse_color(&series.color);
            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
                .map_err(draw_err)?
                .label(series.name.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 12, y)], color.stroke_width(2))
                });
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
                )
                .map_err(draw_err)?;
        }

        self.legend(&mut chart, fg)
    }

    /// Scatter and map charts: one point cloud per series.
    fn draw_points(
        &self,
        root: &Canvas,
        spec: &ChartSpec,
        fg: RGBColor,
    ) -> Result<(), RenderError> {
        let (x_range, y_max) = point_bounds(spec);
        let mut y_min = 0.0f64;
        for series in &spec.series {
            if let SeriesData::Points { points } = &series.data {
                for &(_, y) in points {
                    y_min = y_min.min(y);
                }
            }
        }

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, ("sans-serif", 22).into_font().color(&fg))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_min..y_max * 1.05)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label.clone())
            .y_desc(spec.y_label.clone())
            .axis_style(fg)
            .label_style(("sans-serif", 13).into_font().color(&fg))
            .light_line_style(fg.mix(0.08))
            .draw()
            .map_err(draw_err)?;

        for series in &spec.series {
            let SeriesData::Points { points } = &series.data else {
                continue;
            };
            let color = parse_color(&series.color);
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, color.mix(0.7).filled())),
                )
                .map_err(draw_err)?
                .label(series.name.as_str())
                .legend(move |(x, y)| Circle::new((x + 6, y), 4, color.filled()));
        }

        self.legend(&mut chart, fg)
    }

    /// Pie chart drawn from the first categorical series, colored from the
    /// spec's palette.
    fn draw_pie(&self, root: &Canvas, spec: &ChartSpec, fg: RGBColor) -> Result<(), RenderError> {
        let Some(series) = spec.series.first() else {
            return Ok(());
        };
        let SeriesData::Categories { labels, values } = &series.data else {
            return Ok(());
        };

        let inner = root
            .titled(&spec.title, ("sans-serif", 22).into_font().color(&fg))
            .map_err(draw_err)?;
        let (w, h) = inner.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = f64::from(w.min(h)) * 0.35;

        let colors: Vec<RGBColor> = (0..labels.len())
            .map(|i| {
                if spec.palette.is_empty() {
                    fg
                } else {
                    parse_color(&spec.palette[i % spec.palette.len()])
                }
            })
            .collect();

        let mut pie = Pie::new(&center, &radius, values, &colors, labels);
        pie.label_style(("sans-serif", 14).into_font().color(&fg));
        inner.draw(&pie).map_err(draw_err)?;
        Ok(())
    }

    fn legend<'a, X, Y>(
        &self,
        chart: &mut ChartContext<'a, BitMapBackend<'a>, Cartesian2d<X, Y>>,
        fg: RGBColor,
    ) -> Result<(), RenderError>
    where
        X: Ranged,
        Y: Ranged,
    {
        chart
            .configure_series_labels()
            .border_style(fg.mix(0.4))
            .label_font(("sans-serif", 14).into_font().color(&fg))
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(draw_err)?;
        Ok(())
    }
}

/// Shared x bounds and y maximum across all point series.
fn point_bounds(spec: &ChartSpec) -> (std::ops::Range<f64>, f64) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_max = 1.0f64;
    for series in &spec.series {
        if let SeriesData::Points { points } = &series.data {
            for &(x, y) in points {
                x_min = x_min.min(x);
                x_max = x_max.max(x);
                y_max = y_max.max(y);
            }
        }
    }
    if !x_max.is_finite() {
        return (0.0..1.0, y_max);
    }
    if x_min == x_max {
        // Single x value: pad so the axis stays usable.
        x_min -= 1.0;
        x_max += 1.0;
    }
    (x_min..x_max, y_max)
}

/// Parse a `#rrggbb` color, falling back to gray on malformed input.
fn parse_color(hex: &str) -> RGBColor {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return RGBColor(128, 128, 128);
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(128);
    RGBColor(channel(0), channel(2), channel(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_color("#e74c3c"), RGBColor(231, 76, 60));
        assert_eq!(parse_color("03120e"), RGBColor(3, 18, 14));
        assert_eq!(parse_color("not-a-color"), RGBColor(128, 128, 128));
    }
}
