//! evpop - EV population data explorer & chart builder.
//!
//! Thin presentation glue: loads the dataset once, builds the requested
//! chart, and writes it as JSON and/or a static PNG.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;

use evpop::{column_summaries, ChartBuilder, ChartKind, ChartRenderer, DatasetLoader, FilterSpec, Theme};

#[derive(Parser)]
#[command(name = "evpop")]
#[command(about = "Electric vehicle population data explorer & chart builder")]
#[command(version)]
struct Cli {
    /// Path to the EV population CSV file
    #[arg(long)]
    data: PathBuf,

    /// Chart to build, e.g. "bar:make", "line:type", "histogram", "map"
    #[arg(long, default_value = "bar:make")]
    chart: String,

    /// Restrict to these manufacturers (repeatable)
    #[arg(long = "make")]
    makes: Vec<String>,

    /// Restrict to these counties (repeatable)
    #[arg(long = "county")]
    counties: Vec<String>,

    /// Restrict to these electric vehicle types (repeatable)
    #[arg(long = "ev-type")]
    ev_types: Vec<String>,

    /// Restrict to these CAFV eligibility values (repeatable)
    #[arg(long = "cafv")]
    cafv: Vec<String>,

    /// Inclusive model year range, e.g. "2015..2020"
    #[arg(long)]
    years: Option<String>,

    /// Write the chart spec as JSON to this file (default: stdout)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Render the chart to a PNG file
    #[arg(long)]
    png: Option<PathBuf>,

    /// Print dataset summary statistics instead of building a chart
    #[arg(long)]
    summary: bool,
}

fn parse_years(input: &str) -> anyhow::Result<(i32, i32)> {
    let Some((lo, hi)) = input.split_once("..") else {
        bail!("expected a year range like 2015..2020, got {input:?}");
    };
    let lo: i32 = lo.trim().parse().context("invalid start year")?;
    let hi: i32 = hi.trim().parse().context("invalid end year")?;
    if lo > hi {
        bail!("year range start {lo} is after end {hi}");
    }
    Ok((lo, hi))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let dataset = DatasetLoader::load(&cli.data)
        .with_context(|| format!("failed to load {}", cli.data.display()))?;

    if cli.summary {
        let summary = serde_json::json!({
            "dataset": dataset.summary(),
            "columns": column_summaries(dataset.frame()),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let filter = FilterSpec {
        makes: cli.makes,
        counties: cli.counties,
        ev_types: cli.ev_types,
        cafv: cli.cafv,
        year_range: cli.years.as_deref().map(parse_years).transpose()?,
    };

    let kind: ChartKind = cli.chart.parse()?;
    let builder = ChartBuilder::new(Theme::default());
    let spec = builder.build(&dataset, &filter, kind)?;
    info!(
        "built {:?} with {} series ({} total)",
        kind,
        spec.series.len(),
        spec.total_count()
    );

    if let Some(path) = &cli.png {
        ChartRenderer::default()
            .render_png(&spec, path)
            .with_context(|| format!("failed to render {}", path.display()))?;
        info!("wrote {}", path.display());
    }

    match &cli.json {
        Some(path) => fs::write(path, spec.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None if cli.png.is_none() => println!("{}", spec.to_json()?),
        None => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_years;

    #[test]
    fn year_ranges_parse() {
        assert_eq!(parse_years("2015..2020").unwrap(), (2015, 2020));
        assert_eq!(parse_years(" 2013 .. 2013 ").unwrap(), (2013, 2013));
        assert!(parse_years("2020").is_err());
        assert!(parse_years("2020..2015").is_err());
    }
}
