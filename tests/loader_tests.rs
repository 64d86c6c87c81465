//! Loader and preprocessor integration tests.
//!
//! The loader must surface missing files and schema drift as errors, but
//! never fail a load over malformed individual values: those coerce to
//! null / 0 / "Unknown" so row counts stay truthful.

use evpop::data::{columns, DataError};
use evpop::DatasetLoader;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str = "Make,Model,Model Year,Electric Range,Base MSRP,\
Electric Vehicle Type,Clean Alternative Fuel Vehicle (CAFV) Eligibility,\
County,City,Electric Utility,Vehicle Location";

const BEV: &str = "Battery Electric Vehicle (BEV)";
const PHEV: &str = "Plug-in Hybrid Electric Vehicle (PHEV)";
const ELIGIBLE: &str = "Clean Alternative Fuel Vehicle Eligible";
const UNKNOWN_ELIGIBILITY: &str =
    "Eligibility unknown as battery range has not been researched";

fn sample_rows() -> Vec<String> {
    vec![
        format!("TESLA,Model 3,2020,266,0,{BEV},{ELIGIBLE},King,Seattle,Puget Sound Energy - (WA)|City of Seattle,POINT (-122.33 47.61)"),
        format!("TESLA,Model Y,2021,291,0,{BEV},{ELIGIBLE},King,Bellevue,Puget Sound Energy - (WA),POINT (-122.2 47.61)"),
        format!("TESLA,Model S,2015,208,79000,{BEV},{ELIGIBLE},Snohomish,Everett,Puget Sound Energy - (WA),POINT (-122.2 47.98)"),
        format!("NISSAN,Leaf,2018,151,0,{BEV},{ELIGIBLE},King,Seattle,City of Seattle,POINT (-122.33 47.6)"),
        format!("NISSAN,Leaf,2013,75,0,{BEV},{ELIGIBLE},Pierce,Tacoma,Tacoma Power,POINT (-122.44 47.25)"),
        format!("CHEVROLET,Volt,2017,53,0,{PHEV},Not eligible due to low battery range,King,Kent,Puget Sound Energy - (WA),POINT (-122.23 47.38)"),
        format!("BMW,X5,notayear,30,0,{PHEV},{UNKNOWN_ELIGIBILITY},King,Seattle,City of Seattle,POINT ()"),
        format!("KIA,Niro,2019,,0,{PHEV},{UNKNOWN_ELIGIBILITY},Yakima,Yakima,PACIFICORP,"),
        format!("FORD,Mustang Mach-E,2021,270,0,{BEV},{ELIGIBLE},King,Seattle,City of Seattle,POINT (-122.3 47.62)"),
        format!("TESLA,Model 3,2020,266,0,{BEV},{ELIGIBLE},Clark,Vancouver,BONNEVILLE POWER ADMINISTRATION,POINT (-122.66 45.63)"),
    ]
}

fn write_csv(path: &Path, header: &str, rows: &[String]) {
    let mut out = String::from(header);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    std::fs::write(path, out).unwrap();
}

fn sample_csv(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("evs.csv");
    write_csv(&path, HEADER, &sample_rows());
    path
}

#[test]
fn missing_file_is_data_unavailable() {
    let dir = TempDir::new().unwrap();
    let err = DatasetLoader::load(dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, DataError::DataUnavailable { .. }), "{err}");
}

#[test]
fn missing_required_column_is_schema_mismatch() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("evs.csv");

    // Drop the "Electric Range" field from header and rows alike.
    let header: Vec<&str> = HEADER.split(',').filter(|c| *c != "Electric Range").collect();
    let rows: Vec<String> = sample_rows()
        .iter()
        .map(|row| {
            let mut fields: Vec<&str> = row.split(',').collect();
            fields.remove(3);
            fields.join(",")
        })
        .collect();
    write_csv(&path, &header.join(","), &rows);

    let err = DatasetLoader::load(&path).unwrap_err();
    match err {
        DataError::SchemaMismatch { missing } => {
            assert_eq!(missing, vec!["Electric Range".to_string()]);
        }
        other => panic!("expected SchemaMismatch, got {other}"),
    }
}

#[test]
fn malformed_values_are_kept_not_dropped() {
    let dir = TempDir::new().unwrap();
    let dataset = DatasetLoader::load(sample_csv(&dir)).unwrap();

    // Every source row survives, including the unparseable year and the
    // empty range.
    assert_eq!(dataset.row_count(), 10);
    assert!(dataset.unique_values(columns::MAKE).contains(&"BMW".to_string()));
    // The unparseable model year lands in the Unknown age bucket.
    assert!(dataset
        .unique_values(columns::AGE_BUCKET)
        .contains(&"Unknown".to_string()));
}

#[test]
fn derived_buckets_use_fixed_breakpoints() {
    let dir = TempDir::new().unwrap();
    let dataset = DatasetLoader::load(sample_csv(&dir)).unwrap();

    let mut categories = dataset.unique_values(columns::RANGE_CATEGORY);
    categories.sort();
    assert_eq!(
        categories,
        vec![
            "Long (200+ mi)".to_string(),
            "Medium (100-199 mi)".to_string(),
            "Short (<100 mi)".to_string(),
            "Unknown".to_string(),
        ]
    );
}

#[test]
fn repeated_loads_are_identical() {
    let dir = TempDir::new().unwrap();
    let path = sample_csv(&dir);

    let first = DatasetLoader::load(&path).unwrap();
    let second = DatasetLoader::load(&path).unwrap();

    assert_eq!(first.row_count(), second.row_count());
    assert_eq!(first.summary(), second.summary());
    for column in [columns::MAKE, columns::RANGE_CATEGORY, columns::AGE_BUCKET] {
        assert_eq!(first.unique_values(column), second.unique_values(column));
    }
}

#[test]
fn summary_reflects_cleaned_data() {
    let dir = TempDir::new().unwrap();
    let dataset = DatasetLoader::load(sample_csv(&dir)).unwrap();
    let summary = dataset.summary();

    assert_eq!(summary.total_vehicles, 10);
    assert_eq!(summary.bev_count, 7);
    assert_eq!(summary.phev_count, 3);
    assert_eq!(summary.min_model_year, Some(2013));
    assert_eq!(summary.max_model_year, Some(2021));
    assert_eq!(summary.make_count, 6);
    assert_eq!(summary.max_electric_range, 291.0);
    // Mean of the nine nonzero ranges; the empty range coerced to 0 and is
    // excluded here while still counted in total_vehicles.
    assert!((summary.avg_electric_range - 1610.0 / 9.0).abs() < 1e-9);
}

#[test]
fn year_range_is_exposed() {
    let dir = TempDir::new().unwrap();
    let dataset = DatasetLoader::load(sample_csv(&dir)).unwrap();
    assert_eq!(dataset.year_range(), Some((2013, 2021)));
}
