//! Data Preprocessor Module
//! Type coercion, "Unknown" backfill, and derived columns.

use super::columns::*;
use super::{DataError, UNKNOWN};
use polars::prelude::*;

/// Fixed breakpoints for the electric-range buckets (miles).
const RANGE_SHORT_MAX: f64 = 100.0;
const RANGE_MEDIUM_MAX: f64 = 200.0;

/// Cleans a raw DataFrame into the canonical dataset shape.
///
/// Rows are never dropped: unparseable numerics become null (model year)
/// or 0 (ranges, MSRP), missing categoricals become "Unknown". Two runs
/// over the same input always produce identical output.
pub struct Preprocessor;

impl Preprocessor {
    pub fn preprocess(mut df: DataFrame) -> Result<DataFrame, DataError> {
        df = Self::coerce_types(df)?;
        if has_column(&df, LOCATION) {
            df = Self::extract_coordinates(df)?;
        }
        df = Self::add_range_category(df)?;
        df = Self::add_age_bucket(df)?;
        Ok(df)
    }

    /// Normalize column dtypes: numeric fields parse to numbers (null/0 on
    /// failure), categorical fields become strings with "Unknown" backfill.
    fn coerce_types(mut df: DataFrame) -> Result<DataFrame, DataError> {
        let year = Self::to_year_column(&df)?;
        df.with_column(year)?;

        for name in [ELECTRIC_RANGE, BASE_MSRP] {
            if has_column(&df, name) {
                let filled = Self::to_filled_f64_column(&df, name)?;
                df.with_column(filled)?;
            }
        }

        for name in [MAKE, MODEL, EV_TYPE, CAFV, COUNTY, CITY, UTILITY, LOCATION] {
            if has_column(&df, name) {
                let cleaned = Self::to_clean_string_column(&df, name)?;
                df.with_column(cleaned)?;
            }
        }

        Ok(df)
    }

    /// Model year as nullable Int32; parse failures become null.
    fn to_year_column(df: &DataFrame) -> Result<Column, DataError> {
        Ok(df.column(MODEL_YEAR)?.cast(&DataType::Int32)?)
    }

    /// Numeric column with nulls and NaN replaced by 0.
    fn to_filled_f64_column(df: &DataFrame, name: &str) -> Result<Column, DataError> {
        let cast = df.column(name)?.cast(&DataType::Float64)?;
        let ca = cast.f64()?;
        let filled: Vec<f64> = ca
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
            .collect();
        Ok(Column::new(name.into(), filled))
    }

    /// String column with empty / "nan" / null entries replaced by "Unknown".
    fn to_clean_string_column(df: &DataFrame, name: &str) -> Result<Column, DataError> {
        let cast = df.column(name)?.cast(&DataType::String)?;
        let ca = cast.str()?;
        let cleaned: Vec<String> = ca
            .into_iter()
            .map(|v| match v {
                Some(s) => {
                    let trimmed = s.trim();
                    if trimmed.is_empty()
                        || trimmed.eq_ignore_ascii_case("nan")
                        || trimmed.eq_ignore_ascii_case("null")
                    {
                        UNKNOWN.to_string()
                    } else {
                        trimmed.to_string()
                    }
                }
                None => UNKNOWN.to_string(),
            })
            .collect();
        Ok(Column::new(name.into(), cleaned))
    }

    /// Split the WKT "Vehicle Location" column into Latitude / Longitude.
    /// Unparseable entries yield null coordinates.
    fn extract_coordinates(mut df: DataFrame) -> Result<DataFrame, DataError> {
        let location = df.column(LOCATION)?.cast(&DataType::String)?;
        let ca = location.str()?;

        let mut longitudes: Vec<Option<f64>> = Vec::with_capacity(df.height());
        let mut latitudes: Vec<Option<f64>> = Vec::with_capacity(df.height());
        for value in ca.into_iter() {
            match value.and_then(Self::parse_point) {
                Some((lon, lat)) => {
                    longitudes.push(Some(lon));
                    latitudes.push(Some(lat));
                }
                None => {
                    longitudes.push(None);
                    latitudes.push(None);
                }
            }
        }

        df.with_column(Column::new(LONGITUDE.into(), longitudes))?;
        df.with_column(Column::new(LATITUDE.into(), latitudes))?;
        Ok(df)
    }

    /// Parse a WKT point of the form `POINT (lon lat)`.
    fn parse_point(value: &str) -> Option<(f64, f64)> {
        let inner = value
            .trim()
            .strip_prefix("POINT (")
            .or_else(|| value.trim().strip_prefix("POINT("))?
            .strip_suffix(')')?;
        let mut parts = inner.split_whitespace();
        let lon: f64 = parts.next()?.parse().ok()?;
        let lat: f64 = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((lon, lat))
    }

    /// Bucket label for an electric range in miles. Zero means the range
    /// was missing in the source data.
    pub fn range_category(range: f64) -> &'static str {
        if range <= 0.0 {
            UNKNOWN
        } else if range < RANGE_SHORT_MAX {
            "Short (<100 mi)"
        } else if range < RANGE_MEDIUM_MAX {
            "Medium (100-199 mi)"
        } else {
            "Long (200+ mi)"
        }
    }

    /// Bucket label for a vehicle age in years.
    pub fn age_bucket(age: i32) -> &'static str {
        match age {
            i32::MIN..=2 => "0-2 years",
            3..=5 => "3-5 years",
            6..=10 => "6-10 years",
            _ => "11+ years",
        }
    }

    fn add_range_category(mut df: DataFrame) -> Result<DataFrame, DataError> {
        let range = df.column(ELECTRIC_RANGE)?.f64()?.clone();
        let categories: Vec<&str> = range
            .into_iter()
            .map(|v| Self::range_category(v.unwrap_or(0.0)))
            .collect();
        df.with_column(Column::new(RANGE_CATEGORY.into(), categories))?;
        Ok(df)
    }

    /// Vehicle age is measured against the newest model year in the file,
    /// keeping repeated loads of the same data identical.
    fn add_age_bucket(mut df: DataFrame) -> Result<DataFrame, DataError> {
        let years = df.column(MODEL_YEAR)?.i32()?.clone();
        let newest = years.max();
        let buckets: Vec<&str> = years
            .into_iter()
            .map(|year| match (year, newest) {
                (Some(y), Some(max)) => Self::age_bucket(max - y),
                _ => UNKNOWN,
            })
            .collect();
        df.with_column(Column::new(AGE_BUCKET.into(), buckets))?;
        Ok(df)
    }
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_point_extracts_lon_lat() {
        assert_eq!(
            Preprocessor::parse_point("POINT (-122.33207 47.60611)"),
            Some((-122.33207, 47.60611))
        );
        assert_eq!(
            Preprocessor::parse_point("POINT(-120.5 46.6)"),
            Some((-120.5, 46.6))
        );
    }

    #[test]
    fn parse_point_rejects_malformed_values() {
        assert_eq!(Preprocessor::parse_point("Unknown"), None);
        assert_eq!(Preprocessor::parse_point("POINT ()"), None);
        assert_eq!(Preprocessor::parse_point("POINT (-122.33)"), None);
        assert_eq!(Preprocessor::parse_point("POINT (a b)"), None);
        assert_eq!(Preprocessor::parse_point("POINT (1 2 3)"), None);
    }

    #[test]
    fn range_buckets_use_fixed_breakpoints() {
        assert_eq!(Preprocessor::range_category(0.0), UNKNOWN);
        assert_eq!(Preprocessor::range_category(99.9), "Short (<100 mi)");
        assert_eq!(Preprocessor::range_category(100.0), "Medium (100-199 mi)");
        assert_eq!(Preprocessor::range_category(199.9), "Medium (100-199 mi)");
        assert_eq!(Preprocessor::range_category(200.0), "Long (200+ mi)");
    }

    #[test]
    fn age_buckets_cover_all_ages() {
        assert_eq!(Preprocessor::age_bucket(0), "0-2 years");
        assert_eq!(Preprocessor::age_bucket(2), "0-2 years");
        assert_eq!(Preprocessor::age_bucket(3), "3-5 years");
        assert_eq!(Preprocessor::age_bucket(10), "6-10 years");
        assert_eq!(Preprocessor::age_bucket(25), "11+ years");
    }
}
