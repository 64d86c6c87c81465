//! Filter Module
//! Conjunctive row constraints applied before chart aggregation.

use crate::data::columns::*;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// User-selected constraints narrowing which records are visualized.
///
/// A row is included iff it satisfies every active condition; empty
/// fields are inactive. The spec is transient and recreated on every
/// interaction, so it carries no identity of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub makes: Vec<String>,
    pub counties: Vec<String>,
    pub ev_types: Vec<String>,
    pub cafv: Vec<String>,
    /// Inclusive model year bounds.
    pub year_range: Option<(i32, i32)>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.makes.is_empty()
            && self.counties.is_empty()
            && self.ev_types.is_empty()
            && self.cafv.is_empty()
            && self.year_range.is_none()
    }

    /// Apply the filter to a frame. A selection naming a category (or a
    /// whole column) the frame does not have selects nothing; an empty
    /// result is a valid, displayable state, never an error.
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        if self.is_empty() {
            return Ok(df.clone());
        }

        // Active selections on columns absent from the frame can match no
        // row at all.
        let have = |name: &str| df.get_column_names().iter().any(|c| c.as_str() == name);
        if !self.cafv.is_empty() && !have(CAFV) {
            return Ok(df.head(Some(0)));
        }

        let mut terms: Vec<Expr> = Vec::new();
        if let Some(term) = any_of(MAKE, &self.makes) {
            terms.push(term);
        }
        if let Some(term) = any_of(COUNTY, &self.counties) {
            terms.push(term);
        }
        if let Some(term) = any_of(EV_TYPE, &self.ev_types) {
            terms.push(term);
        }
        if let Some(term) = any_of(CAFV, &self.cafv) {
            terms.push(term);
        }
        if let Some((lo, hi)) = self.year_range {
            terms.push(col(MODEL_YEAR).gt_eq(lit(lo)).and(col(MODEL_YEAR).lt_eq(lit(hi))));
        }

        match terms.into_iter().reduce(|acc, term| acc.and(term)) {
            Some(predicate) => df.clone().lazy().filter(predicate).collect(),
            None => Ok(df.clone()),
        }
    }
}

/// Disjunction over the selected values of one column.
fn any_of(column: &str, values: &[String]) -> Option<Expr> {
    values
        .iter()
        .map(|value| col(column).eq(lit(value.as_str())))
        .reduce(|acc, term| acc.or(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new(MAKE.into(), ["TESLA", "TESLA", "NISSAN", "KIA"].as_slice()),
            Column::new(
                COUNTY.into(),
                ["King", "Snohomish", "King", "King"].as_slice(),
            ),
            Column::new(
                EV_TYPE.into(),
                [
                    "Battery Electric Vehicle (BEV)",
                    "Battery Electric Vehicle (BEV)",
                    "Battery Electric Vehicle (BEV)",
                    "Plug-in Hybrid Electric Vehicle (PHEV)",
                ]
                .as_slice(),
            ),
            Column::new(
                MODEL_YEAR.into(),
                [Some(2020i32), Some(2021), None, Some(2018)].as_slice(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn empty_filter_keeps_every_row() {
        let df = sample_frame();
        let out = FilterSpec::default().apply(&df).unwrap();
        assert_eq!(out.height(), 4);
    }

    #[test]
    fn conditions_combine_conjunctively() {
        let df = sample_frame();
        let filter = FilterSpec {
            makes: vec!["TESLA".into()],
            counties: vec!["King".into()],
            ..Default::default()
        };
        assert_eq!(filter.apply(&df).unwrap().height(), 1);
    }

    #[test]
    fn multiple_values_within_a_field_are_alternatives() {
        let df = sample_frame();
        let filter = FilterSpec {
            makes: vec!["TESLA".into(), "KIA".into()],
            ..Default::default()
        };
        assert_eq!(filter.apply(&df).unwrap().height(), 3);
    }

    #[test]
    fn year_range_is_inclusive_and_skips_unknown_years() {
        let df = sample_frame();
        let filter = FilterSpec {
            year_range: Some((2018, 2020)),
            ..Default::default()
        };
        // The null model year cannot satisfy the bounds.
        assert_eq!(filter.apply(&df).unwrap().height(), 2);
    }

    #[test]
    fn unknown_category_selects_nothing() {
        let df = sample_frame();
        let filter = FilterSpec {
            makes: vec!["DELOREAN".into()],
            ..Default::default()
        };
        assert_eq!(filter.apply(&df).unwrap().height(), 0);
    }

    #[test]
    fn selection_on_missing_column_selects_nothing() {
        let df = sample_frame();
        let filter = FilterSpec {
            cafv: vec!["Clean Alternative Fuel Vehicle Eligible".into()],
            ..Default::default()
        };
        assert_eq!(filter.apply(&df).unwrap().height(), 0);
    }
}
