//! Calendar feature synthesis for the forecast window.
//!
//! Derives the numeric calendar attributes the demand model was trained on,
//! one row per day in the horizon. Day-of-week uses the Monday=0 convention
//! and week numbers follow ISO-8601 (weeks start Monday, week 1 contains the
//! first Thursday of the year), so a date near a year boundary may report a
//! week belonging to the adjacent ISO year.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::model::FeatureSchema;

/// Column names of the numeric calendar features, in training order.
/// `forecast_date` itself is never part of the numeric input.
pub const CALENDAR_COLUMNS: [&str; 7] = [
    "day_of_week",
    "quarter",
    "month",
    "year",
    "day_of_year",
    "day_of_month",
    "week_of_year",
];

/// Calendar features for a single forecast day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub forecast_date: NaiveDate,
    /// Monday=0 .. Sunday=6.
    pub day_of_week: u32,
    /// 1-4.
    pub quarter: u32,
    pub month: u32,
    pub year: i32,
    pub day_of_year: u32,
    pub day_of_month: u32,
    /// ISO-8601 week number, 1-53.
    pub iso_week_of_year: u32,
}

impl FeatureRow {
    /// Derive all calendar attributes from a single date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            forecast_date: date,
            day_of_week: date.weekday().num_days_from_monday(),
            quarter: (date.month() - 1) / 3 + 1,
            month: date.month(),
            year: date.year(),
            day_of_year: date.ordinal(),
            day_of_month: date.day(),
            iso_week_of_year: date.iso_week().week(),
        }
    }

    /// The numeric attributes in training column order, date excluded.
    pub fn numeric_values(&self) -> Vec<f64> {
        vec![
            f64::from(self.day_of_week),
            f64::from(self.quarter),
            f64::from(self.month),
            f64::from(self.year),
            f64::from(self.day_of_year),
            f64::from(self.day_of_month),
            f64::from(self.iso_week_of_year),
        ]
    }
}

/// Ordered table of calendar features, one row per day of the horizon.
///
/// Immutable after generation; forecast dates are strictly increasing with
/// no gaps, starting at the anchor date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Generate features for `horizon_days` consecutive days starting at
    /// `anchor_date` (day 0 of the window).
    ///
    /// The anchor is injected rather than read from the wall clock so runs
    /// are reproducible under test.
    pub fn generate(anchor_date: NaiveDate, horizon_days: i64) -> Result<Self, ForecastError> {
        if horizon_days < 1 {
            return Err(ForecastError::InvalidHorizon(horizon_days));
        }

        let rows = (0..horizon_days as u64)
            .map(|offset| {
                anchor_date
                    .checked_add_days(Days::new(offset))
                    .map(FeatureRow::from_date)
                    .ok_or(ForecastError::InvalidHorizon(horizon_days))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The schema of the numeric columns this table presents to a model.
    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::new(CALENDAR_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    /// Numeric matrix in training column order, `forecast_date` excluded.
    pub fn numeric_rows(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(FeatureRow::numeric_values).collect()
    }

    /// Forecast dates in row order.
    pub fn forecast_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|r| r.forecast_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_generate_row_count_and_ordering() {
        let table = FeatureTable::generate(date(2024, 3, 1), 30).unwrap();
        assert_eq!(table.len(), 30);

        for (i, row) in table.rows().iter().enumerate() {
            assert_eq!(
                row.forecast_date,
                date(2024, 3, 1) + chrono::Duration::days(i as i64)
            );
        }
    }

    #[test]
    fn test_march_2024_scenario() {
        let table = FeatureTable::generate(date(2024, 3, 1), 3).unwrap();
        let dates: Vec<_> = table.forecast_dates().collect();
        assert_eq!(dates, vec![date(2024, 3, 1), date(2024, 3, 2), date(2024, 3, 3)]);

        // 2024-03-01 is a Friday
        let dows: Vec<_> = table.rows().iter().map(|r| r.day_of_week).collect();
        assert_eq!(dows, vec![4, 5, 6]);

        for row in table.rows() {
            assert_eq!(row.quarter, 1);
            assert_eq!(row.month, 3);
            assert_eq!(row.year, 2024);
        }
    }

    #[test]
    fn test_iso_week_year_boundary() {
        // 2024-12-30 and -31 fall in ISO week 1 of 2025, not week 53 of 2024.
        let table = FeatureTable::generate(date(2024, 12, 30), 2).unwrap();
        assert_eq!(table.rows()[0].iso_week_of_year, 1);
        assert_eq!(table.rows()[1].iso_week_of_year, 1);
    }

    #[test]
    fn test_single_day_horizon() {
        let table = FeatureTable::generate(date(2025, 6, 15), 1).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].forecast_date, date(2025, 6, 15));
    }

    #[test]
    fn test_invalid_horizon() {
        assert!(matches!(
            FeatureTable::generate(date(2025, 1, 1), 0),
            Err(ForecastError::InvalidHorizon(0))
        ));
        assert!(matches!(
            FeatureTable::generate(date(2025, 1, 1), -5),
            Err(ForecastError::InvalidHorizon(-5))
        ));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = FeatureTable::generate(date(2024, 11, 3), 14).unwrap();
        let b = FeatureTable::generate(date(2024, 11, 3), 14).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_leap_day_attributes() {
        let row = FeatureRow::from_date(date(2024, 2, 29));
        assert_eq!(row.day_of_year, 60);
        assert_eq!(row.day_of_month, 29);
        assert_eq!(row.quarter, 1);
        // 2024-02-29 is a Thursday
        assert_eq!(row.day_of_week, 3);
    }

    #[test]
    fn test_numeric_rows_shape() {
        let table = FeatureTable::generate(date(2024, 3, 1), 5).unwrap();
        let matrix = table.numeric_rows();
        assert_eq!(matrix.len(), 5);
        for row in &matrix {
            assert_eq!(row.len(), CALENDAR_COLUMNS.len());
        }
        // First row: Friday 2024-03-01
        assert_eq!(matrix[0], vec![4.0, 1.0, 3.0, 2024.0, 61.0, 1.0, 9.0]);
    }
}
