//! Result assembly and persistence.
//!
//! Zips the feature table's forecast dates with the prediction vector and a
//! constant run date, then writes the whole table to a uniquely named CSV in
//! one atomic step. Downstream consumers key on the header and the
//! `<prefix>_<run_date>_<HH-MM-SS>.csv` naming convention, so both are kept
//! stable.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::ForecastError;
use crate::features::FeatureTable;
use crate::persistence;

/// CSV header of the persisted result table.
pub const RESULT_HEADER: &str = "run_date,forecast_date,forecasted_sales_demand";

/// One scored forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub run_date: NaiveDate,
    pub forecast_date: NaiveDate,
    pub forecasted_sales_demand: f64,
}

/// Ordered result set for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Zip features and predictions into result rows.
    ///
    /// Fails with [`ForecastError::LengthMismatch`] before anything is
    /// written if the two sides disagree on length.
    pub fn assemble(
        run_date: NaiveDate,
        features: &FeatureTable,
        predictions: &[f64],
    ) -> Result<Self, ForecastError> {
        if features.len() != predictions.len() {
            return Err(ForecastError::LengthMismatch {
                expected: features.len(),
                actual: predictions.len(),
            });
        }

        let rows = features
            .forecast_dates()
            .zip(predictions)
            .map(|(forecast_date, &forecasted_sales_demand)| ResultRow {
                run_date,
                forecast_date,
                forecasted_sales_demand,
            })
            .collect();
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the full table as CSV: header plus one row per forecast day,
    /// dates in ISO-8601 form.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(64 * (self.rows.len() + 1));
        out.push_str(RESULT_HEADER);
        out.push('\n');
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{},{},{}",
                row.run_date, row.forecast_date, row.forecasted_sales_demand
            );
        }
        out
    }
}

/// Writes result tables to a configured directory.
pub struct ResultWriter {
    dir: PathBuf,
    file_prefix: String,
}

impl ResultWriter {
    pub fn new(dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    /// Persist a result table, returning the destination path.
    ///
    /// The filename carries the run date plus a second-granularity timestamp
    /// so a rerun on the same day lands in a new file. The stamp is read
    /// from the local clock, the same clock callers derive the run date
    /// from, so both filename components describe the same day. The write
    /// is staged and renamed, never leaving a partial file at the final
    /// path.
    pub fn persist(&self, run_date: NaiveDate, table: &ResultTable) -> Result<PathBuf, ForecastError> {
        let stamp = Local::now().format("%H-%M-%S").to_string();
        self.persist_stamped(run_date, &stamp, table)
    }

    fn persist_stamped(
        &self,
        run_date: NaiveDate,
        stamp: &str,
        table: &ResultTable,
    ) -> Result<PathBuf, ForecastError> {
        let filename = format!("{}_{}_{stamp}.csv", self.file_prefix, run_date.format("%Y-%m-%d"));
        let path = self.dir.join(filename);

        // There is exactly one writer per run, so an existence check is
        // enough to keep a second run in the same second from replacing an
        // earlier result set.
        if path.exists() {
            return Err(ForecastError::persistence(format!(
                "{}: destination already exists, refusing to replace an earlier result set",
                path.display()
            )));
        }

        persistence::atomic_write(&path, table.to_csv().as_bytes())
            .map_err(|e| ForecastError::persistence(format!("{}: {e}", path.display())))?;
        Ok(path)
    }
}

/// Read back a persisted result file.
///
/// Used by downstream checks and tests to confirm no row was dropped or
/// duplicated between scoring and persistence.
pub fn read_result_csv(path: &Path) -> Result<ResultTable, ForecastError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ForecastError::persistence(format!("{}: {e}", path.display())))?;

    let mut lines = content.lines();
    match lines.next() {
        Some(header) if header == RESULT_HEADER => {}
        other => {
            return Err(ForecastError::persistence(format!(
                "{}: unexpected header {other:?}",
                path.display()
            )));
        }
    }

    let mut rows = Vec::new();
    for line in lines {
        let mut fields = line.splitn(3, ',');
        let (run, forecast, value) = match (fields.next(), fields.next(), fields.next()) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => {
                return Err(ForecastError::persistence(format!(
                    "{}: malformed row '{line}'",
                    path.display()
                )));
            }
        };
        let parse_err =
            |e: &dyn std::fmt::Display| ForecastError::persistence(format!("{}: {e}", path.display()));
        rows.push(ResultRow {
            run_date: run.parse().map_err(|e| parse_err(&e))?,
            forecast_date: forecast.parse().map_err(|e| parse_err(&e))?,
            forecasted_sales_demand: value.parse().map_err(|e| parse_err(&e))?,
        });
    }
    Ok(ResultTable { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_assemble_rejects_length_mismatch() {
        let features = FeatureTable::generate(date(2024, 3, 1), 3).unwrap();
        let err = ResultTable::assemble(date(2024, 3, 1), &features, &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::LengthMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_csv_shape() {
        let features = FeatureTable::generate(date(2024, 3, 1), 2).unwrap();
        let table = ResultTable::assemble(date(2024, 3, 1), &features, &[10.5, 11.0]).unwrap();

        let csv = table.to_csv();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], RESULT_HEADER);
        assert_eq!(lines[1], "2024-03-01,2024-03-01,10.5");
        assert_eq!(lines[2], "2024-03-01,2024-03-02,11");
    }

    #[test]
    fn test_persist_and_read_back() {
        let dir = TempDir::new().unwrap();
        let features = FeatureTable::generate(date(2024, 3, 1), 5).unwrap();
        let predictions: Vec<f64> = (0..5).map(|i| 100.0 + i as f64).collect();
        let table = ResultTable::assemble(date(2024, 3, 1), &features, &predictions).unwrap();

        let writer = ResultWriter::new(dir.path(), "sales_forecast");
        let path = writer.persist(date(2024, 3, 1), &table).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("sales_forecast_2024-03-01_"));
        assert!(name.ends_with(".csv"));

        let read_back = read_result_csv(&path).unwrap();
        assert_eq!(read_back, table);
        assert_eq!(read_back.len(), features.len());
    }

    #[test]
    fn test_persist_stamp_follows_local_clock() {
        use chrono::Timelike;

        let dir = TempDir::new().unwrap();
        let features = FeatureTable::generate(date(2024, 3, 1), 1).unwrap();
        let table = ResultTable::assemble(date(2024, 3, 1), &features, &[1.0]).unwrap();
        let writer = ResultWriter::new(dir.path(), "sales_forecast");

        let before = Local::now().time().with_nanosecond(0).unwrap();
        let path = writer.persist(date(2024, 3, 1), &table).unwrap();
        let after = Local::now().time();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let stamp = name
            .strip_prefix("sales_forecast_2024-03-01_")
            .and_then(|s| s.strip_suffix(".csv"))
            .unwrap();
        let stamp = chrono::NaiveTime::parse_from_str(stamp, "%H-%M-%S").unwrap();

        // Skip the comparison in the rare case the test straddles midnight.
        if before <= after {
            assert!(stamp >= before && stamp <= after);
        }
    }

    #[test]
    fn test_persist_refuses_to_replace_same_stamp() {
        let dir = TempDir::new().unwrap();
        let features = FeatureTable::generate(date(2024, 3, 1), 1).unwrap();
        let table = ResultTable::assemble(date(2024, 3, 1), &features, &[1.0]).unwrap();
        let writer = ResultWriter::new(dir.path(), "sales_forecast");

        let path = writer
            .persist_stamped(date(2024, 3, 1), "12-00-00", &table)
            .unwrap();
        let original = std::fs::read_to_string(&path).unwrap();

        let err = writer
            .persist_stamped(date(2024, 3, 1), "12-00-00", &table)
            .unwrap_err();
        assert!(matches!(err, ForecastError::Persistence(_)));

        // The earlier result set is untouched.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_persist_leaves_no_tmp() {
        let dir = TempDir::new().unwrap();
        let features = FeatureTable::generate(date(2024, 3, 1), 1).unwrap();
        let table = ResultTable::assemble(date(2024, 3, 1), &features, &[1.0]).unwrap();

        ResultWriter::new(dir.path(), "sales_forecast")
            .persist(date(2024, 3, 1), &table)
            .unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_read_back_rejects_foreign_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "a,b,c\n1,2,3\n").unwrap();

        let err = read_result_csv(&path).unwrap_err();
        assert!(matches!(err, ForecastError::Persistence(_)));
    }
}
