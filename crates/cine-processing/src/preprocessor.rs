//! Raw snapshot cleaning.
//!
//! The preprocessor projects a raw snapshot down to the model schema and
//! removes rows that cannot contribute to a regression fit: rows with a
//! null in any retained column, and rows where every retained column is
//! zero. The zero filter is an AND across columns: a row like
//! `[0, 5, 7.0]` survives, only fully-zero rows are dropped.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use crate::config::{Layout, Settings};
use crate::error::{ProcessingError, Result};
use crate::utils::{read_frame, write_frame};

/// Columns retained for training: predictors plus the target.
pub const MODEL_COLUMNS: [&str; 3] = ["popularity", "vote_count", "vote_average"];

/// The regression target within [`MODEL_COLUMNS`].
pub const TARGET_COLUMN: &str = "vote_average";

/// Cleans raw snapshots into training-ready tables.
pub struct Preprocessor {
    layout: Layout,
}

impl Preprocessor {
    /// Create a preprocessor from pipeline settings.
    pub fn new(settings: &Settings) -> Self {
        Preprocessor {
            layout: settings.layout(),
        }
    }

    /// Load a raw snapshot and clean it for training.
    ///
    /// Fails if the file is unreadable or if none of [`MODEL_COLUMNS`] are
    /// present in the raw schema.
    pub fn transform(&self, raw_path: &Path) -> Result<DataFrame> {
        let df = read_frame(raw_path)?;
        let rows_before = df.height();

        let available: Vec<&str> = MODEL_COLUMNS
            .iter()
            .copied()
            .filter(|name| {
                df.get_column_names()
                    .iter()
                    .any(|col| col.as_str() == *name)
            })
            .collect();

        if available.is_empty() {
            return Err(ProcessingError::NoModelColumns {
                path: raw_path.to_path_buf(),
                expected: MODEL_COLUMNS.to_vec(),
            });
        }

        let selected = df.select(available)?;
        let complete = drop_incomplete_rows(selected)?;
        let cleaned = drop_all_zero_rows(complete)?;

        info!(
            "Preprocessing: {} rows in, {} rows out",
            rows_before,
            cleaned.height()
        );
        Ok(cleaned)
    }

    /// Persist a cleaned snapshot under `processed/<run_id>/processed_data.csv`.
    pub fn save_processed(&self, mut df: DataFrame, run_id: &str) -> Result<PathBuf> {
        let path = self.layout.processed_csv(run_id);
        write_frame(&mut df, &path)?;
        info!("Cleaned snapshot saved: {}", path.display());
        Ok(path)
    }
}

/// Remove rows containing a null in any column.
fn drop_incomplete_rows(df: DataFrame) -> Result<DataFrame> {
    if df.width() == 0 || df.height() == 0 {
        return Ok(df);
    }

    // Accumulate per-row null counts, then keep rows with none.
    let mut null_counts = Series::new("nulls".into(), vec![0u32; df.height()]);
    for col in df.get_columns() {
        let null_int = col
            .as_materialized_series()
            .is_null()
            .cast(&DataType::UInt32)?;
        null_counts = (&null_counts + &null_int)?;
    }

    let null_counts = null_counts.cast(&DataType::Float64)?;
    let mask = null_counts.lt_eq(0.0)?;
    Ok(df.filter(&mask)?)
}

/// Remove rows where every column equals zero.
fn drop_all_zero_rows(df: DataFrame) -> Result<DataFrame> {
    if df.width() == 0 || df.height() == 0 {
        return Ok(df);
    }

    let mut zero_counts = Series::new("zeros".into(), vec![0u32; df.height()]);
    for col in df.get_columns() {
        let values = col.as_materialized_series().cast(&DataType::Float64)?;
        let zero_int = values.equal(0.0)?.cast(&DataType::UInt32)?;
        zero_counts = (&zero_counts + &zero_int)?;
    }

    // A row dies only when its zero count reaches the full width.
    let zero_counts = zero_counts.cast(&DataType::Float64)?;
    let mask = zero_counts.lt_eq(df.width() as f64 - 1.0)?;
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageSettings;
    use crate::utils::write_frame;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    fn preprocessor(dir: &TempDir) -> Preprocessor {
        let settings = Settings::builder()
            .api_key("k")
            .data_root(dir.path())
            .storage(StorageSettings::Local {
                root: dir.path().join("mirror"),
            })
            .build()
            .unwrap();
        Preprocessor::new(&settings)
    }

    fn write_raw(dir: &TempDir, mut df: DataFrame) -> PathBuf {
        let path = dir.path().join("raw.csv");
        write_frame(&mut df, &path).unwrap();
        path
    }

    #[test]
    fn test_clean_rows_pass_through_unchanged() {
        let dir = tempdir().unwrap();
        let raw = write_raw(
            &dir,
            df!(
                "popularity" => &[100.0, 150.0, 75.0, 200.0, 120.0],
                "vote_count" => &[300i64, 500, 120, 900, 410],
                "vote_average" => &[7.5, 8.0, 6.5, 9.0, 7.8],
            )
            .unwrap(),
        );

        let cleaned = preprocessor(&dir).transform(&raw).unwrap();
        assert_eq!(cleaned.shape(), (5, 3));
    }

    #[test]
    fn test_all_zero_row_is_dropped() {
        let dir = tempdir().unwrap();
        let raw = write_raw(
            &dir,
            df!(
                "popularity" => &[100.0, 0.0, 75.0, 200.0, 120.0],
                "vote_count" => &[300i64, 0, 120, 900, 410],
                "vote_average" => &[7.5, 0.0, 6.5, 9.0, 7.8],
            )
            .unwrap(),
        );

        let cleaned = preprocessor(&dir).transform(&raw).unwrap();
        assert_eq!(cleaned.height(), 4);
    }

    #[test]
    fn test_partially_zero_row_is_kept() {
        let dir = tempdir().unwrap();
        let raw = write_raw(
            &dir,
            df!(
                "popularity" => &[0.0, 100.0],
                "vote_count" => &[5i64, 300],
                "vote_average" => &[7.0, 7.5],
            )
            .unwrap(),
        );

        let cleaned = preprocessor(&dir).transform(&raw).unwrap();
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn test_rows_with_nulls_are_dropped() {
        let dir = tempdir().unwrap();
        let raw = write_raw(
            &dir,
            df!(
                "popularity" => &[Some(100.0), None, Some(75.0)],
                "vote_count" => &[Some(300i64), Some(12), Some(120)],
                "vote_average" => &[Some(7.5), Some(8.0), None],
            )
            .unwrap(),
        );

        let cleaned = preprocessor(&dir).transform(&raw).unwrap();
        assert_eq!(cleaned.height(), 1);
    }

    #[test]
    fn test_extra_columns_are_projected_away() {
        let dir = tempdir().unwrap();
        let raw = write_raw(
            &dir,
            df!(
                "id" => &[1i64, 2],
                "title" => &["Movie A", "Movie B"],
                "popularity" => &[100.0, 150.0],
                "vote_count" => &[300i64, 500],
                "vote_average" => &[7.5, 8.0],
            )
            .unwrap(),
        );

        let cleaned = preprocessor(&dir).transform(&raw).unwrap();
        let names: Vec<String> = cleaned
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["popularity", "vote_count", "vote_average"]);
    }

    #[test]
    fn test_no_model_columns_errors() {
        let dir = tempdir().unwrap();
        let raw = write_raw(
            &dir,
            df!(
                "id" => &[1i64, 2],
                "title" => &["Movie A", "Movie B"],
            )
            .unwrap(),
        );

        let result = preprocessor(&dir).transform(&raw);
        assert!(matches!(
            result,
            Err(ProcessingError::NoModelColumns { .. })
        ));
    }

    #[test]
    fn test_unreadable_input_propagates() {
        let dir = tempdir().unwrap();
        let result = preprocessor(&dir).transform(&dir.path().join("missing.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_save_processed_path() {
        let dir = tempdir().unwrap();
        let df = df!(
            "popularity" => &[100.0],
            "vote_count" => &[300i64],
            "vote_average" => &[7.5],
        )
        .unwrap();

        let path = preprocessor(&dir).save_processed(df, "20240101").unwrap();
        assert_eq!(
            path,
            dir.path().join("processed/20240101/processed_data.csv")
        );
        assert!(path.exists());
    }
}
