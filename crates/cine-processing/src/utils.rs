//! CSV snapshot helpers shared by the collector and preprocessor.

use std::fs::{self, File};
use std::path::Path;

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;

use crate::error::Result;

/// Load a CSV snapshot into a DataFrame.
pub fn read_frame(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Write a DataFrame as a CSV snapshot, creating parent directories.
///
/// Overwrites any existing file at `path`, which is what makes per-run
/// persistence idempotent.
pub fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)?;
    Ok(())
}
