use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::csv;
use crate::error::VortexError;
use crate::model::Record;

/// `circlebackvortex-export-<YYYY-MM-DD>.csv`
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("circlebackvortex-export-{}.csv", date.format("%Y-%m-%d"))
}

/// Encode `records` and write them to `dir` under the dated export name.
///
/// # Errors
///
/// Returns [`VortexError::ExportWrite`] if the file cannot be written.
pub fn write_export(records: &[Record], dir: &Path, today: NaiveDate) -> Result<PathBuf, VortexError> {
    let path = dir.join(export_file_name(today));
    std::fs::write(&path, csv::encode(records)).map_err(|source| VortexError::ExportWrite {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), tasks = records.len(), "exported tasks");
    Ok(path)
}
