//! CSV output for asset series
//!
//! Layout: a `time,<metric1>,<metric2>,...` header followed by one
//! `<YYYY-MM-DD>,<value1>,<value2>,...` row per observation. Column order is
//! the order of the metric list used to request the series; a metric missing
//! on a given day is an empty field.

use crate::ObservationRow;
use csv::{Terminator, WriterBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::path::asset_file_path;
use super::{OutputError, OutputResult};

/// Header of the date column
pub const TIME_COLUMN: &str = "time";

/// Date format of the first column
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render the CSV payload for one asset.
///
/// # Arguments
/// * `metric_ids` - Column order (after the time column)
/// * `rows` - Observations, written in the given order
pub fn render_csv(metric_ids: &[String], rows: &[ObservationRow]) -> OutputResult<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let header = std::iter::once(TIME_COLUMN).chain(metric_ids.iter().map(String::as_str));
    writer
        .write_record(header)
        .map_err(|e| OutputError::CsvError(format!("Failed to write header: {e}")))?;

    let mut record: Vec<String> = Vec::with_capacity(metric_ids.len() + 1);
    for row in rows {
        record.clear();
        record.push(row.date.format(DATE_FORMAT).to_string());
        record.extend(
            metric_ids
                .iter()
                .map(|m| row.value(m).map(ToString::to_string).unwrap_or_default()),
        );
        writer
            .write_record(&record)
            .map_err(|e| OutputError::CsvError(format!("Failed to write row {}: {e}", row.date)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::IoError(format!("Failed to finish CSV buffer: {e}")))?;
    String::from_utf8(bytes).map_err(|e| OutputError::CsvError(format!("CSV is not UTF-8: {e}")))
}

/// Result of writing one asset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// File that was written
    pub path: PathBuf,
    /// Data rows (header excluded)
    pub rows: usize,
    /// Payload size in bytes
    pub bytes: usize,
}

/// Writes one CSV file per asset into an output directory.
#[derive(Debug, Clone)]
pub struct CsvSeriesWriter {
    output_dir: PathBuf,
}

impl CsvSeriesWriter {
    /// Create a writer for `output_dir`; the directory is created on first write.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory files are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render and write `<asset>.csv`, replacing any existing file.
    pub fn write_asset(
        &self,
        asset: &str,
        metric_ids: &[String],
        rows: &[ObservationRow],
    ) -> OutputResult<WrittenFile> {
        let path = asset_file_path(&self.output_dir, asset)?;
        let payload = render_csv(metric_ids, rows)?;

        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))?;
        std::fs::write(&path, payload.as_bytes()).map_err(|e| {
            OutputError::IoError(format!("Failed to write {}: {e}", path.display()))
        })?;

        debug!("Written ~{} bytes to {}", payload.len(), path.display());

        Ok(WrittenFile {
            path,
            rows: rows.len(),
            bytes: payload.len(),
        })
    }
}
