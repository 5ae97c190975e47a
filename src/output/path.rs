//! Output file paths
//!
//! Each asset is written to `<output_dir>/<asset>.csv`. Asset identifiers
//! come from the remote catalog or the command line, so they are sanitized
//! before being used as file names.

use super::{OutputError, OutputResult};
use std::path::{Path, PathBuf};

/// Extension of exported files
pub const CSV_EXTENSION: &str = "csv";

/// Path of the CSV file for `asset` inside `output_dir`.
///
/// # Errors
/// Returns [`OutputError::InvalidFileName`] if nothing usable remains of the
/// asset identifier
pub fn asset_file_path(output_dir: &Path, asset: &str) -> OutputResult<PathBuf> {
    let stem = sanitize_asset(asset);
    if stem.is_empty() || stem.chars().all(|c| c == '.' || c == '_') {
        return Err(OutputError::InvalidFileName(asset.to_string()));
    }
    Ok(output_dir.join(format!("{stem}.{CSV_EXTENSION}")))
}

/// Sanitize an asset identifier for filesystem safety
///
/// Prevents path traversal by replacing dangerous characters:
/// - `/`, `\`, `:` → `_` (directory separators)
/// - `..` → `__` (parent directory reference)
///
/// Preserves case.
fn sanitize_asset(asset: &str) -> String {
    asset
        .trim()
        .replace("..", "__")
        .replace(['/', '\\', ':'], "_")
}
