//! Data output writers

pub mod csv;
pub mod path;

pub use self::csv::{render_csv, CsvSeriesWriter, WrittenFile};
pub use path::asset_file_path;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Asset identifier unusable as a file name
    #[error("invalid file name for asset '{0}'")]
    InvalidFileName(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
