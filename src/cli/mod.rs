//! Command-line interface

pub mod error;
pub mod export;

pub use error::CliError;
pub use export::{export, Cli};
