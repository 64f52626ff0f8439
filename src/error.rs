//! Error types for the gridcalc command line

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("Expected CELL=TEXT, got {0:?}")]
    InvalidAssignment(String),

    #[error("Refusing to read {path}: config file too large ({size} bytes, max {max})")]
    ConfigTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Failed to read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
