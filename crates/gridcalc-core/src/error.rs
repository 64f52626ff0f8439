//! Error types for gridcalc core.

use thiserror::Error;

use gridcalc_engine::engine::{CellName, CycleError, FormulaFormatError};

/// Errors raised by spreadsheet operations.
///
/// Formula evaluation failures are not errors: they are stored as
/// [`Value::Error`](gridcalc_engine::engine::Value::Error) cell values.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid cell name: {0}")]
    InvalidName(String),

    #[error("Formula format error: {0}")]
    FormulaFormat(#[from] FormulaFormatError),

    #[error("Circular dependency detected at {cell}: {cycle}")]
    CircularDependency {
        cell: CellName,
        #[source]
        cycle: CycleError,
    },

    #[error("Invalid spreadsheet file: {0}")]
    ReadFormat(String),

    #[error("Invalid name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
