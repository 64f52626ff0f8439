//! gridcalc-core - Spreadsheet model + storage.

pub mod error;
pub mod sheet;
pub mod storage;

pub use error::{Result, SheetError};
pub use sheet::Spreadsheet;

pub use gridcalc_engine::engine::{
    CellName, Content, CycleError, Formula, FormulaError, FormulaFormatError, NamePattern, Value,
};
