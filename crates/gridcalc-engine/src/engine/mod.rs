//! Spreadsheet engine API.
//!
//! This module provides the computation core of the spreadsheet:
//!
//! - [`CellName`], [`NamePattern`] - Cell name grammar and validity patterns
//! - [`Content`], [`Value`], [`Cell`] - What a cell stores and what it computes to
//! - [`tokenize`] - Split formula text into lexemes
//! - [`Formula`] - Parse, validate and evaluate infix formulas
//! - [`DependencyGraph`] - Track which cells reference which
//! - [`cells_to_recalculate`] - Dependency-ordered recalculation with cycle detection

mod cell;
mod cell_name;
mod deps;
mod formula;
mod recalc;
mod tokenizer;

pub use cell::{Cell, Content, Value};
pub use cell_name::{CellName, NamePattern};
pub use deps::DependencyGraph;
pub use formula::{
    AcceptAll, Formula, FormulaError, FormulaFormatError, Identity, Normalizer, Validator,
};
pub use recalc::{CycleError, cells_to_recalculate};
pub use tokenizer::{Lexeme, Operator, tokenize};
