//! Spreadsheet file format.
//!
//! Spreadsheets are stored as XML:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <spreadsheet IsValid="^[A-Z]+[1-9][0-9]*$">
//!   <cell>
//!     <name>A1</name>
//!     <contents>5</contents>
//!   </cell>
//! </spreadsheet>
//! ```
//!
//! `IsValid` records the name pattern the spreadsheet was saved with.
//! Contents are the text a user would type: numbers in shortest round-trip
//! form, formulas with a leading `=`, text verbatim.

mod parser;
mod writer;

pub use parser::{CellRecord, SheetDocument, parse_sheet};
pub use writer::write_sheet;

pub(crate) const ROOT_ELEMENT: &str = "spreadsheet";
pub(crate) const PATTERN_ATTRIBUTE: &str = "IsValid";
pub(crate) const CELL_ELEMENT: &str = "cell";
pub(crate) const NAME_ELEMENT: &str = "name";
pub(crate) const CONTENTS_ELEMENT: &str = "contents";
