use crate::error::{Result, SheetError};
use gridcalc_engine::engine::{Cell, CellName, Content, DependencyGraph, NamePattern, Value};
use std::collections::HashMap;

/// A spreadsheet: the cell store, the references between cells and the
/// validity pattern every cell name must satisfy.
///
/// Every successful mutation leaves each cell's value consistent with its
/// content and the contents of the cells it references. Failed mutations
/// leave the spreadsheet untouched.
#[derive(Clone, Debug, Default)]
pub struct Spreadsheet {
    /// Non-empty cells keyed by canonical name
    pub(crate) cells: HashMap<CellName, Cell>,
    /// (dependee, dependent) edges for every formula cell
    pub(crate) graph: DependencyGraph,
    /// Names must match this on top of the cell name grammar
    pub(crate) pattern: NamePattern,
    /// Whether contents changed since the last save
    pub(crate) changed: bool,
}

impl Spreadsheet {
    /// Create an empty spreadsheet that accepts every grammatical cell name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty spreadsheet restricted to names matching `pattern`.
    pub fn with_pattern(pattern: NamePattern) -> Self {
        Spreadsheet {
            pattern,
            ..Self::default()
        }
    }

    /// Create an empty spreadsheet from the source text of a pattern.
    pub fn with_pattern_str(pattern: &str) -> Result<Self> {
        Ok(Self::with_pattern(NamePattern::new(pattern)?))
    }

    pub fn pattern(&self) -> &NamePattern {
        &self.pattern
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// True if any content changed since creation, load or [`Self::mark_saved`].
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn mark_saved(&mut self) {
        self.changed = false;
    }

    /// Canonicalize `name`, rejecting names outside the grammar or pattern.
    pub(crate) fn canonical_name(&self, name: &str) -> Result<CellName> {
        self.pattern
            .check(name)
            .ok_or_else(|| SheetError::InvalidName(name.to_string()))
    }

    /// The content of a cell; empty text for cells that were never set.
    pub fn get_cell_contents(&self, name: &str) -> Result<Content> {
        let name = self.canonical_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.content.clone())
            .unwrap_or_default())
    }

    /// The value of a cell; empty text for cells that were never set.
    pub fn get_cell_value(&self, name: &str) -> Result<Value> {
        let name = self.canonical_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.value.clone())
            .unwrap_or_default())
    }

    /// Names of all non-empty cells, sorted.
    pub fn get_names_of_non_empty_cells(&self) -> Vec<CellName> {
        let mut names: Vec<CellName> = self.cells.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::{SheetError, Spreadsheet};

    #[test]
    fn test_with_pattern_str() {
        let sheet = Spreadsheet::with_pattern_str("^[A-B][0-9]$").unwrap();
        assert_eq!(sheet.pattern().as_str(), "^[A-B][0-9]$");
        assert!(sheet.is_empty());
        assert!(!sheet.changed());
    }

    #[test]
    fn test_with_pattern_str_rejects_bad_regex() {
        assert!(matches!(
            Spreadsheet::with_pattern_str("[A-"),
            Err(SheetError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_names_are_sorted() {
        let mut sheet = Spreadsheet::new();
        for name in ["C2", "A10", "B1", "A2"] {
            sheet.set_contents_of_cell(name, "1").unwrap();
        }
        let names: Vec<String> = sheet
            .get_names_of_non_empty_cells()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, ["A10", "A2", "B1", "C2"]);
    }
}
