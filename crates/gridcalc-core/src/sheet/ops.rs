use super::Spreadsheet;
use crate::error::{Result, SheetError};
use gridcalc_engine::engine::{Cell, CellName, Content, Formula, cells_to_recalculate};
use tracing::{debug, warn};

impl Spreadsheet {
    /// Set the contents of a cell from user input and recompute every
    /// affected value.
    ///
    /// Input that parses as a finite number becomes a number, input starting
    /// with `=` becomes a formula over cell names, anything else is text.
    /// Empty input clears the cell.
    ///
    /// Returns the cell and all of its transitive dependents in
    /// recalculation order (empty when the cell was cleared). On error the
    /// spreadsheet is left unchanged.
    pub fn set_contents_of_cell(&mut self, name: &str, text: &str) -> Result<Vec<CellName>> {
        let name = self.canonical_name(name)?;
        if text.is_empty() {
            self.clear_cell(&name)?;
            return Ok(Vec::new());
        }

        let content = self.parse_content(text)?;
        let references: Vec<CellName> = content
            .formula()
            .map(|formula| {
                formula
                    .variables()
                    .into_iter()
                    .filter_map(CellName::parse)
                    .collect()
            })
            .unwrap_or_default();

        let previous = self.graph.replace_dependees(&name, references);
        let order = match cells_to_recalculate(&self.graph, [&name]) {
            Ok(order) => order,
            Err(cycle) => {
                self.graph.replace_dependees(&name, previous);
                warn!(cell = %name, %cycle, "rejected circular formula");
                return Err(SheetError::CircularDependency { cell: name, cycle });
            }
        };

        self.cells.insert(name.clone(), Cell::new(content));
        self.recompute(&order);
        self.changed = true;
        debug!(cell = %name, recalculated = order.len(), "set cell contents");

        Ok(order)
    }

    /// The cells that must be recomputed when `name` changes, in order.
    pub fn cells_to_recalculate(&self, name: &str) -> Result<Vec<CellName>> {
        let name = self.canonical_name(name)?;
        cells_to_recalculate(&self.graph, [&name])
            .map_err(|cycle| SheetError::CircularDependency { cell: name.clone(), cycle })
    }

    /// Classify non-empty input as a number, formula or text.
    fn parse_content(&self, text: &str) -> Result<Content> {
        if let Some(formula) = text.strip_prefix('=') {
            let upper = |v: &str| v.to_ascii_uppercase();
            let formula = Formula::parse_with(formula, &upper, &self.pattern)?;
            return Ok(Content::Formula(formula));
        }
        match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Content::Number(n)),
            _ => Ok(Content::Text(text.to_string())),
        }
    }

    /// Remove a cell and refresh the cells that referenced it.
    fn clear_cell(&mut self, name: &CellName) -> Result<()> {
        let order = cells_to_recalculate(&self.graph, [name]).map_err(|cycle| {
            SheetError::CircularDependency {
                cell: name.clone(),
                cycle,
            }
        })?;

        self.graph.replace_dependees(name, Vec::new());
        self.cells.remove(name);
        self.recompute(&order);
        self.changed = true;
        debug!(cell = %name, recalculated = order.len(), "cleared cell");

        Ok(())
    }
}
