use super::Spreadsheet;
use crate::error::Result;
use gridcalc_engine::engine::{CellName, Formula, Value};

impl Spreadsheet {
    /// Numeric value of a cell as seen by formulas. Text, errors and empty
    /// cells are undefined.
    pub(crate) fn lookup(&self, variable: &str) -> Option<f64> {
        self.cells.get(variable).and_then(|cell| cell.value.as_number())
    }

    /// Recompute cell values in `order`, which must list every cell after
    /// the cells it references. Cells no longer in the store are skipped.
    pub(crate) fn recompute(&mut self, order: &[CellName]) {
        for name in order {
            let Some(cell) = self.cells.get(name) else {
                continue;
            };
            let value = cell.content.evaluate(|v| self.lookup(v));
            if let Some(cell) = self.cells.get_mut(name) {
                cell.value = value;
            }
        }
    }

    /// Evaluate a standalone formula against the current cell values,
    /// without storing it. A leading `=` is optional.
    pub fn evaluate(&self, formula: &str) -> Result<Value> {
        let text = formula.strip_prefix('=').unwrap_or(formula);
        let upper = |v: &str| v.to_ascii_uppercase();
        let formula = Formula::parse_with(text, &upper, &self.pattern)?;
        Ok(match formula.evaluate(|v| self.lookup(v)) {
            Ok(n) => Value::Number(n),
            Err(err) => Value::Error(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{SheetError, Spreadsheet, Value};

    #[test]
    fn test_evaluate_reads_current_values() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents_of_cell("A1", "4").unwrap();
        sheet.set_contents_of_cell("A2", "=A1/2").unwrap();
        assert_eq!(sheet.evaluate("=a1 + a2").unwrap(), Value::Number(6.0));
        assert_eq!(sheet.evaluate("(1 + 2) * 3").unwrap(), Value::Number(9.0));
        assert!(sheet.evaluate("B7 + 1").unwrap().is_error());
        assert_eq!(sheet.len(), 2);
    }

    #[test]
    fn test_evaluate_rejects_bad_syntax() {
        let sheet = Spreadsheet::new();
        assert!(matches!(sheet.evaluate("1 +"), Err(SheetError::FormulaFormat(_))));
    }
}
