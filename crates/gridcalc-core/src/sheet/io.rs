use super::Spreadsheet;
use crate::error::{Result, SheetError};
use crate::storage::{parse_sheet, write_sheet};
use gridcalc_engine::engine::NamePattern;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, debug_span};

impl Spreadsheet {
    /// Write the spreadsheet as XML, cells sorted by name. Does not clear
    /// [`Self::changed`]; see [`Self::save_file`].
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        let names = self.get_names_of_non_empty_cells();
        let cells = names
            .iter()
            .filter_map(|name| self.cells.get(name).map(|cell| (name, &cell.content)));
        write_sheet(writer, self.pattern.as_str(), cells)?;
        debug!(cells = names.len(), "saved spreadsheet");
        Ok(())
    }

    /// Read a spreadsheet written by [`Self::save`]. The result uses
    /// `pattern`; every stored name must satisfy both it and the pattern
    /// recorded in the document.
    pub fn load<R: BufRead>(reader: R, pattern: NamePattern) -> Result<Spreadsheet> {
        let _span = debug_span!("load", pattern = %pattern).entered();

        let document = parse_sheet(reader)?;
        let recorded = NamePattern::new(&document.pattern).map_err(|err| {
            SheetError::ReadFormat(format!(
                "invalid IsValid pattern {:?}: {}",
                document.pattern, err
            ))
        })?;

        let mut sheet = Spreadsheet::with_pattern(pattern);
        let mut seen = HashSet::new();
        for record in &document.cells {
            let name = recorded
                .check(&record.name)
                .filter(|name| sheet.pattern.matches(name))
                .ok_or_else(|| {
                    SheetError::ReadFormat(format!("invalid cell name {:?}", record.name))
                })?;
            if !seen.insert(name.clone()) {
                return Err(SheetError::ReadFormat(format!(
                    "cell {} appears more than once",
                    name
                )));
            }
            sheet
                .set_contents_of_cell(name.as_str(), &record.contents)
                .map_err(|err| SheetError::ReadFormat(format!("cell {}: {}", name, err)))?;
        }

        sheet.changed = false;
        debug!(cells = sheet.len(), "loaded spreadsheet");
        Ok(sheet)
    }

    /// Save to `path`, replacing any existing file, and mark the
    /// spreadsheet as saved.
    pub fn save_file(&mut self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer)?;
        writer.flush()?;
        self.mark_saved();
        Ok(())
    }

    pub fn load_file(path: &Path, pattern: NamePattern) -> Result<Spreadsheet> {
        let file = File::open(path)?;
        Self::load(BufReader::new(file), pattern)
    }
}
