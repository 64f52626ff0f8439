//! Parser for the XML spreadsheet format

use super::{CELL_ELEMENT, CONTENTS_ELEMENT, NAME_ELEMENT, PATTERN_ATTRIBUTE, ROOT_ELEMENT};
use crate::error::{Result, SheetError};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::BufRead;

/// One `<cell>` element: a name and contents exactly as stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellRecord {
    pub name: String,
    pub contents: String,
}

/// A structurally valid spreadsheet document. Cell names and contents are
/// not interpreted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetDocument {
    pub pattern: String,
    pub cells: Vec<CellRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Name,
    Contents,
}

impl Field {
    fn from_element(element: &[u8]) -> Option<Field> {
        if element == NAME_ELEMENT.as_bytes() {
            Some(Field::Name)
        } else if element == CONTENTS_ELEMENT.as_bytes() {
            Some(Field::Contents)
        } else {
            None
        }
    }

    fn element(self) -> &'static str {
        match self {
            Field::Name => NAME_ELEMENT,
            Field::Contents => CONTENTS_ELEMENT,
        }
    }
}

#[derive(Debug, Default)]
struct PartialCell {
    name: Option<String>,
    contents: Option<String>,
}

impl PartialCell {
    fn set(&mut self, field: Field, text: String) -> Result<()> {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Contents => &mut self.contents,
        };
        if slot.is_some() {
            return Err(read_error(format!("duplicate <{}> in <cell>", field.element())));
        }
        *slot = Some(text);
        Ok(())
    }

    fn finish(self) -> Result<CellRecord> {
        match (self.name, self.contents) {
            (Some(name), Some(contents)) => Ok(CellRecord { name, contents }),
            (None, _) => Err(read_error("<cell> is missing <name>")),
            (_, None) => Err(read_error("<cell> is missing <contents>")),
        }
    }
}

/// Where the parser is in the document.
enum State {
    /// Before the root element
    Prolog,
    /// Inside `<spreadsheet>`
    Sheet,
    /// Inside `<cell>`
    Cell(PartialCell),
    /// Inside `<name>` or `<contents>`
    Field(PartialCell, Field, String),
    /// After the root element closed
    Epilog,
}

fn read_error(message: impl Into<String>) -> SheetError {
    SheetError::ReadFormat(message.into())
}

fn xml_error(err: impl std::fmt::Display) -> SheetError {
    read_error(format!("malformed XML: {}", err))
}

fn root_pattern(element: &BytesStart<'_>) -> Result<String> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref() == PATTERN_ATTRIBUTE.as_bytes() {
            return Ok(attr.unescape_value().map_err(xml_error)?.into_owned());
        }
    }
    Err(read_error(format!(
        "<{}> is missing the {} attribute",
        ROOT_ELEMENT, PATTERN_ATTRIBUTE
    )))
}

fn is_whitespace(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn element_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parse and structurally check a spreadsheet document.
pub fn parse_sheet<R: BufRead>(reader: R) -> Result<SheetDocument> {
    let mut xml = Reader::from_reader(reader);
    let mut buf = Vec::new();
    let mut pattern: Option<String> = None;
    let mut cells = Vec::new();
    let mut state = State::Prolog;

    loop {
        let event = xml.read_event_into(&mut buf).map_err(xml_error)?;
        state = match (state, event) {
            (State::Epilog, Event::Eof) => break,
            (_, Event::Eof) => return Err(read_error("unexpected end of document")),
            (state, Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_)) => {
                state
            }

            (State::Field(cell, field, mut text), Event::Text(t)) => {
                text.push_str(&t.unescape().map_err(xml_error)?);
                State::Field(cell, field, text)
            }
            (State::Field(cell, field, mut text), Event::CData(data)) => {
                text.push_str(&String::from_utf8_lossy(&data));
                State::Field(cell, field, text)
            }
            (State::Field(mut cell, field, text), Event::End(_)) => {
                cell.set(field, text)?;
                State::Cell(cell)
            }
            (State::Field(_, field, _), _) => {
                return Err(read_error(format!(
                    "<{}> may only contain text",
                    field.element()
                )));
            }

            (state, Event::Text(t)) => {
                if !is_whitespace(&t) {
                    return Err(read_error("unexpected text outside <name> and <contents>"));
                }
                state
            }

            (State::Prolog, Event::Start(e)) if e.local_name().as_ref() == ROOT_ELEMENT.as_bytes() => {
                pattern = Some(root_pattern(&e)?);
                State::Sheet
            }
            (State::Prolog, Event::Empty(e)) if e.local_name().as_ref() == ROOT_ELEMENT.as_bytes() => {
                pattern = Some(root_pattern(&e)?);
                State::Epilog
            }
            (State::Prolog, Event::Start(e) | Event::Empty(e)) => {
                return Err(read_error(format!(
                    "expected <{}> root element, found <{}>",
                    ROOT_ELEMENT,
                    element_name(e.local_name().as_ref())
                )));
            }

            (State::Sheet, Event::Start(e)) if e.local_name().as_ref() == CELL_ELEMENT.as_bytes() => {
                State::Cell(PartialCell::default())
            }
            (State::Sheet, Event::End(_)) => State::Epilog,

            (State::Cell(cell), Event::Start(e)) => {
                match Field::from_element(e.local_name().as_ref()) {
                    Some(field) => State::Field(cell, field, String::new()),
                    None => {
                        return Err(read_error(format!(
                            "unexpected <{}> in <cell>",
                            element_name(e.local_name().as_ref())
                        )));
                    }
                }
            }
            (State::Cell(mut cell), Event::Empty(e)) => {
                match Field::from_element(e.local_name().as_ref()) {
                    Some(field) => {
                        cell.set(field, String::new())?;
                        State::Cell(cell)
                    }
                    None => {
                        return Err(read_error(format!(
                            "unexpected <{}> in <cell>",
                            element_name(e.local_name().as_ref())
                        )));
                    }
                }
            }
            (State::Cell(cell), Event::End(_)) => {
                cells.push(cell.finish()?);
                State::Sheet
            }

            (State::Epilog, Event::Start(_) | Event::Empty(_)) => {
                return Err(read_error("document has more than one root element"));
            }
            (State::Sheet, Event::Start(e) | Event::Empty(e)) => {
                return Err(read_error(format!(
                    "unexpected <{}> in <{}>",
                    element_name(e.local_name().as_ref()),
                    ROOT_ELEMENT
                )));
            }
            (_, event) => {
                return Err(read_error(format!("unexpected XML event {:?}", event)));
            }
        };
        buf.clear();
    }

    let pattern = pattern.ok_or_else(|| read_error("missing root element"))?;
    Ok(SheetDocument { pattern, cells })
}
