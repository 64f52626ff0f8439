//! Writer for the XML spreadsheet format

use super::{CELL_ELEMENT, CONTENTS_ELEMENT, NAME_ELEMENT, PATTERN_ATTRIBUTE, ROOT_ELEMENT};
use gridcalc_engine::engine::{CellName, Content};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;
use std::sync::Arc;

/// Write cells as a spreadsheet document. Cells are written in the order
/// given; empty contents are skipped.
pub fn write_sheet<'a, W, I>(writer: W, pattern: &str, cells: I) -> Result<(), quick_xml::Error>
where
    W: Write,
    I: IntoIterator<Item = (&'a CellName, &'a Content)>,
{
    let mut xml = Writer::new_with_indent(writer, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new(ROOT_ELEMENT);
    root.push_attribute((PATTERN_ATTRIBUTE, pattern));
    xml.write_event(Event::Start(root))?;

    for (name, content) in cells {
        if content.is_empty() {
            continue;
        }
        xml.write_event(Event::Start(BytesStart::new(CELL_ELEMENT)))?;
        write_text_element(&mut xml, NAME_ELEMENT, name.as_str())?;
        write_text_element(&mut xml, CONTENTS_ELEMENT, &content.to_string())?;
        xml.write_event(Event::End(BytesEnd::new(CELL_ELEMENT)))?;
    }

    xml.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
    xml.get_mut()
        .write_all(b"\n")
        .map_err(|e| quick_xml::Error::Io(Arc::new(e)))?;
    Ok(())
}

fn write_text_element<W: Write>(
    xml: &mut Writer<W>,
    element: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    xml.write_event(Event::Start(BytesStart::new(element)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}
