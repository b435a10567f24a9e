use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use quick_xml::events::{BytesText, Event};
use quick_xml::reader::Reader;

use crate::data::scenery::{SceneryDocument, UTF8_BOM};
use crate::errors::{Error, Result};

/// Drops a byte order mark left at the front of the first text event.
fn strip_bom(events: &mut Vec<Event<'static>>) {
    let rest = match events.first() {
        Some(Event::Text(text)) if text.starts_with(UTF8_BOM) => text[UTF8_BOM.len()..].to_vec(),
        _ => return,
    };
    if rest.is_empty() {
        events.remove(0);
    } else {
        events[0] = Event::Text(BytesText::from_escaped(String::from_utf8_lossy(&rest).into_owned()));
    }
}

/// Reads every event of a scenery document. Text is not trimmed so the
/// document can be written back unchanged.
pub fn parse_scenery<R: BufRead>(path: &Path, mut reader: Reader<R>) -> Result<SceneryDocument> {
    let mut buf = Vec::new();
    let mut events = Vec::new();
    let mut depth: usize = 0;
    let mut seen_root = false;
    let bom = reader.get_mut().fill_buf()?.starts_with(UTF8_BOM);

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            event => {
                match &event {
                    Event::Start(_) => {
                        seen_root = true;
                        depth += 1;
                    },
                    Event::Empty(_) => seen_root = true,
                    Event::End(_) => depth = depth.saturating_sub(1),
                    _ => (),
                }
                events.push(event.into_owned());
            },
        }
        buf.clear();
    }

    if !seen_root {
        return Err(Error::parse("scenery document has no root element"));
    }
    if depth != 0 {
        return Err(Error::parse(format!("scenery document ends with {} unclosed element(s)", depth)));
    }
    if bom {
        strip_bom(&mut events);
    }
    debug!(events = events.len(), bom = bom; "Parsed scenery document");
    Ok(SceneryDocument::new(path.to_path_buf(), events, bom))
}

pub fn read_scenery_file(path: &Path) -> Result<SceneryDocument> {
    let file = fs::File::open(path)?;
    let reader = Reader::from_reader(BufReader::new(file));
    parse_scenery(path, reader).map_err(|err| {
        Error::new(err.kind, format!("{}: {}", path.display(), err.message))
    })
}
