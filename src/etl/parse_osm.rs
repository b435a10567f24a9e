use std::fs;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::Path;

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::osm::{Node, Tag, Way};
use crate::data::OsmDocument;
use crate::errors::{Error, Result};

enum ParserState {
    Top,
    Way(Way),
}

/// Value of the attribute `name`, unescaped. `None` if the element does not
/// carry it.
fn attribute(el: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        if attribute.key.as_ref() == name {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn parse_node(el: &BytesStart) -> Result<Option<Node>> {
    let Some(id) = attribute(el, b"id")? else {
        warn!("Skipping <node> without an id");
        return Ok(None)
    };
    Ok(Some(Node {
        id,
        lat: attribute(el, b"lat")?,
        lon: attribute(el, b"lon")?,
    }))
}

fn parse_way(el: &BytesStart) -> Result<Way> {
    Ok(Way {
        id: attribute(el, b"id")?,
        ..Way::default()
    })
}

/// Attaches a `<tag>` or `<nd>` child to the way being read. Children of any
/// other element (node and relation tags, relation members) are ignored.
fn parse_way_child(state: &mut ParserState, el: &BytesStart) -> Result<()> {
    let ParserState::Way(way) = state else {
        return Ok(())
    };
    match el.name().as_ref() {
        b"tag" => {
            match (attribute(el, b"k")?, attribute(el, b"v")?) {
                (Some(key), Some(value)) => way.tags.push(Tag { key, value }),
                _ => warn!(way = way.id.as_deref().unwrap_or(""); "Skipping <tag> without k or v"),
            }
        },
        b"nd" => {
            let node_ref = attribute(el, b"ref")?.unwrap_or_else(|| {
                warn!(way = way.id.as_deref().unwrap_or(""); "<nd> without a ref, it will not resolve");
                String::new()
            });
            way.node_refs.push(node_ref);
        },
        _ => (),
    }
    Ok(())
}

fn finish_way(state: &mut ParserState, document: &mut OsmDocument) {
    if let ParserState::Way(way) = mem::replace(state, ParserState::Top) {
        debug!(way = way.id.as_deref().unwrap_or(""), tags = way.tags.len(), node_refs = way.node_refs.len(); "Parsed way");
        document.push_way(way);
    }
}

/// Reads the nodes and ways of an OSM XML document.
pub fn parse_osm<R: BufRead>(mut reader: Reader<R>) -> Result<OsmDocument> {
    let mut buf = Vec::new();
    let mut document = OsmDocument::default();
    let mut state = ParserState::Top;
    let mut seen_root = false;
    let mut depth: usize = 0;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                seen_root = true;
                depth += 1;
                match e.name().as_ref() {
                    b"node" => {
                        if let Some(node) = parse_node(&e)? {
                            document.insert_node(node);
                        }
                    },
                    b"way" => state = ParserState::Way(parse_way(&e)?),
                    _ => parse_way_child(&mut state, &e)?,
                }
            },
            Event::Empty(e) => {
                seen_root = true;
                match e.name().as_ref() {
                    b"node" => {
                        if let Some(node) = parse_node(&e)? {
                            document.insert_node(node);
                        }
                    },
                    b"way" => document.push_way(parse_way(&e)?),
                    _ => parse_way_child(&mut state, &e)?,
                }
            },
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if e.name().as_ref() == b"way" {
                    finish_way(&mut state, &mut document);
                }
            },
            // Declarations, comments and text carry nothing we use.
            _ => (),
        }
        buf.clear();
    };

    if !seen_root {
        return Err(Error::parse("OSM document has no root element"));
    }
    if depth != 0 || matches!(state, ParserState::Way(_)) {
        return Err(Error::parse(format!("OSM document ends with {} unclosed element(s)", depth)));
    }
    debug!(nodes = document.node_count(), ways = document.ways().len(); "Parsed OSM document");
    Ok(document)
}

fn is_xz(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xz"))
}

fn create_osm_reader(path: &Path) -> Result<Reader<Box<dyn BufRead>>> {
    let file = fs::File::open(path)?;
    let file_reader = BufReader::new(file);
    let inner: Box<dyn BufRead> = if is_xz(path) {
        Box::new(BufReader::new(XzDecoder::new(file_reader)))
    } else {
        Box::new(file_reader)
    };
    let mut reader = Reader::from_reader(inner);
    reader.trim_text(true);

    Ok(reader)
}

/// Loads an `.osm` file, or an `.osm.xz` file decompressed on the fly.
pub fn read_osm_file(path: &Path) -> Result<OsmDocument> {
    let reader = create_osm_reader(path)?;
    parse_osm(reader).map_err(|err| {
        Error::new(err.kind, format!("{}: {}", path.display(), err.message))
    })
}
