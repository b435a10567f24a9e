use std::fs;

use log::debug;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

use crate::data::scenery::{Apron, SceneryDocument, Vertex, UTF8_BOM};
use crate::errors::{Error, ErrorKind, Result};

pub const APRON_ELEMENT: &str = "Apron";
pub const VERTEX_ELEMENT: &str = "Vertex";

const INDENT: &str = "  ";

#[derive(Debug)]
enum Container {
    /// `<Aprons>…</Aprons>`, `end` is the index of the closing event.
    Open { end: usize, depth: usize },
    /// `<Aprons/>` at `index`.
    SelfClosing { index: usize, depth: usize, start: BytesStart<'static> },
}

/// First element named `tag` in document order.
fn locate_container(events: &[Event<'static>], tag: &str) -> Option<Container> {
    let tag = tag.as_bytes();
    let mut depth: usize = 0;
    let mut open_at: Option<usize> = None;

    for (index, event) in events.iter().enumerate() {
        match event {
            Event::Start(e) => {
                if open_at.is_none() && e.name().as_ref() == tag {
                    open_at = Some(depth);
                }
                depth += 1;
            },
            Event::Empty(e) if open_at.is_none() && e.name().as_ref() == tag => {
                return Some(Container::SelfClosing { index, depth, start: e.clone() })
            },
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if open_at == Some(depth) {
                    return Some(Container::Open { end: index, depth })
                }
            },
            _ => (),
        }
    }
    None
}

fn whitespace(depth: usize) -> Event<'static> {
    Event::Text(BytesText::from_escaped(format!("\n{}", INDENT.repeat(depth))))
}

fn is_whitespace_text(event: &Event) -> bool {
    match event {
        Event::Text(text) => text.iter().all(u8::is_ascii_whitespace),
        _ => false,
    }
}

fn vertex_event(vertex: &Vertex) -> Event<'static> {
    let mut el = BytesStart::new(VERTEX_ELEMENT);
    // Unresolved coordinates are written as empty attributes.
    el.push_attribute(("lat", vertex.lat.as_deref().unwrap_or("")));
    el.push_attribute(("lon", vertex.lon.as_deref().unwrap_or("")));
    Event::Empty(el)
}

/// Events for one `<Apron>` element whose start tag sits at `depth`.
fn apron_events(apron: &Apron, depth: usize) -> Vec<Event<'static>> {
    let mut start = BytesStart::new(APRON_ELEMENT);
    start.push_attribute(("surface", apron.surface.as_str()));

    if apron.vertices.is_empty() {
        return vec![Event::Empty(start)];
    }

    let mut events = vec![Event::Start(start)];
    for vertex in &apron.vertices {
        events.push(whitespace(depth + 1));
        events.push(vertex_event(vertex));
    }
    events.push(whitespace(depth));
    events.push(Event::End(BytesEnd::new(APRON_ELEMENT)));
    events
}

/// Appends `aprons` as the last children of the first `container` element.
/// Returns the number of aprons appended.
pub fn append_aprons(document: &mut SceneryDocument, container: &str, aprons: &[Apron]) -> Result<usize> {
    let located = locate_container(document.events(), container).ok_or_else(|| {
        Error::new(
            ErrorKind::MissingContainer,
            format!("No <{}> element in {}", container, document.path().display()),
        )
    })?;
    let depth = match &located {
        Container::Open { depth, .. } | Container::SelfClosing { depth, .. } => *depth,
    };

    let mut inserted = Vec::new();
    for apron in aprons {
        inserted.push(whitespace(depth + 1));
        inserted.extend(apron_events(apron, depth + 1));
    }

    let events = document.events_mut();
    match located {
        Container::Open { end, .. } => {
            // Keep the whitespace before the closing tag after the new aprons.
            let at = if is_whitespace_text(&events[end - 1]) {
                end - 1
            } else {
                if !aprons.is_empty() {
                    inserted.push(whitespace(depth));
                }
                end
            };
            debug!(container = container, at = at, aprons = aprons.len(); "Appending to container");
            events.splice(at..at, inserted);
        },
        Container::SelfClosing { index, start, .. } => {
            if aprons.is_empty() {
                return Ok(0);
            }
            inserted.insert(0, Event::Start(start));
            inserted.push(whitespace(depth));
            inserted.push(Event::End(BytesEnd::new(container.to_string())));
            debug!(container = container, at = index, aprons = aprons.len(); "Expanding self-closing container");
            events.splice(index..=index, inserted);
        },
    }
    Ok(aprons.len())
}

pub fn render(document: &SceneryDocument) -> Result<Vec<u8>> {
    let out = if document.has_bom() { UTF8_BOM.to_vec() } else { Vec::new() };
    let mut writer = Writer::new(out);
    for event in document.events() {
        writer.write_event(event)?;
    }
    Ok(writer.into_inner())
}

/// Overwrites the document's source file. The output is rendered before the
/// file is opened, so a failed render leaves the file alone.
pub fn save(document: &SceneryDocument) -> Result<()> {
    let bytes = render(document)?;
    fs::write(document.path(), bytes)?;
    Ok(())
}
