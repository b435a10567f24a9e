use std::path::{Path, PathBuf};

use quick_xml::events::Event;

use super::osm::OsmId;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A scenery file held as the owned sequence of XML events it was read as.
/// Writing the events back reproduces the file, so anything not touched by
/// the writer keeps its original bytes.
#[derive(Debug, Clone)]
pub struct SceneryDocument {
    path: PathBuf,
    events: Vec<Event<'static>>,
    bom: bool,
}

impl SceneryDocument {
    pub fn new(path: PathBuf, events: Vec<Event<'static>>, bom: bool) -> Self {
        SceneryDocument { path, events, bom }
    }

    /// Whether the source file started with a UTF-8 byte order mark.
    pub fn has_bom(&self) -> bool {
        self.bom
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn events(&self) -> &[Event<'static>] {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut Vec<Event<'static>> {
        &mut self.events
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    pub node_ref: OsmId,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl Vertex {
    /// Both coordinates, or nothing if the reference did not resolve fully.
    pub fn coordinates(&self) -> Option<(&str, &str)> {
        Some((self.lat.as_deref()?, self.lon.as_deref()?))
    }

    pub fn is_resolved(&self) -> bool {
        self.coordinates().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apron {
    pub surface: String,
    pub vertices: Vec<Vertex>,
}
