use std::collections::HashMap;
use std::collections::hash_map::Entry;

use self::osm::{Node, OsmId, Way};

pub mod osm;
pub mod scenery;

/// Map data as defined in the .osm file. Only nodes and ways are kept; nodes are
/// indexed by id so that resolving a way does not rescan the document.
#[derive(Debug, Default, Clone)]
pub struct OsmDocument {
    nodes: HashMap<OsmId, Node>,
    ways: Vec<Way>,
}

impl OsmDocument {
    /// Adds a node to the index. The first node seen for an id wins; returns
    /// false when the id was already taken.
    pub fn insert_node(&mut self, node: Node) -> bool {
        match self.nodes.entry(node.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(node);
                true
            }
        }
    }

    pub fn push_way(&mut self, way: Way) {
        self.ways.push(way);
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ways in document order.
    pub fn ways(&self) -> &[Way] {
        &self.ways
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, lat: &str) -> Node {
        Node { id: id.to_string(), lat: Some(lat.to_string()), lon: Some("0".to_string()) }
    }

    #[test]
    fn first_node_with_an_id_wins() {
        let mut document = OsmDocument::default();
        assert!(document.insert_node(node("7", "1.0")));
        assert!(!document.insert_node(node("7", "2.0")));

        assert_eq!(document.node_count(), 1);
        assert_eq!(document.node("7").and_then(|n| n.lat.as_deref()), Some("1.0"));
        assert!(document.node("8").is_none());
    }
}
