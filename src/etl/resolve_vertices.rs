use log::warn;

use crate::config::UnresolvedVertexPolicy;
use crate::data::osm::Way;
use crate::data::scenery::{Apron, Vertex};
use crate::data::OsmDocument;

/// One vertex per node reference of `way`, in the same order. References
/// without a node, or to a node lacking coordinates, come back with the
/// missing coordinates set to `None`.
pub fn resolve_vertices(way: &Way, document: &OsmDocument) -> Vec<Vertex> {
    way.node_refs.iter()
        .map(|node_ref| {
            let node = document.node(node_ref);
            Vertex {
                node_ref: node_ref.clone(),
                lat: node.and_then(|n| n.lat.clone()),
                lon: node.and_then(|n| n.lon.clone()),
            }
        })
        .collect()
}

pub fn count_unresolved(vertices: &[Vertex]) -> usize {
    vertices.iter().filter(|v| !v.is_resolved()).count()
}

/// Builds the apron for a resolved outline. Returns `None` when the policy
/// drops the whole apron.
pub fn build_apron(
    way: &Way,
    vertices: Vec<Vertex>,
    surface: &str,
    policy: UnresolvedVertexPolicy,
) -> Option<Apron> {
    let unresolved = count_unresolved(&vertices);
    if unresolved > 0 {
        warn!(
            way = way.id.as_deref().unwrap_or(""),
            unresolved = unresolved,
            total = vertices.len();
            "Apron has unresolved node references"
        );
    }

    let vertices = match policy {
        UnresolvedVertexPolicy::Emit => vertices,
        UnresolvedVertexPolicy::Skip => vertices.into_iter().filter(Vertex::is_resolved).collect(),
        UnresolvedVertexPolicy::Abort if unresolved > 0 => return None,
        UnresolvedVertexPolicy::Abort => vertices,
    };

    Some(Apron {
        surface: surface.to_string(),
        vertices,
    })
}

#[cfg(test)]
mod tests {
    use quick_xml::reader::Reader;

    use super::*;
    use crate::etl::parse_osm::parse_osm;

    fn document() -> OsmDocument {
        let xml = r#"<osm>
  <node id="1" lat="51.5" lon="-0.12"/>
  <node id="2" lat="51.500000" lon="-0.1200"/>
  <node id="3" lat="1e1"/>
  <node id="2" lat="99" lon="99"/>
  <way id="10">
    <nd ref="2"/><nd ref="1"/><nd ref="404"/><nd ref="3"/><nd ref="1"/>
    <tag k="aeroway" v="apron"/>
  </way>
</osm>"#;
        parse_osm(Reader::from_str(xml)).unwrap()
    }

    #[test]
    fn keeps_reference_order_and_exact_strings() {
        let document = document();
        let way = &document.ways()[0];
        let vertices = resolve_vertices(way, &document);

        let refs: Vec<&str> = vertices.iter().map(|v| v.node_ref.as_str()).collect();
        assert_eq!(refs, vec!["2", "1", "404", "3", "1"]);

        // First node with id 2 wins, strings are not normalised.
        assert_eq!(vertices[0].coordinates(), Some(("51.500000", "-0.1200")));
        assert_eq!(vertices[1].coordinates(), Some(("51.5", "-0.12")));
        assert_eq!(vertices[2].lat, None);
        assert_eq!(vertices[3].lat.as_deref(), Some("1e1"));
        assert!(!vertices[3].is_resolved());
        assert_eq!(count_unresolved(&vertices), 2);
    }

    #[test]
    fn emit_policy_keeps_every_vertex() {
        let document = document();
        let way = &document.ways()[0];
        let apron = build_apron(way, resolve_vertices(way, &document), "ASPHALT", UnresolvedVertexPolicy::Emit).unwrap();

        assert_eq!(apron.surface, "ASPHALT");
        assert_eq!(apron.vertices.len(), way.node_refs.len());
    }

    #[test]
    fn skip_policy_drops_unresolved_vertices() {
        let document = document();
        let way = &document.ways()[0];
        let apron = build_apron(way, resolve_vertices(way, &document), "ASPHALT", UnresolvedVertexPolicy::Skip).unwrap();

        let refs: Vec<&str> = apron.vertices.iter().map(|v| v.node_ref.as_str()).collect();
        assert_eq!(refs, vec!["2", "1", "1"]);
    }

    #[test]
    fn abort_policy_drops_incomplete_aprons_only() {
        let document = document();
        let way = &document.ways()[0];
        assert!(build_apron(way, resolve_vertices(way, &document), "ASPHALT", UnresolvedVertexPolicy::Abort).is_none());

        let complete = Way { node_refs: vec!["1".to_string(), "2".to_string()], ..Way::default() };
        let apron = build_apron(&complete, resolve_vertices(&complete, &document), "CONCRETE", UnresolvedVertexPolicy::Abort).unwrap();
        assert_eq!(apron.vertices.len(), 2);
        assert_eq!(apron.surface, "CONCRETE");
    }
}
