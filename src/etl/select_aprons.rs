use crate::data::osm::Way;
use crate::data::OsmDocument;

pub const APRON_KEY: &str = "aeroway";
pub const APRON_VALUE: &str = "apron";

pub fn is_apron(way: &Way) -> bool {
    way.has_kv_pair(APRON_KEY, APRON_VALUE)
}

/// Ways tagged `aeroway=apron`, in document order.
pub fn select_aprons(document: &OsmDocument) -> impl Iterator<Item = &Way> {
    document.ways().iter().filter(|way| is_apron(way))
}
