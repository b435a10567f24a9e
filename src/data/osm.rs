pub type OsmId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: OsmId,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Way {
    pub id: Option<OsmId>,
    pub tags: Vec<Tag>,
    /// Vertex order of the outline. A `<nd>` without a `ref` is kept as an
    /// empty reference.
    pub node_refs: Vec<OsmId>,
}

impl Way {
    pub fn has_kv_pair(&self, key: &str, value: &str) -> bool {
        self.tags.iter()
            .any(|tag| tag.key == key && tag.value == value)
    }
}
