use std::path::Path;

use log::info;

use crate::config::UserConfig;
use crate::data::scenery::{Apron, SceneryDocument};
use crate::data::OsmDocument;
use crate::errors::{Error, ErrorKind, Result};

use super::parse_osm::read_osm_file;
use super::parse_scenery::read_scenery_file;
use super::resolve_vertices::{build_apron, count_unresolved, resolve_vertices};
use super::select_aprons::select_aprons;
use super::write_scenery::{append_aprons, save};
use super::Etl;

pub const ETL_NAME: &str = "apron_gen";

pub struct Documents {
    osm: OsmDocument,
    scenery: SceneryDocument,
}

pub struct Output {
    scenery: SceneryDocument,
    aprons: Vec<Apron>,
}

/// Copies the aprons of an OSM extract into a scenery file.
pub struct ApronGenEtl<'a> {
    osm_path: &'a Path,
    scenery_path: &'a Path,
    config: &'a UserConfig,
    appended: usize,
}

impl<'a> ApronGenEtl<'a> {
    pub fn new(osm_path: &'a Path, scenery_path: &'a Path, config: &'a UserConfig) -> ApronGenEtl<'a> {
        ApronGenEtl {
            osm_path,
            scenery_path,
            config,
            appended: 0,
        }
    }

    /// Number of aprons written by the last successful run.
    pub fn appended(&self) -> usize {
        self.appended
    }
}

impl Etl for ApronGenEtl<'_> {
    type Input = Documents;
    type Output = Output;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn extract(&mut self) -> Result<Self::Input> {
        let scenery = read_scenery_file(self.scenery_path)?;
        let osm = read_osm_file(self.osm_path)?;
        Ok(Documents { osm, scenery })
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let Documents { osm, scenery } = input;

        let candidates: Vec<_> = select_aprons(&osm).collect();
        if candidates.is_empty() {
            return Err(Error::new(ErrorKind::EmptyResult, "No aprons found in OSM file."));
        }
        println!("Found {} aprons.", candidates.len());
        info!(etl_name = ETL_NAME, aprons = candidates.len(); "Selected aprons");

        let mut aprons = Vec::with_capacity(candidates.len());
        for (idx, way) in candidates.iter().enumerate() {
            println!("\nProcessing apron {} of {}", idx + 1, candidates.len());

            let vertices = resolve_vertices(way, &osm);
            for vertex in &vertices {
                match vertex.coordinates() {
                    Some((lat, lon)) => println!("Added vertex {}, {}", lat, lon),
                    None => println!("Unresolved node reference {:?}", vertex.node_ref),
                }
            }
            let unresolved = count_unresolved(&vertices);
            if unresolved > 0 {
                println!("Warning: {} of {} vertices could not be resolved.", unresolved, vertices.len());
            }

            match build_apron(way, vertices, &self.config.surface, self.config.unresolved_vertices) {
                Some(apron) => aprons.push(apron),
                None => println!("Skipping apron {} of {}.", idx + 1, candidates.len()),
            }
        }

        Ok(Output { scenery, aprons })
    }

    fn load(&mut self, output: Self::Output) -> Result<()> {
        let Output { mut scenery, aprons } = output;
        let appended = append_aprons(&mut scenery, &self.config.container_element, &aprons)?;
        save(&scenery)?;
        info!(etl_name = ETL_NAME, appended = appended; "Wrote scenery file");
        self.appended = appended;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::config::UnresolvedVertexPolicy;

    const OSM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="10.0" lon="20.0"/>
  <node id="2" lat="10.1" lon="20.1"/>
  <way id="50">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="aeroway" v="apron"/>
  </way>
  <way id="51">
    <nd ref="2"/>
    <nd ref="1"/>
    <tag k="aeroway" v="taxiway"/>
  </way>
</osm>"#;

    const SCENERY: &str = "<?xml version=\"1.0\"?>\n<FSData>\n  <Airport ident=\"TEST\">\n    <Aprons>\n    </Aprons>\n  </Airport>\n</FSData>\n";

    fn workspace(osm: &str, scenery: &str) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("input.osm"), osm).unwrap();
        fs::write(dir.path().join("scenery.xml"), scenery).unwrap();
        dir
    }

    fn run(dir: &TempDir, config: &UserConfig) -> Result<usize> {
        let osm_path = dir.path().join("input.osm");
        let scenery_path = dir.path().join("scenery.xml");
        let mut etl = ApronGenEtl::new(&osm_path, &scenery_path, config);
        etl.process()?;
        Ok(etl.appended())
    }

    fn scenery(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join("scenery.xml")).unwrap()
    }

    #[test]
    fn writes_the_apron_into_the_container() {
        let dir = workspace(OSM, SCENERY);
        assert_eq!(run(&dir, &UserConfig::default()).unwrap(), 1);

        assert_eq!(
            scenery(&dir),
            "<?xml version=\"1.0\"?>\n<FSData>\n  <Airport ident=\"TEST\">\n    <Aprons>\n      <Apron surface=\"ASPHALT\">\n        <Vertex lat=\"10.0\" lon=\"20.0\"/>\n        <Vertex lat=\"10.1\" lon=\"20.1\"/>\n      </Apron>\n    </Aprons>\n  </Airport>\n</FSData>\n"
        );
    }

    #[test]
    fn running_twice_duplicates_the_aprons() {
        let dir = workspace(OSM, SCENERY);
        run(&dir, &UserConfig::default()).unwrap();
        run(&dir, &UserConfig::default()).unwrap();

        assert_eq!(scenery(&dir).matches("<Apron surface=\"ASPHALT\">").count(), 2);
        assert_eq!(scenery(&dir).matches("<Vertex lat=\"10.0\" lon=\"20.0\"/>").count(), 2);
    }

    #[test]
    fn no_aprons_leaves_the_scenery_untouched() {
        let osm = r#"<osm><node id="1" lat="1" lon="1"/><way id="1"><nd ref="1"/><tag k="aeroway" v="taxiway"/></way></osm>"#;
        let dir = workspace(osm, SCENERY);

        let err = run(&dir, &UserConfig::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyResult);
        assert_eq!(scenery(&dir), SCENERY);
    }

    #[test]
    fn missing_container_leaves_the_scenery_untouched() {
        let original = "<FSData><Airport/></FSData>";
        let dir = workspace(OSM, original);

        let err = run(&dir, &UserConfig::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingContainer);
        assert_eq!(scenery(&dir), original);
    }

    #[test]
    fn malformed_osm_is_a_parse_error() {
        let dir = workspace("<osm><way></osm>", SCENERY);

        let err = run(&dir, &UserConfig::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(scenery(&dir), SCENERY);
    }

    #[test]
    fn truncated_osm_leaves_the_scenery_untouched() {
        let truncated = r#"<osm><node id="1" lat="1" lon="2"/><way id="1"><nd ref="1"/><tag k="aeroway" v="apron"/></way>"#;
        let dir = workspace(truncated, SCENERY);

        let err = run(&dir, &UserConfig::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(scenery(&dir), SCENERY);
    }

    #[test]
    fn config_controls_surface_and_policy() {
        let osm = r#"<osm>
  <node id="1" lat="1" lon="2"/>
  <way id="1"><nd ref="1"/><nd ref="9"/><tag k="aeroway" v="apron"/></way>
  <way id="2"><nd ref="1"/><tag k="aeroway" v="apron"/></way>
</osm>"#;
        let dir = workspace(osm, "<Aprons/>");
        let config = UserConfig {
            surface: "CONCRETE".to_string(),
            unresolved_vertices: UnresolvedVertexPolicy::Abort,
            ..UserConfig::default()
        };

        assert_eq!(run(&dir, &config).unwrap(), 1);
        assert_eq!(
            scenery(&dir),
            "<Aprons>\n  <Apron surface=\"CONCRETE\">\n    <Vertex lat=\"1\" lon=\"2\"/>\n  </Apron>\n</Aprons>"
        );
    }
}
