use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{Error, ErrorKind, Result};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "APRONGEN_CONFIG";

/// What to do with a node reference that has no matching node (or a node
/// without coordinates).
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedVertexPolicy {
    /// Keep the vertex with empty `lat`/`lon` attributes.
    #[default]
    Emit,
    /// Drop the vertex from the outline.
    Skip,
    /// Drop the whole apron.
    Abort,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    pub container_element: String,
    pub surface: String,
    pub unresolved_vertices: UnresolvedVertexPolicy,
    pub log_level: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            container_element: "Aprons".to_string(),
            surface: "ASPHALT".to_string(),
            unresolved_vertices: UnresolvedVertexPolicy::default(),
            log_level: "info".to_string(),
        }
    }
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path).map_err(|err| {
        Error::new(ErrorKind::Config, format!("Could not open config file {}: {}", path.display(), err))
    })?;
    let config: UserConfig = serde_json::from_reader(BufReader::new(file))?;
    if config.container_element.is_empty() {
        return Err(Error::new(ErrorKind::Config, "container_element must not be empty"));
    }
    Ok(config)
}

/// Reads the file named by `APRONGEN_CONFIG`, or falls back to the defaults.
pub fn load_from_env() -> Result<UserConfig> {
    match env::var_os(CONFIG_ENV_VAR) {
        Some(path) => load_user_config(Path::new(&path)),
        None => Ok(UserConfig::default()),
    }
}
