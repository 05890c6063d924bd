use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PasConfig {
    pub stores: StoresSection,
    #[serde(default)]
    pub generation: GenerationSection,
}

impl PasConfig {
    pub fn resolve_path<P: AsRef<Path>>(&self, base: P, candidate: &str) -> PathBuf {
        let path = Path::new(candidate);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.as_ref().join(path)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoresSection {
    /// Primary entity store (authoritative).
    pub primary_db: String,
    /// Optional offline/cache store consulted when the primary returns
    /// nothing linked to a parent.
    pub cache_db: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSection {
    /// Joins internal and external staff when both are present.
    #[serde(default = "default_personnel_separator")]
    pub personnel_separator: String,
    /// Appended to the responsible-party name in the organisation section.
    #[serde(default = "default_responsable_suffix")]
    pub responsable_suffix: String,
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            personnel_separator: default_personnel_separator(),
            responsable_suffix: default_responsable_suffix(),
        }
    }
}

fn default_personnel_separator() -> String {
    " / ".to_string()
}

fn default_responsable_suffix() -> String {
    " (Responsable sécurité)".to_string()
}

pub fn load_pas_config<P: AsRef<Path>>(path: P) -> Result<PasConfig> {
    load_toml(path)
}

fn load_toml<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        source,
        path: path.to_path_buf(),
    })
}
