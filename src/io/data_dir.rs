use std::fs;
use std::path::{Path, PathBuf};

use crate::model::registry::Registry;

pub const REGISTRY_FILE: &str = "collections.toml";

/// Error type for data-directory operations
#[derive(Debug, thiserror::Error)]
pub enum DataDirError {
    #[error("not a hylle data directory: no hylle/collections.toml found")]
    NotFound,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse collections.toml: {0}")]
    RegistryParseError(#[from] toml::de::Error),
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
}

/// Discover the data directory by walking up from `start`, looking for a
/// `hylle/` subdirectory containing `collections.toml`.
pub fn discover_data_dir(start: &Path) -> Result<PathBuf, DataDirError> {
    let mut current = start.to_path_buf();
    loop {
        let data_dir = current.join("hylle");
        if data_dir.is_dir() && data_dir.join(REGISTRY_FILE).exists() {
            return Ok(data_dir);
        }
        if !current.pop() {
            return Err(DataDirError::NotFound);
        }
    }
}

/// Load the collection registry from the data directory.
pub fn read_registry(data_dir: &Path) -> Result<Registry, DataDirError> {
    let path = data_dir.join(REGISTRY_FILE);
    let text = fs::read_to_string(&path).map_err(|e| DataDirError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}
