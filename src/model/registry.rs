use serde::{Deserialize, Serialize};

use crate::model::item::Kind;

/// The collection registry from collections.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Registry {
    #[serde(default)]
    pub collections: Vec<CollectionEntry>,
}

/// One collection: a named partition of items with its own storage file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub kind: Kind,
    /// Storage file, relative to the data directory.
    pub file: String,
    /// Optional seed CSV used when the collection is empty on first load.
    #[serde(default)]
    pub seed: Option<String>,
}

impl Registry {
    pub fn find(&self, id: &str) -> Option<&CollectionEntry> {
        self.collections.iter().find(|c| c.id == id)
    }
}
