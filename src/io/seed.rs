use std::path::Path;

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::model::registry::CollectionEntry;

/// Read the seed CSV for a collection, if one is configured.
///
/// A missing or unreadable seed file is not an error — the collection just
/// starts empty — but the miss is logged so it can be diagnosed later.
pub fn load_seed(data_dir: &Path, entry: &CollectionEntry) -> Option<String> {
    let seed = entry.seed.as_deref()?;
    let path = data_dir.join(seed);
    match std::fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(e) => {
            log_recovery(
                data_dir,
                RecoveryEntry::new(RecoveryCategory::Seed, "seed dataset unavailable")
                    .field("Collection", &entry.id)
                    .field("Seed", seed)
                    .field("Error", e.to_string()),
            );
            None
        }
    }
}
