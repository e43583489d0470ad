use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::model::item::Item;

/// Schema version written on every persist. Version history:
/// 0 = tag-less array (star ratings, games `owned`, `uncertain` vocabulary),
/// 1 = tag-less/enveloped `owned` era, 2 = condition triad.
pub const SCHEMA_VERSION: u32 = 2;

/// Result of reading a collection's storage blob.
#[derive(Debug)]
pub enum BlobRead {
    /// No file yet — a brand-new collection.
    Missing,
    /// Unparsable JSON or an unrecognized shape. Carries a description for
    /// the recovery log; the collection loads as empty.
    Malformed(String),
    /// Raw item records plus the schema version they were persisted at.
    Loaded { version: u32, raw_items: Vec<Value> },
}

/// Read a storage blob. Accepts the current `{"schema": N, "items": [...]}`
/// envelope and, for data written before versioning, a bare top-level array
/// (treated as version 0).
pub fn read_blob(path: &Path) -> BlobRead {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return BlobRead::Missing,
        Err(e) => return BlobRead::Malformed(format!("could not read: {}", e)),
    };

    let parsed: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => return BlobRead::Malformed(format!("invalid JSON: {}", e)),
    };

    match parsed {
        Value::Array(raw_items) => BlobRead::Loaded {
            version: 0,
            raw_items,
        },
        Value::Object(mut obj) => {
            let version = match obj.get("schema").and_then(Value::as_u64) {
                Some(v) => v as u32,
                None => return BlobRead::Malformed("object blob without \"schema\" tag".into()),
            };
            match obj.remove("items") {
                Some(Value::Array(raw_items)) => BlobRead::Loaded { version, raw_items },
                _ => BlobRead::Malformed("blob has no \"items\" array".into()),
            }
        }
        _ => BlobRead::Malformed("blob is neither an array nor an object".into()),
    }
}

/// Persist the full item list in the current envelope.
pub fn write_blob(path: &Path, items: &[Item]) -> io::Result<()> {
    let payload = serde_json::json!({
        "schema": SCHEMA_VERSION,
        "items": items.iter().map(Item::to_value).collect::<Vec<_>>(),
    });
    let content = serde_json::to_string_pretty(&payload)?;
    atomic_write(path, content.as_bytes())
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
