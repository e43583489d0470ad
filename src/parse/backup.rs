use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::io::storage::SCHEMA_VERSION;
use crate::model::item::Item;
use crate::model::registry::CollectionEntry;

/// App tag written into backup metadata.
pub const BACKUP_APP: &str = "hylle";

/// Error type for backup file ingestion. Any error rejects the whole file;
/// the store is never partially replaced.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("could not parse backup file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("backup file has no \"items\" array")]
    MissingItems,
    #[error("item {index} is invalid: {reason}")]
    InvalidItem { index: usize, reason: String },
}

/// Metadata envelope of a JSON backup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMeta {
    pub app: String,
    pub schema: u32,
    #[serde(rename = "exportedAt")]
    pub exported_at: String,
    #[serde(rename = "collectionId")]
    pub collection_id: String,
    #[serde(rename = "storageKey")]
    pub storage_key: String,
    pub count: usize,
}

/// Serialize a full backup: `{ meta, items }` with the current schema tag.
pub fn write_backup(entry: &CollectionEntry, items: &[Item]) -> String {
    let meta = BackupMeta {
        app: BACKUP_APP.to_string(),
        schema: SCHEMA_VERSION,
        exported_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        collection_id: entry.id.clone(),
        storage_key: entry.file.clone(),
        count: items.len(),
    };
    let payload = serde_json::json!({
        "meta": meta,
        "items": items.iter().map(Item::to_value).collect::<Vec<_>>(),
    });
    // Pretty output: backups are meant to be inspectable by hand
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
}

/// Parse and validate a backup file.
///
/// Accepts the `{ meta, items }` envelope and, for old exports, a bare
/// top-level array (read as schema version 0). Every element must be an
/// object carrying string `title` and `category` fields; a single bad
/// element rejects the entire file.
pub fn read_backup(text: &str) -> Result<(u32, Vec<Value>), BackupError> {
    let parsed: Value = serde_json::from_str(text)?;

    let (version, items) = match parsed {
        Value::Array(items) => (0, items),
        Value::Object(mut obj) => {
            let items = match obj.remove("items") {
                Some(Value::Array(items)) => items,
                _ => return Err(BackupError::MissingItems),
            };
            let version = obj
                .get("meta")
                .and_then(|m| m.get("schema"))
                .and_then(Value::as_u64)
                .map(|v| v as u32)
                .unwrap_or(1);
            (version, items)
        }
        _ => return Err(BackupError::MissingItems),
    };

    for (index, item) in items.iter().enumerate() {
        validate_element(item).map_err(|reason| BackupError::InvalidItem {
            index,
            reason: reason.to_string(),
        })?;
    }

    Ok((version, items))
}

fn validate_element(item: &Value) -> Result<(), &'static str> {
    let obj = item.as_object().ok_or("not an object")?;
    if !obj.get("title").is_some_and(Value::is_string) {
        return Err("missing string \"title\"");
    }
    if !obj.get("category").is_some_and(Value::is_string) {
        return Err("missing string \"category\"");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::Kind;

    fn entry() -> CollectionEntry {
        CollectionEntry {
            id: "nes".to_string(),
            title: "NES (SCN)".to_string(),
            subtitle: String::new(),
            kind: Kind::Games,
            file: "nes.json".to_string(),
            seed: None,
        }
    }

    #[test]
    fn test_write_backup_envelope() {
        let items = vec![Item::new(Kind::Games, "Mega Man 5".to_string())];
        let text = write_backup(&entry(), &items);
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["meta"]["app"], "hylle");
        assert_eq!(v["meta"]["schema"], 2);
        assert_eq!(v["meta"]["collectionId"], "nes");
        assert_eq!(v["meta"]["storageKey"], "nes.json");
        assert_eq!(v["meta"]["count"], 1);
        assert!(v["meta"]["exportedAt"].as_str().unwrap().contains('T'));
        assert_eq!(v["items"][0]["title"], "Mega Man 5");
    }

    #[test]
    fn test_read_backup_round_trip() {
        let items = vec![Item::new(Kind::Games, "Castlevania".to_string())];
        let text = write_backup(&entry(), &items);
        let (version, raws) = read_backup(&text).unwrap();
        assert_eq!(version, 2);
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0]["title"], "Castlevania");
    }

    #[test]
    fn test_read_bare_array_as_version_zero() {
        let text = r#"[{"title": "Zelda II", "category": "uncertain", "stars": 4}]"#;
        let (version, raws) = read_backup(text).unwrap();
        assert_eq!(version, 0);
        assert_eq!(raws[0]["stars"], 4);
    }

    #[test]
    fn test_envelope_without_meta_schema_reads_as_v1() {
        let text = r#"{"items": [{"title": "A", "category": "confirmed"}]}"#;
        let (version, _) = read_backup(text).unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_read_rejects_unparsable() {
        assert!(matches!(
            read_backup("not json {{{"),
            Err(BackupError::Parse(_))
        ));
    }

    #[test]
    fn test_read_rejects_missing_items() {
        assert!(matches!(
            read_backup(r#"{"meta": {}}"#),
            Err(BackupError::MissingItems)
        ));
        assert!(matches!(
            read_backup("\"just a string\""),
            Err(BackupError::MissingItems)
        ));
    }

    #[test]
    fn test_read_rejects_whole_file_on_one_bad_element() {
        let text = r#"[
            {"title": "A", "category": "confirmed"},
            {"title": "B", "category": "confirmed"},
            {"category": "confirmed"},
            {"title": "D", "category": "confirmed"},
            {"title": "E", "category": "confirmed"}
        ]"#;
        match read_backup(text) {
            Err(BackupError::InvalidItem { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected InvalidItem, got {:?}", other),
        }
    }

    #[test]
    fn test_read_rejects_non_string_title() {
        let text = r#"[{"title": 42, "category": "confirmed"}]"#;
        assert!(matches!(
            read_backup(text),
            Err(BackupError::InvalidItem { index: 0, .. })
        ));
    }
}
