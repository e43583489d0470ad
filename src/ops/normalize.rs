use serde_json::Value;
use uuid::Uuid;

use crate::model::item::{Category, ComicCondition, Details, Item, Kind};

/// Where a raw record came from. The category default is asymmetric across
/// sources (a quirk inherited from the original exports that existing
/// files depend on): CSV defaults an unrecognized category to `confirmed`,
/// storage and JSON backups default to `unverified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestSource {
    Storage,
    Backup,
    Csv,
}

/// A legacy rewrite applied while normalizing records from an older schema
/// generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStep {
    /// The old 0–5 star rating no longer maps to anything; drop it.
    DropStars,
    /// The old games `owned` boolean seeds the `cart` flag of the triad.
    OwnedToCart,
    /// The old `uncertain` category vocabulary becomes `unverified`.
    CategoryVocab,
}

/// Migration steps for records persisted at `version`. Version 0 is the
/// tag-less format, where the legacy fields are detected structurally;
/// current-version records get no legacy rewrites at all.
pub fn steps_for(version: u32) -> &'static [MigrationStep] {
    match version {
        0 => &[
            MigrationStep::DropStars,
            MigrationStep::OwnedToCart,
            MigrationStep::CategoryVocab,
        ],
        1 => &[MigrationStep::OwnedToCart, MigrationStep::CategoryVocab],
        _ => &[],
    }
}

/// Result of normalizing one raw record.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub item: Item,
    /// Whether a legacy transformation fired (so the caller should persist
    /// the migrated form back even without an explicit mutation).
    pub migrated: bool,
}

/// Coerce a loosely-typed record into a canonical [`Item`]. Never fails:
/// every field has a defined fallback, so missing fields, wrong types, and
/// legacy field names all produce a valid item. Idempotent — normalizing
/// an already-normalized item's wire form yields an equal item.
pub fn normalize(raw: &Value, kind: Kind, source: IngestSource, steps: &[MigrationStep]) -> Normalized {
    let mut migrated = false;

    let empty = serde_json::Map::new();
    let map = match raw.as_object() {
        Some(map) => map,
        None => {
            // Not even an object: a fully-defaulted item is still valid
            migrated = true;
            &empty
        }
    };

    let id = {
        let s = text(map, "id");
        if s.trim().is_empty() {
            migrated = true;
            Uuid::new_v4().to_string()
        } else {
            s
        }
    };

    let category = {
        let raw_cat = text(map, "category").trim().to_ascii_lowercase();
        if raw_cat == "uncertain" && steps.contains(&MigrationStep::CategoryVocab) {
            migrated = true;
            Category::Unverified
        } else {
            match raw_cat.as_str() {
                "confirmed" => Category::Confirmed,
                "unverified" | "uncertain" => Category::Unverified,
                _ => match source {
                    IngestSource::Csv => Category::Confirmed,
                    IngestSource::Storage | IngestSource::Backup => Category::Unverified,
                },
            }
        }
    };

    // In the canonical blob booleans are real booleans; stringly flags from
    // storage or a backup mean the record predates that and needs rewriting.
    // CSV cells are strings by nature, so they don't count.
    let count_stringly = source != IngestSource::Csv;
    let mut read_flag = |key: &str| -> bool {
        let f = flag(map, key);
        if f.stringly && count_stringly {
            migrated = true;
        }
        f.value
    };

    let wanted = read_flag("wanted");

    let details = match kind {
        Kind::Games => {
            let mut cart = read_flag("cart");
            let manual = read_flag("manual");
            let boxed = read_flag("box");
            if steps.contains(&MigrationStep::OwnedToCart) && map.contains_key("owned") {
                migrated = true;
                if !cart && flag(map, "owned").value {
                    cart = true;
                }
            }
            Details::Game { cart, manual, boxed }
        }
        Kind::Comics => {
            let owned = read_flag("owned");
            let condition = ComicCondition::parse(&text(map, "comicCond"));
            Details::Comic { owned, condition }
        }
    };

    if steps.contains(&MigrationStep::DropStars) && map.contains_key("stars") {
        migrated = true;
    }

    let item = Item {
        id,
        title: text(map, "title"),
        category,
        code: text(map, "code"),
        variant: text(map, "variant"),
        sources: text(map, "sources"),
        notes: text(map, "notes"),
        wanted,
        details,
    };

    Normalized { item, migrated }
}

/// Normalize a whole batch. `changed` is true if any element required a
/// legacy transformation, so the caller knows to persist the migrated list
/// even though nothing was explicitly mutated.
pub fn migrate(
    raws: &[Value],
    kind: Kind,
    source: IngestSource,
    steps: &[MigrationStep],
) -> (Vec<Item>, bool) {
    let mut changed = false;
    let items = raws
        .iter()
        .map(|raw| {
            let n = normalize(raw, kind, source, steps);
            changed |= n.migrated;
            n.item
        })
        .collect();
    (items, changed)
}

// ---------------------------------------------------------------------------
// Field coercion
// ---------------------------------------------------------------------------

/// String coercion: `String(value ?? "")`. Numbers stringify (old seed
/// loaders minted numeric ids), null and missing become empty.
fn text(map: &serde_json::Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

struct FlagValue {
    value: bool,
    stringly: bool,
}

/// Boolean coercion: real booleans pass through, the case-insensitive
/// strings "true"/"false" convert, anything else is false.
fn flag(map: &serde_json::Map<String, Value>, key: &str) -> FlagValue {
    match map.get(key) {
        Some(Value::Bool(b)) => FlagValue {
            value: *b,
            stringly: false,
        },
        Some(Value::String(s)) => FlagValue {
            value: s.eq_ignore_ascii_case("true"),
            stringly: true,
        },
        _ => FlagValue {
            value: false,
            stringly: false,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn games(raw: Value, source: IngestSource, version: u32) -> Normalized {
        normalize(&raw, Kind::Games, source, steps_for(version))
    }

    // --- Legacy migration ---

    #[test]
    fn test_owned_and_stars_migrate_to_cart() {
        let n = games(
            json!({"title": "Mega Man 5", "owned": true, "stars": 4}),
            IngestSource::Storage,
            0,
        );
        assert!(n.migrated);
        assert_eq!(
            n.item.details,
            Details::Game {
                cart: true,
                manual: false,
                boxed: false
            }
        );
        assert!(n.item.to_value().get("stars").is_none());
    }

    #[test]
    fn test_owned_does_not_clear_existing_cart() {
        let n = games(
            json!({"title": "X", "owned": false, "cart": true}),
            IngestSource::Storage,
            0,
        );
        assert!(n.item.flag(crate::model::item::Flag::Cart));
    }

    #[test]
    fn test_owned_ignored_at_current_version() {
        // A current-version record with a stray legacy key: no steps fire
        let n = games(
            json!({"id": "x", "title": "X", "category": "confirmed", "owned": true}),
            IngestSource::Storage,
            2,
        );
        assert!(!n.migrated);
        assert!(!n.item.flag(crate::model::item::Flag::Cart));
    }

    #[test]
    fn test_comics_owned_is_first_class_not_migrated() {
        let n = normalize(
            &json!({"id": "c1", "title": "Nemi #4", "category": "confirmed", "owned": true, "comicCond": "good"}),
            Kind::Comics,
            IngestSource::Storage,
            steps_for(0),
        );
        assert!(!n.migrated);
        assert_eq!(
            n.item.details,
            Details::Comic {
                owned: true,
                condition: ComicCondition::Good
            }
        );
    }

    // --- Category canonicalization ---

    #[test]
    fn test_uncertain_maps_to_unverified_from_storage() {
        let n = games(
            json!({"id": "1", "title": "X", "category": "uncertain"}),
            IngestSource::Storage,
            0,
        );
        assert!(n.migrated);
        assert_eq!(n.item.category, Category::Unverified);
    }

    #[test]
    fn test_uncertain_maps_to_unverified_from_csv() {
        let n = games(
            json!({"id": "1", "title": "X", "category": "uncertain"}),
            IngestSource::Csv,
            0,
        );
        assert_eq!(n.item.category, Category::Unverified);
    }

    #[test]
    fn test_blank_category_defaults_confirmed_on_csv() {
        let n = games(
            json!({"id": "1", "title": "X", "category": ""}),
            IngestSource::Csv,
            0,
        );
        assert_eq!(n.item.category, Category::Confirmed);
    }

    #[test]
    fn test_blank_category_defaults_unverified_on_storage_and_backup() {
        for source in [IngestSource::Storage, IngestSource::Backup] {
            let n = games(json!({"id": "1", "title": "X"}), source, 2);
            assert_eq!(n.item.category, Category::Unverified);
        }
    }

    #[test]
    fn test_garbage_category_follows_source_default() {
        let n = games(
            json!({"id": "1", "title": "X", "category": "Bekreftet SCN"}),
            IngestSource::Csv,
            0,
        );
        assert_eq!(n.item.category, Category::Confirmed);
        let n = games(
            json!({"id": "1", "title": "X", "category": "Bekreftet SCN"}),
            IngestSource::Storage,
            0,
        );
        assert_eq!(n.item.category, Category::Unverified);
    }

    // --- Coercion ---

    #[test]
    fn test_string_booleans_coerce() {
        let n = games(
            json!({"id": "1", "title": "X", "category": "confirmed", "cart": "TRUE", "manual": "false", "box": "yes", "wanted": "True"}),
            IngestSource::Csv,
            0,
        );
        assert_eq!(
            n.item.details,
            Details::Game {
                cart: true,
                manual: false,
                boxed: false
            }
        );
        assert!(n.item.wanted);
        // CSV cells are strings by nature; no migration implied
        assert!(!n.migrated);
    }

    #[test]
    fn test_stringly_booleans_from_storage_mark_migrated() {
        let n = games(
            json!({"id": "1", "title": "X", "category": "confirmed", "wanted": "true"}),
            IngestSource::Storage,
            2,
        );
        assert!(n.item.wanted);
        assert!(n.migrated);
    }

    #[test]
    fn test_numeric_id_coerces_to_string() {
        let n = games(
            json!({"id": 1747230000123u64, "title": "X", "category": "confirmed"}),
            IngestSource::Storage,
            0,
        );
        assert_eq!(n.item.id, "1747230000123");
    }

    #[test]
    fn test_missing_id_minted() {
        let n = games(json!({"title": "X", "category": "confirmed"}), IngestSource::Storage, 2);
        assert!(n.migrated);
        assert!(!n.item.id.is_empty());
    }

    #[test]
    fn test_null_and_missing_text_fields_become_empty() {
        let n = games(
            json!({"id": "1", "title": "X", "category": "confirmed", "notes": null}),
            IngestSource::Storage,
            2,
        );
        assert_eq!(n.item.notes, "");
        assert_eq!(n.item.code, "");
    }

    #[test]
    fn test_non_object_record_defaults() {
        let n = games(json!("garbage"), IngestSource::Storage, 0);
        assert!(n.migrated);
        assert_eq!(n.item.title, "");
        assert!(!n.item.id.is_empty());
    }

    // --- Idempotence ---

    #[test]
    fn test_normalize_is_idempotent() {
        let first = games(
            json!({"title": "Panic Restaurant", "category": "uncertain", "stars": 5,
                   "owned": true, "wanted": "true", "variant": "ESP"}),
            IngestSource::Storage,
            0,
        );
        let second = normalize(
            &first.item.to_value(),
            Kind::Games,
            IngestSource::Storage,
            steps_for(0),
        );
        assert_eq!(first.item, second.item);
        assert!(!second.migrated);
    }

    #[test]
    fn test_normalize_comics_idempotent() {
        let first = normalize(
            &json!({"title": "Nemi #4", "category": "uncertain", "owned": "true", "comicCond": "ok"}),
            Kind::Comics,
            IngestSource::Backup,
            steps_for(1),
        );
        let second = normalize(
            &first.item.to_value(),
            Kind::Comics,
            IngestSource::Backup,
            steps_for(1),
        );
        assert_eq!(first.item, second.item);
        assert!(!second.migrated);
    }

    // --- Batch ---

    #[test]
    fn test_migrate_batch_reports_changed() {
        let raws = vec![
            json!({"id": "1", "title": "A", "category": "confirmed"}),
            json!({"id": "2", "title": "B", "category": "confirmed", "stars": 3}),
        ];
        let (items, changed) = migrate(&raws, Kind::Games, IngestSource::Storage, steps_for(0));
        assert_eq!(items.len(), 2);
        assert!(changed);

        let clean: Vec<_> = items.iter().map(Item::to_value).collect();
        let (_, changed) = migrate(&clean, Kind::Games, IngestSource::Storage, steps_for(2));
        assert!(!changed);
    }
}
