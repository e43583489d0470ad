use serde_json::{Map, Value};

use crate::model::item::{Details, Item, Kind};
use crate::parse::csv_decoder::decode_csv;
use crate::parse::csv_encoder::encode_csv;

/// Current CSV column set for games collections.
pub const GAME_COLUMNS: &[&str] = &[
    "id", "title", "category", "code", "variant", "sources", "notes", "cart", "manual", "box",
    "wanted",
];

/// Current CSV column set for comics collections.
pub const COMIC_COLUMNS: &[&str] = &[
    "id",
    "title",
    "category",
    "code",
    "variant",
    "sources",
    "notes",
    "owned",
    "comicCond",
    "wanted",
];

/// Columns from earlier schema generations that the decoder still accepts.
/// `stars` is dropped during normalization; `owned` seeds `cart`.
const LEGACY_COLUMNS: &[&str] = &["stars", "owned"];

pub fn columns_for(kind: Kind) -> &'static [&'static str] {
    match kind {
        Kind::Games => GAME_COLUMNS,
        Kind::Comics => COMIC_COLUMNS,
    }
}

/// Encode items as CSV with the current column set for the kind.
pub fn items_to_csv(items: &[Item], kind: Kind) -> String {
    let columns = columns_for(kind);
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| columns.iter().map(|col| cell_value(item, col)).collect())
        .collect();
    encode_csv(columns, &rows)
}

/// Decode CSV text into raw records ready for normalization.
///
/// Columns are resolved by header name, not position: unknown columns are
/// ignored, missing columns leave the key absent (the normalizer fills the
/// default), and the legacy `stars`/`owned` columns are picked up alongside
/// the current set. Rows that are entirely blank after trimming are dropped.
pub fn csv_to_raws(text: &str, kind: Kind) -> Vec<Value> {
    let rows = decode_csv(text);
    let Some((header, body)) = rows.split_first() else {
        return Vec::new();
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    let mut known: Vec<&str> = columns_for(kind).to_vec();
    for legacy in LEGACY_COLUMNS {
        if !known.contains(legacy) {
            known.push(legacy);
        }
    }
    let positions: Vec<(&str, usize)> = known
        .iter()
        .filter_map(|col| {
            header
                .iter()
                .position(|h| h == col)
                .map(|idx| (*col, idx))
        })
        .collect();

    body.iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            let mut obj = Map::new();
            for (col, idx) in &positions {
                if let Some(cell) = row.get(*idx) {
                    obj.insert(col.to_string(), Value::String(cell.clone()));
                }
            }
            Value::Object(obj)
        })
        .collect()
}

fn cell_value(item: &Item, column: &str) -> String {
    match column {
        "id" => item.id.clone(),
        "title" => item.title.clone(),
        "category" => item.category.as_str().to_string(),
        "code" => item.code.clone(),
        "variant" => item.variant.clone(),
        "sources" => item.sources.clone(),
        "notes" => item.notes.clone(),
        "wanted" => item.wanted.to_string(),
        "cart" | "manual" | "box" => match item.details {
            Details::Game { cart, manual, boxed } => match column {
                "cart" => cart.to_string(),
                "manual" => manual.to_string(),
                _ => boxed.to_string(),
            },
            Details::Comic { .. } => String::new(),
        },
        "owned" => match item.details {
            Details::Comic { owned, .. } => owned.to_string(),
            Details::Game { .. } => String::new(),
        },
        "comicCond" => match item.details {
            Details::Comic { condition, .. } => condition.as_str().to_string(),
            Details::Game { .. } => String::new(),
        },
        _ => String::new(),
    }
}
