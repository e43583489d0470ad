use serde::Serialize;

use crate::model::item::{Details, Item};
use crate::model::registry::CollectionEntry;
use crate::view::Group;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub variant: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sources: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    pub wanted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "box")]
    pub boxed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

pub fn item_to_json(item: &Item) -> ItemJson {
    let mut out = ItemJson {
        id: item.id.clone(),
        title: item.title.clone(),
        category: item.category.as_str().to_string(),
        code: item.code.clone(),
        variant: item.variant.clone(),
        sources: item.sources.clone(),
        notes: item.notes.clone(),
        wanted: item.wanted,
        cart: None,
        manual: None,
        boxed: None,
        complete: None,
        owned: None,
        condition: None,
    };
    match item.details {
        Details::Game { cart, manual, boxed } => {
            out.cart = Some(cart);
            out.manual = Some(manual);
            out.boxed = Some(boxed);
            out.complete = Some(item.is_complete());
        }
        Details::Comic { owned, .. } => {
            out.owned = Some(owned);
            out.condition = Some(item.display_condition().as_str().to_string());
        }
    }
    out
}

#[derive(Serialize)]
pub struct GroupJson {
    pub key: String,
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct ListJson {
    pub collection: String,
    pub mode: String,
    pub count: usize,
    pub groups: Vec<GroupJson>,
}

pub fn groups_to_json(collection: &str, mode: &str, groups: &[Group<'_>]) -> ListJson {
    ListJson {
        collection: collection.to_string(),
        mode: mode.to_string(),
        count: groups.iter().map(|g| g.items.len()).sum(),
        groups: groups
            .iter()
            .map(|g| GroupJson {
                key: g.key.clone(),
                items: g.items.iter().map(|i| item_to_json(i)).collect(),
            })
            .collect(),
    }
}

#[derive(Serialize)]
pub struct CollectionJson {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    pub kind: String,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub collection: String,
    pub kind: String,
    pub total: usize,
    pub confirmed: usize,
    pub unverified: usize,
    pub wanted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub games: Option<GameStatsJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comics: Option<ComicStatsJson>,
}

#[derive(Serialize)]
pub struct GameStatsJson {
    pub cart: usize,
    pub manual: usize,
    #[serde(rename = "box")]
    pub boxed: usize,
    pub complete: usize,
}

#[derive(Serialize)]
pub struct ComicStatsJson {
    pub owned: usize,
    /// Rounded share of the collection that is owned, 0 when empty.
    pub owned_percent: usize,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One listing line: markers, title, and the most useful short fields.
pub fn format_item_line(item: &Item) -> String {
    let marker = match item.details {
        Details::Game { .. } => {
            if item.is_complete() {
                "[CIB]"
            } else if item.flag(crate::model::item::Flag::Cart) {
                "[c  ]"
            } else {
                "[   ]"
            }
        }
        Details::Comic { owned, .. } => {
            if owned {
                "[x]"
            } else {
                "[ ]"
            }
        }
    };
    let mut line = format!("{} {}", marker, item.title);
    if !item.code.is_empty() {
        line.push_str(&format!("  ({})", item.code));
    }
    if item.wanted {
        line.push_str("  *wanted*");
    }
    let cond = item.display_condition().as_str();
    if !cond.is_empty() {
        line.push_str(&format!("  [{}]", cond));
    }
    line.push_str(&format!("  {}", item.id));
    line
}

/// Multi-line detail block for `hy show`.
pub fn format_item_detail(item: &Item) -> Vec<String> {
    let mut lines = vec![
        format!("id:       {}", item.id),
        format!("title:    {}", item.title),
        format!("category: {}", item.category.as_str()),
    ];
    if !item.code.is_empty() {
        lines.push(format!("code:     {}", item.code));
    }
    if !item.variant.is_empty() {
        lines.push(format!("variant:  {}", item.variant));
    }
    if !item.sources.is_empty() {
        lines.push(format!("sources:  {}", item.sources));
    }
    if !item.notes.is_empty() {
        lines.push(format!("notes:    {}", item.notes));
    }
    lines.push(format!("wanted:   {}", item.wanted));
    match item.details {
        Details::Game { cart, manual, boxed } => {
            lines.push(format!("cart:     {}", cart));
            lines.push(format!("manual:   {}", manual));
            lines.push(format!("box:      {}", boxed));
            lines.push(format!("complete: {}", item.is_complete()));
        }
        Details::Comic { owned, .. } => {
            lines.push(format!("owned:    {}", owned));
            let cond = item.display_condition().as_str();
            lines.push(format!(
                "cond:     {}",
                if cond.is_empty() { "-" } else { cond }
            ));
        }
    }
    lines
}

pub fn collection_to_json(entry: &CollectionEntry, count: usize) -> CollectionJson {
    CollectionJson {
        id: entry.id.clone(),
        title: entry.title.clone(),
        subtitle: entry.subtitle.clone(),
        kind: entry.kind.as_str().to_string(),
        file: entry.file.clone(),
        seed: entry.seed.clone(),
        count,
    }
}
