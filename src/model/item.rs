use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

/// Which family of collection an item belongs to. Governs which ownership
/// fields apply and which CSV columns are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Games,
    Comics,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Games => "games",
            Kind::Comics => "comics",
        }
    }
}

/// Verification category of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Confirmed,
    Unverified,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Confirmed => "confirmed",
            Category::Unverified => "unverified",
        }
    }
}

/// Condition grade for an owned comic. `None` is stored as the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComicCondition {
    #[default]
    None,
    Bad,
    Ok,
    Good,
}

impl ComicCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            ComicCondition::None => "",
            ComicCondition::Bad => "bad",
            ComicCondition::Ok => "ok",
            ComicCondition::Good => "good",
        }
    }

    /// Parse a stored condition string. Unrecognized values map to `None`.
    pub fn parse(s: &str) -> ComicCondition {
        match s.trim().to_ascii_lowercase().as_str() {
            "bad" => ComicCondition::Bad,
            "ok" => ComicCondition::Ok,
            "good" => ComicCondition::Good,
            _ => ComicCondition::None,
        }
    }
}

/// A toggleable boolean field on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Cart,
    Manual,
    Box,
    Wanted,
    Owned,
}

impl Flag {
    pub fn key(self) -> &'static str {
        match self {
            Flag::Cart => "cart",
            Flag::Manual => "manual",
            Flag::Box => "box",
            Flag::Wanted => "wanted",
            Flag::Owned => "owned",
        }
    }

    pub fn parse(s: &str) -> Option<Flag> {
        match s {
            "cart" => Some(Flag::Cart),
            "manual" => Some(Flag::Manual),
            "box" => Some(Flag::Box),
            "wanted" => Some(Flag::Wanted),
            "owned" => Some(Flag::Owned),
            _ => None,
        }
    }
}

/// Kind-specific ownership fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Details {
    /// Physical game media: the condition triad.
    Game { cart: bool, manual: bool, boxed: bool },
    /// Comic issue: ownership plus an optional condition grade.
    Comic {
        owned: bool,
        condition: ComicCondition,
    },
}

impl Details {
    pub fn empty(kind: Kind) -> Details {
        match kind {
            Kind::Games => Details::Game {
                cart: false,
                manual: false,
                boxed: false,
            },
            Kind::Comics => Details::Comic {
                owned: false,
                condition: ComicCondition::None,
            },
        }
    }
}

/// One tracked unit: a game or a comic issue.
///
/// Shared fields live on the struct; the kind-conditional ownership fields
/// live in [`Details`]. Every field is fully typed — raw records from
/// storage or import files go through the normalizer before becoming one
/// of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Opaque stable identifier, unique within a collection.
    pub id: String,
    /// Display title; non-empty for items that are kept.
    pub title: String,
    pub category: Category,
    /// Free-text identifier; may carry a `YYYY-` year prefix.
    pub code: String,
    pub variant: String,
    pub sources: String,
    pub notes: String,
    /// On the want-list.
    pub wanted: bool,
    pub details: Details,
}

impl Item {
    /// Create a blank item of the given kind with a freshly minted id.
    pub fn new(kind: Kind, title: String) -> Item {
        Item {
            id: Uuid::new_v4().to_string(),
            title,
            category: Category::Confirmed,
            code: String::new(),
            variant: String::new(),
            sources: String::new(),
            notes: String::new(),
            wanted: false,
            details: Details::empty(kind),
        }
    }

    pub fn kind(&self) -> Kind {
        match self.details {
            Details::Game { .. } => Kind::Games,
            Details::Comic { .. } => Kind::Comics,
        }
    }

    /// "Complete in box": cart, manual, and box all present. Never stored,
    /// only derived. Always false for comics.
    pub fn is_complete(&self) -> bool {
        match self.details {
            Details::Game { cart, manual, boxed } => cart && manual && boxed,
            Details::Comic { .. } => false,
        }
    }

    /// Condition as it should be displayed: an unowned comic reads as
    /// ungraded even if a stale grade is still stored.
    pub fn display_condition(&self) -> ComicCondition {
        match self.details {
            Details::Comic {
                owned: true,
                condition,
            } => condition,
            _ => ComicCondition::None,
        }
    }

    /// Read a boolean flag. Flags that don't apply to this kind read false.
    pub fn flag(&self, flag: Flag) -> bool {
        match (flag, &self.details) {
            (Flag::Wanted, _) => self.wanted,
            (Flag::Cart, Details::Game { cart, .. }) => *cart,
            (Flag::Manual, Details::Game { manual, .. }) => *manual,
            (Flag::Box, Details::Game { boxed, .. }) => *boxed,
            (Flag::Owned, Details::Comic { owned, .. }) => *owned,
            _ => false,
        }
    }

    /// Set a boolean flag. Returns false (and changes nothing) when the
    /// flag doesn't apply to this item's kind.
    pub fn set_flag(&mut self, flag: Flag, value: bool) -> bool {
        match (flag, &mut self.details) {
            (Flag::Wanted, _) => self.wanted = value,
            (Flag::Cart, Details::Game { cart, .. }) => *cart = value,
            (Flag::Manual, Details::Game { manual, .. }) => *manual = value,
            (Flag::Box, Details::Game { boxed, .. }) => *boxed = value,
            (Flag::Owned, Details::Comic { owned, .. }) => *owned = value,
            _ => return false,
        }
        true
    }

    /// Flat wire shape written to storage blobs and JSON backups.
    pub fn to_value(&self) -> Value {
        let mut obj = json!({
            "id": self.id,
            "title": self.title,
            "category": self.category.as_str(),
            "code": self.code,
            "variant": self.variant,
            "sources": self.sources,
            "notes": self.notes,
            "wanted": self.wanted,
        });
        let map = obj.as_object_mut().expect("literal object");
        match self.details {
            Details::Game { cart, manual, boxed } => {
                map.insert("cart".into(), Value::Bool(cart));
                map.insert("manual".into(), Value::Bool(manual));
                map.insert("box".into(), Value::Bool(boxed));
            }
            Details::Comic { owned, condition } => {
                map.insert("owned".into(), Value::Bool(owned));
                map.insert("comicCond".into(), Value::String(condition.as_str().into()));
            }
        }
        obj
    }
}
