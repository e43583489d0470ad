use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::io::storage::{self, BlobRead, SCHEMA_VERSION};
use crate::model::item::{ComicCondition, Details, Flag, Item, Kind};
use crate::model::registry::CollectionEntry;
use crate::ops::normalize::{IngestSource, migrate, steps_for};

/// Error type for store mutations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("could not persist {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("flag \"{flag}\" does not apply to a {kind} collection")]
    FlagNotApplicable { flag: &'static str, kind: &'static str },
    #[error("condition grades only apply to comics collections")]
    NotAComicCollection,
}

/// Owns the in-memory ordered item list for one collection and mediates
/// every mutation. Order is insertion order, not display order. Each
/// mutation persists the full list before returning; a failed persist
/// rolls the in-memory list back, so callers never observe a state that
/// isn't on disk.
pub struct CollectionStore {
    entry: CollectionEntry,
    data_dir: PathBuf,
    blob_path: PathBuf,
    items: Vec<Item>,
}

impl CollectionStore {
    /// Load a collection from its storage blob. Never fails: a missing
    /// blob is a new collection, a malformed one is logged to the recovery
    /// log and loads as empty (the caller decides whether to seed). Legacy
    /// records are migrated and, when anything changed, persisted back in
    /// the current envelope right away.
    pub fn open(data_dir: &Path, entry: CollectionEntry) -> CollectionStore {
        let blob_path = data_dir.join(&entry.file);
        let mut store = CollectionStore {
            entry,
            data_dir: data_dir.to_path_buf(),
            blob_path,
            items: Vec::new(),
        };

        match storage::read_blob(&store.blob_path) {
            BlobRead::Missing => {}
            BlobRead::Malformed(reason) => {
                let raw = std::fs::read_to_string(&store.blob_path).unwrap_or_default();
                log_recovery(
                    &store.data_dir,
                    RecoveryEntry::new(RecoveryCategory::Storage, "malformed storage blob")
                        .field("Collection", &store.entry.id)
                        .field("Reason", reason)
                        .body(raw),
                );
            }
            BlobRead::Loaded { version, raw_items } => {
                let (items, changed) = migrate(
                    &raw_items,
                    store.entry.kind,
                    IngestSource::Storage,
                    steps_for(version),
                );
                store.items = items;
                if changed || version < SCHEMA_VERSION {
                    // Persist the migrated form; failure here must not
                    // fail the load
                    if let Err(e) = storage::write_blob(&store.blob_path, &store.items) {
                        log_recovery(
                            &store.data_dir,
                            RecoveryEntry::new(
                                RecoveryCategory::Write,
                                "could not persist migrated blob",
                            )
                            .field("Collection", &store.entry.id)
                            .field("Error", e.to_string()),
                        );
                    }
                }
            }
        }

        store
    }

    pub fn entry(&self) -> &CollectionEntry {
        &self.entry
    }

    pub fn kind(&self) -> Kind {
        self.entry.kind
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Wholesale replacement (CSV import, JSON restore, reset). Raw
    /// records always pass through the batch normalizer first; `version`
    /// selects the legacy migration steps.
    pub fn replace_all(
        &mut self,
        raws: &[Value],
        source: IngestSource,
        version: u32,
    ) -> Result<usize, StoreError> {
        let (items, _) = migrate(raws, self.entry.kind, source, steps_for(version));
        let prev = std::mem::replace(&mut self.items, items);
        self.commit(prev)?;
        Ok(self.items.len())
    }

    /// Insert or update. An existing id is replaced in place, keeping its
    /// position; a new id appends. Rejects a title that is empty after
    /// trimming.
    pub fn upsert(&mut self, item: Item) -> Result<(), StoreError> {
        if item.title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        let prev = self.items.clone();
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
        self.commit(prev)
    }

    /// Remove by id. Returns false (and touches nothing) if absent.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(pos) = self.items.iter().position(|i| i.id == id) else {
            return Ok(false);
        };
        let prev = self.items.clone();
        self.items.remove(pos);
        self.commit(prev)?;
        Ok(true)
    }

    /// Set a single boolean flag. Returns false if the id is not found;
    /// errors if the flag doesn't exist for this collection's kind.
    pub fn set_flag(&mut self, id: &str, flag: Flag, value: bool) -> Result<bool, StoreError> {
        let kind = self.entry.kind;
        let Some(pos) = self.items.iter().position(|i| i.id == id) else {
            return Ok(false);
        };
        let prev = self.items.clone();
        if !self.items[pos].set_flag(flag, value) {
            return Err(StoreError::FlagNotApplicable {
                flag: flag.key(),
                kind: kind.as_str(),
            });
        }
        self.commit(prev)?;
        Ok(true)
    }

    /// Tri-state condition toggle for comics: grading an owned comic with
    /// the level it already has clears ownership and condition; any other
    /// level marks it owned with that grade. Lets one button group act as
    /// both ownership toggle and condition picker.
    pub fn apply_comic_condition(
        &mut self,
        id: &str,
        level: ComicCondition,
    ) -> Result<bool, StoreError> {
        if self.entry.kind != Kind::Comics {
            return Err(StoreError::NotAComicCollection);
        }
        let Some(pos) = self.items.iter().position(|i| i.id == id) else {
            return Ok(false);
        };
        let prev = self.items.clone();
        if let Details::Comic { owned, condition } = &mut self.items[pos].details {
            if *owned && *condition == level {
                *owned = false;
                *condition = ComicCondition::None;
            } else {
                *owned = true;
                *condition = level;
            }
        }
        self.commit(prev)?;
        Ok(true)
    }

    /// Discard the whole list (reset). The caller is expected to have
    /// logged the discarded data first.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        let prev = std::mem::take(&mut self.items);
        self.commit(prev)
    }

    /// Persist the current list; on failure restore `prev` so the
    /// in-memory state never diverges from disk.
    fn commit(&mut self, prev: Vec<Item>) -> Result<(), StoreError> {
        match storage::write_blob(&self.blob_path, &self.items) {
            Ok(()) => Ok(()),
            Err(source) => {
                self.items = prev;
                log_recovery(
                    &self.data_dir,
                    RecoveryEntry::new(RecoveryCategory::Write, "persist failed")
                        .field("Collection", &self.entry.id)
                        .field("Error", source.to_string()),
                );
                Err(StoreError::Persist {
                    path: self.blob_path.clone(),
                    source,
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
