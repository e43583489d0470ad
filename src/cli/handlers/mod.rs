mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::data_dir::{discover_data_dir, read_registry};
use crate::io::lock::FileLock;
use crate::io::recovery::{
    self, RecoveryCategory, RecoveryEntry, log_recovery, prune_recovery, read_recovery_entries,
};
use crate::io::seed::load_seed;
use crate::model::item::{Category, ComicCondition, Flag, Item, Kind};
use crate::model::registry::{CollectionEntry, Registry};
use crate::ops::{CollectionStore, IngestSource, csv_to_raws, items_to_csv};
use crate::parse::{read_backup, write_backup};
use crate::view::{self, CategoryFilter, FilterSpec, GroupingMode};

/// Global override for the data directory (set by -C flag)
static DATA_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    // Store -C override for data_dir_cwd()
    if let Some(ref dir) = cli.data_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        DATA_DIR_OVERRIDE.lock().unwrap().replace(abs);
    }

    match cli.command {
        // Init is handled in main.rs before data dir discovery
        Commands::Init(args) => cmd_init(args),

        // Read commands
        Commands::Collections => cmd_collections(json),
        Commands::List(args) => cmd_list(args, json),
        Commands::Show(args) => cmd_show(args, json),
        Commands::Stats(args) => cmd_stats(args, json),

        // Write commands
        Commands::Add(args) => cmd_add(args, json),
        Commands::Edit(args) => cmd_edit(args, json),
        Commands::Set(args) => cmd_set(args),
        Commands::Cond(args) => cmd_cond(args, json),
        Commands::Rm(args) => cmd_rm(args),

        // Bulk
        Commands::Export(args) => cmd_export(args),
        Commands::Import(args) => cmd_import(args),
        Commands::Reset(args) => cmd_reset(args),

        // Maintenance
        Commands::Recovery(args) => cmd_recovery(args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn data_dir_cwd() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let start = match DATA_DIR_OVERRIDE.lock().unwrap().as_ref() {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    Ok(discover_data_dir(&start)?)
}

fn find_entry(registry: &Registry, id: &str) -> Result<CollectionEntry, String> {
    registry
        .find(id)
        .cloned()
        .ok_or_else(|| format!("no collection '{}' in collections.toml", id))
}

/// Open a collection, seeding it from its configured CSV when the store
/// comes up empty.
fn open_store(
    data_dir: &Path,
    entry: CollectionEntry,
) -> Result<CollectionStore, Box<dyn std::error::Error>> {
    let mut store = CollectionStore::open(data_dir, entry);
    if store.is_empty()
        && let Some(text) = load_seed(data_dir, store.entry())
    {
        let raws = csv_to_raws(&text, store.kind());
        store.replace_all(&raws, IngestSource::Csv, 0)?;
        log_recovery(
            data_dir,
            RecoveryEntry::new(RecoveryCategory::Seed, "seeded empty collection")
                .field("Collection", &store.entry().id)
                .field("Items", store.items().len().to_string()),
        );
    }
    Ok(store)
}

fn open_collection(id: &str) -> Result<(PathBuf, CollectionStore), Box<dyn std::error::Error>> {
    let data_dir = data_dir_cwd()?;
    let registry = read_registry(&data_dir)?;
    let entry = find_entry(&registry, id)?;
    let store = open_store(&data_dir, entry)?;
    Ok((data_dir, store))
}

fn parse_category(s: &str) -> Result<Category, String> {
    match s {
        "confirmed" => Ok(Category::Confirmed),
        "unverified" => Ok(Category::Unverified),
        _ => Err(format!(
            "unknown category '{}' (expected confirmed or unverified)",
            s
        )),
    }
}

fn parse_flag(s: &str) -> Result<Flag, String> {
    Flag::parse(s)
        .ok_or_else(|| format!("unknown flag '{}' (expected cart, manual, box, wanted, or owned)", s))
}

fn require_item(store: &CollectionStore, id: &str) -> Result<Item, String> {
    store
        .get(id)
        .cloned()
        .ok_or_else(|| format!("no item '{}' in collection '{}'", id, store.entry().id))
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_collections(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = data_dir_cwd()?;
    let registry = read_registry(&data_dir)?;

    if json {
        let mut out = Vec::new();
        for entry in &registry.collections {
            let store = open_store(&data_dir, entry.clone())?;
            out.push(collection_to_json(entry, store.items().len()));
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for entry in &registry.collections {
            let store = open_store(&data_dir, entry.clone())?;
            let subtitle = if entry.subtitle.is_empty() {
                String::new()
            } else {
                format!(" — {}", entry.subtitle)
            };
            println!(
                "{:<12} {}{} ({}, {} items)",
                entry.id,
                entry.title,
                subtitle,
                entry.kind.as_str(),
                store.items().len()
            );
        }
    }
    Ok(())
}

fn cmd_list(args: ListArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_, store) = open_collection(&args.collection)?;

    let category = match args.category.as_deref() {
        None => CategoryFilter::All,
        Some(s) => CategoryFilter::parse(s)
            .ok_or_else(|| format!("unknown category filter '{}'", s))?,
    };
    let mut require = Vec::new();
    for name in &args.with {
        require.push(parse_flag(name)?);
    }
    let spec = FilterSpec {
        category,
        require,
        query: args.query.clone().unwrap_or_default(),
    };

    let filtered = view::filter(store.items(), &spec);
    let (mode, groups) = view::group(&filtered);
    let mode_name = match mode {
        GroupingMode::Year => "year",
        GroupingMode::Alpha => "alpha",
    };

    if json {
        let out = groups_to_json(&args.collection, mode_name, &groups);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if args.flat {
        for item in &filtered {
            println!("{}", format_item_line(item));
        }
    } else {
        let mut first = true;
        for g in &groups {
            if !first {
                println!();
            }
            first = false;
            println!("== {} ==", g.key);
            for item in &g.items {
                println!("{}", format_item_line(item));
            }
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_, store) = open_collection(&args.collection)?;
    let item = require_item(&store, &args.id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&item_to_json(&item))?);
    } else {
        for line in format_item_detail(&item) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn stats_for(store: &CollectionStore) -> StatsJson {
    let items = store.items();
    let count_flag = |flag: Flag| items.iter().filter(|i| i.flag(flag)).count();

    let (games, comics) = match store.kind() {
        Kind::Games => (
            Some(GameStatsJson {
                cart: count_flag(Flag::Cart),
                manual: count_flag(Flag::Manual),
                boxed: count_flag(Flag::Box),
                complete: items.iter().filter(|i| i.is_complete()).count(),
            }),
            None,
        ),
        Kind::Comics => {
            let owned = count_flag(Flag::Owned);
            (
                None,
                Some(ComicStatsJson {
                    owned,
                    owned_percent: if items.is_empty() {
                        0
                    } else {
                        (owned * 100 + items.len() / 2) / items.len()
                    },
                }),
            )
        }
    };

    StatsJson {
        collection: store.entry().id.clone(),
        kind: store.kind().as_str().to_string(),
        total: items.len(),
        confirmed: items
            .iter()
            .filter(|i| i.category == Category::Confirmed)
            .count(),
        unverified: items
            .iter()
            .filter(|i| i.category == Category::Unverified)
            .count(),
        wanted: items.iter().filter(|i| i.wanted).count(),
        games,
        comics,
    }
}

fn cmd_stats(args: StatsArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = data_dir_cwd()?;
    let registry = read_registry(&data_dir)?;

    let entries: Vec<CollectionEntry> = match args.collection {
        Some(ref id) => vec![find_entry(&registry, id)?],
        None => registry.collections.clone(),
    };

    let mut all = Vec::new();
    for entry in entries {
        let store = open_store(&data_dir, entry)?;
        all.push(stats_for(&store));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
    } else {
        for s in &all {
            let detail = if let Some(g) = &s.games {
                format!(
                    "{} cart, {} manual, {} box, {} complete",
                    g.cart, g.manual, g.boxed, g.complete
                )
            } else if let Some(c) = &s.comics {
                format!("{} owned ({}%)", c.owned, c.owned_percent)
            } else {
                String::new()
            };
            println!(
                "{:<12} {} items: {} confirmed, {} unverified, {} wanted | {}",
                s.collection, s.total, s.confirmed, s.unverified, s.wanted, detail
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (data_dir, mut store) = open_collection(&args.collection)?;
    let _lock = FileLock::acquire_default(&data_dir)?;

    let mut item = Item::new(store.kind(), args.title);
    if let Some(code) = args.code {
        item.code = code;
    }
    if let Some(variant) = args.variant {
        item.variant = variant;
    }
    if let Some(sources) = args.sources {
        item.sources = sources;
    }
    if let Some(notes) = args.notes {
        item.notes = notes;
    }
    if let Some(ref cat) = args.category {
        item.category = parse_category(cat)?;
    }
    item.wanted = args.wanted;

    let id = item.id.clone();
    store.upsert(item)?;

    if json {
        let item = require_item(&store, &id)?;
        println!("{}", serde_json::to_string_pretty(&item_to_json(&item))?);
    } else {
        println!("added {}", id);
    }
    Ok(())
}

fn cmd_edit(args: EditArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (data_dir, mut store) = open_collection(&args.collection)?;
    let _lock = FileLock::acquire_default(&data_dir)?;

    let mut item = require_item(&store, &args.id)?;
    if let Some(title) = args.title {
        item.title = title;
    }
    if let Some(code) = args.code {
        item.code = code;
    }
    if let Some(variant) = args.variant {
        item.variant = variant;
    }
    if let Some(sources) = args.sources {
        item.sources = sources;
    }
    if let Some(notes) = args.notes {
        item.notes = notes;
    }
    if let Some(ref cat) = args.category {
        item.category = parse_category(cat)?;
    }
    store.upsert(item)?;

    if json {
        let item = require_item(&store, &args.id)?;
        println!("{}", serde_json::to_string_pretty(&item_to_json(&item))?);
    } else {
        println!("updated {}", args.id);
    }
    Ok(())
}

fn cmd_set(args: SetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (data_dir, mut store) = open_collection(&args.collection)?;
    let _lock = FileLock::acquire_default(&data_dir)?;

    let flag = parse_flag(&args.flag)?;
    let value = match args.value.as_str() {
        "on" | "true" => true,
        "off" | "false" => false,
        other => return Err(format!("expected on or off, got '{}'", other).into()),
    };

    if !store.set_flag(&args.id, flag, value)? {
        return Err(format!("no item '{}' in collection '{}'", args.id, args.collection).into());
    }
    println!(
        "{} {} = {}",
        args.id,
        flag.key(),
        if value { "on" } else { "off" }
    );
    Ok(())
}

fn cmd_cond(args: CondArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (data_dir, mut store) = open_collection(&args.collection)?;
    let _lock = FileLock::acquire_default(&data_dir)?;

    let level = match args.level.as_str() {
        "bad" | "ok" | "good" => ComicCondition::parse(&args.level),
        other => return Err(format!("expected bad, ok, or good, got '{}'", other).into()),
    };

    if !store.apply_comic_condition(&args.id, level)? {
        return Err(format!("no item '{}' in collection '{}'", args.id, args.collection).into());
    }

    let item = require_item(&store, &args.id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&item_to_json(&item))?);
    } else {
        let cond = item.display_condition().as_str();
        println!(
            "{}: owned={} cond={}",
            args.id,
            item.flag(Flag::Owned),
            if cond.is_empty() { "-" } else { cond }
        );
    }
    Ok(())
}

fn cmd_rm(args: RmArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (data_dir, mut store) = open_collection(&args.collection)?;
    let _lock = FileLock::acquire_default(&data_dir)?;

    // Keep the deleted record recoverable
    let item = require_item(&store, &args.id)?;
    log_recovery(
        &data_dir,
        RecoveryEntry::new(RecoveryCategory::Storage, "item deleted")
            .field("Collection", &args.collection)
            .field("Title", &item.title)
            .body(serde_json::to_string_pretty(&item.to_value())?),
    );

    store.delete(&args.id)?;
    println!("deleted {}", args.id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Bulk handlers
// ---------------------------------------------------------------------------

fn cmd_export(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_, store) = open_collection(&args.collection)?;

    let text = match args.format.as_str() {
        "csv" => items_to_csv(store.items(), store.kind()),
        "json" => write_backup(store.entry(), store.items()),
        other => return Err(format!("unknown export format '{}'", other).into()),
    };

    match args.out {
        Some(path) => {
            std::fs::write(&path, &text)?;
            println!("wrote {} items to {}", store.items().len(), path);
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn cmd_import(args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (data_dir, mut store) = open_collection(&args.collection)?;
    let _lock = FileLock::acquire_default(&data_dir)?;

    let format = match args.format {
        Some(f) => f,
        None if args.file.ends_with(".json") => "json".to_string(),
        None => "csv".to_string(),
    };
    let text = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("cannot read '{}': {}", args.file, e))?;

    // Whole-file validation happens before anything is touched; a rejected
    // file leaves the store and the recovery log alone
    let (raws, source, version) = match format.as_str() {
        "csv" => (csv_to_raws(&text, store.kind()), IngestSource::Csv, 0),
        "json" => {
            let (version, raws) = read_backup(&text)?;
            (raws, IngestSource::Backup, version)
        }
        other => return Err(format!("unknown import format '{}'", other).into()),
    };

    // Capture the outgoing list first, log it only once the replacement
    // has actually persisted
    let previous: Vec<_> = store.items().iter().map(|i| i.to_value()).collect();
    let count = store.replace_all(&raws, source, version)?;
    log_recovery(
        &data_dir,
        RecoveryEntry::new(RecoveryCategory::Import, "collection replaced by import")
            .field("Collection", &args.collection)
            .field("File", &args.file)
            .body(serde_json::to_string_pretty(&previous)?),
    );

    println!("imported {} items into '{}'", count, args.collection);
    Ok(())
}

fn cmd_reset(args: ResetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (data_dir, mut store) = open_collection(&args.collection)?;
    let _lock = FileLock::acquire_default(&data_dir)?;

    if !args.force {
        return Err(format!(
            "reset discards all {} items in '{}'; pass --force to proceed",
            store.items().len(),
            args.collection
        )
        .into());
    }

    let previous: Vec<_> = store.items().iter().map(|i| i.to_value()).collect();
    log_recovery(
        &data_dir,
        RecoveryEntry::new(RecoveryCategory::Reset, "collection reset")
            .field("Collection", &args.collection)
            .field("Items", previous.len().to_string())
            .body(serde_json::to_string_pretty(&previous)?),
    );

    store.clear()?;

    // Reseed the way a fresh collection would
    if let Some(text) = load_seed(&data_dir, store.entry()) {
        let raws = csv_to_raws(&text, store.kind());
        let count = store.replace_all(&raws, IngestSource::Csv, 0)?;
        println!("reset '{}', reseeded {} items", args.collection, count);
    } else {
        println!("reset '{}', now empty", args.collection);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Recovery handlers
// ---------------------------------------------------------------------------

fn cmd_recovery(args: RecoveryCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = data_dir_cwd()?;

    match args.action {
        Some(RecoveryAction::Path) => {
            println!("{}", recovery::recovery_log_path(&data_dir).display());
            Ok(())
        }
        Some(RecoveryAction::Prune(prune)) => {
            let before = match prune.before {
                Some(ref ts) => Some(
                    chrono::DateTime::parse_from_rfc3339(ts)
                        .map_err(|e| format!("invalid --before timestamp: {}", e))?
                        .with_timezone(&chrono::Utc),
                ),
                None => None,
            };
            let removed = prune_recovery(&data_dir, before, prune.all)?;
            println!("pruned {} entries", removed);
            Ok(())
        }
        None => {
            let limit = args.limit.unwrap_or(10);
            let entries = read_recovery_entries(&data_dir, Some(limit));
            if json {
                let out: Vec<_> = entries.iter().map(|e| e.to_json()).collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else if entries.is_empty() {
                println!("recovery log is empty");
            } else {
                for entry in &entries {
                    println!(
                        "{} — {}: {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M"),
                        entry.category,
                        entry.description
                    );
                    for (key, value) in &entry.fields {
                        println!("  {}: {}", key, value);
                    }
                }
            }
            Ok(())
        }
    }
}
