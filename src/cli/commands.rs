use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hy", about = concat!("[=] hylle v", env!("CARGO_PKG_VERSION"), " - shelf tracking for games and comics"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new hylle data directory here
    Init(InitArgs),
    /// List the registered collections
    Collections,
    /// List a collection, filtered and grouped
    List(ListArgs),
    /// Show one item in full
    Show(ShowArgs),
    /// Show collection counts
    Stats(StatsArgs),
    /// Add an item
    Add(AddArgs),
    /// Edit an item's text fields
    Edit(EditArgs),
    /// Turn a flag on or off
    Set(SetArgs),
    /// Grade a comic's condition (toggles ownership)
    Cond(CondArgs),
    /// Delete an item
    Rm(RmArgs),
    /// Export a collection to CSV or a JSON backup
    Export(ExportArgs),
    /// Replace a collection from a CSV or JSON backup file
    Import(ImportArgs),
    /// Discard a collection and reseed it
    Reset(ResetArgs),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Create an initial collection: --collection <id> <games|comics> "title" (repeatable)
    #[arg(long, num_args = 3, value_names = ["ID", "KIND", "TITLE"], action = clap::ArgAction::Append)]
    pub collection: Vec<String>,
    /// Reinitialize even if hylle/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Collection to list
    pub collection: String,
    /// Filter by category (all, confirmed, unverified)
    #[arg(long)]
    pub category: Option<String>,
    /// Require a flag to be set (cart, manual, box, wanted, owned; repeatable)
    #[arg(long = "with")]
    pub with: Vec<String>,
    /// Free-text search over titles, notes, and flag labels
    #[arg(short, long)]
    pub query: Option<String>,
    /// Plain sorted list, no group headers
    #[arg(long)]
    pub flat: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Collection the item belongs to
    pub collection: String,
    /// Item id
    pub id: String,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Collection to summarize (default: all)
    pub collection: Option<String>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Collection to add to
    pub collection: String,
    /// Item title
    pub title: String,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub variant: Option<String>,
    #[arg(long)]
    pub sources: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Category (confirmed, unverified; default confirmed)
    #[arg(long)]
    pub category: Option<String>,
    /// Put the item on the want-list
    #[arg(long)]
    pub wanted: bool,
}

#[derive(Args)]
pub struct EditArgs {
    /// Collection the item belongs to
    pub collection: String,
    /// Item id
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub variant: Option<String>,
    #[arg(long)]
    pub sources: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Category (confirmed, unverified)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct SetArgs {
    /// Collection the item belongs to
    pub collection: String,
    /// Item id
    pub id: String,
    /// Flag name (cart, manual, box, wanted, owned)
    pub flag: String,
    /// "on" or "off"
    pub value: String,
}

#[derive(Args)]
pub struct CondArgs {
    /// Collection the item belongs to
    pub collection: String,
    /// Item id
    pub id: String,
    /// Condition grade (bad, ok, good)
    pub level: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Collection the item belongs to
    pub collection: String,
    /// Item id
    pub id: String,
}

// ---------------------------------------------------------------------------
// Bulk command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportArgs {
    /// Collection to export
    pub collection: String,
    /// Output format: csv or json (default csv)
    #[arg(long, default_value = "csv")]
    pub format: String,
    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Collection to replace
    pub collection: String,
    /// File to import (.csv or .json)
    pub file: String,
    /// Format override: csv or json (default: from extension)
    #[arg(long)]
    pub format: Option<String>,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Collection to reset
    pub collection: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Recovery args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}
