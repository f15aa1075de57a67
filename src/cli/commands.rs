use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pulse", about = concat!("pulse v", env!("CARGO_PKG_VERSION"), " - habits and events, one day at a time"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory (default: $PULSE_DIR or the platform data dir)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Selected date as YYYY-MM-DD (default: today)
    #[arg(long, global = true)]
    pub date: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory with an empty tracker list
    Init(InitArgs),
    /// Show what is due on the selected date
    List(ListArgs),
    /// Search tracker names, ignoring date and filter
    Search(SearchArgs),
    /// List categories
    Categories,
    /// Manage categories
    Category(CategoryCmd),
    /// Add a habit (with --days) or a one-off event
    Add(AddArgs),
    /// Change a tracker
    Edit(EditArgs),
    /// Delete a tracker and its history
    Delete(TaskRefArgs),
    /// Pin a tracker to the top
    Pin(TaskRefArgs),
    /// Unpin a tracker
    Unpin(TaskRefArgs),
    /// Mark a tracker done on the selected date, or undo it
    Done(TaskRefArgs),
    /// Show or set the list filter
    Filter(FilterArgs),
    /// Set the language
    Locale(LocaleArgs),
    /// Show completion counts
    Stats,
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Language (en, ru)
    #[arg(long, default_value = "en")]
    pub locale: String,
    /// Start over even if data already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Filter for this listing only (all, today, completed, not-completed)
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for (case-insensitive)
    pub query: String,
}

// ---------------------------------------------------------------------------
// Category args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CategoryCmd {
    #[command(subcommand)]
    pub action: CategoryAction,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Create an empty category
    Add {
        /// Category title
        title: String,
    },
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Category to add to
    pub category: String,
    /// Tracker name
    pub name: String,
    /// Emoji shown next to the name
    #[arg(long)]
    pub emoji: String,
    /// Color as #RRGGBB
    #[arg(long)]
    pub color: String,
    /// Weekdays for a habit, comma-separated (mon,wed,fri); omit for an event
    #[arg(long)]
    pub days: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Tracker id or id prefix
    pub id: String,
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New emoji
    #[arg(long)]
    pub emoji: Option<String>,
    /// New color as #RRGGBB
    #[arg(long)]
    pub color: Option<String>,
    /// New weekdays (makes it a habit)
    #[arg(long, conflicts_with = "event")]
    pub days: Option<String>,
    /// Drop the schedule (makes it an event)
    #[arg(long)]
    pub event: bool,
    /// Move to another category
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct TaskRefArgs {
    /// Tracker id or id prefix
    pub id: String,
}

#[derive(Args)]
pub struct FilterArgs {
    /// New filter (all, today, completed, not-completed); omit to show the current one
    pub filter: Option<String>,
}

#[derive(Args)]
pub struct LocaleArgs {
    /// Language (en, ru)
    pub locale: String,
}
