pub mod categories;
pub mod categorize;
pub mod clear;
pub mod completions;
pub mod import;
pub mod init;
pub mod list;
pub mod memo;
pub mod profile;
pub mod rules;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db;
use crate::error::Result;
use crate::settings::FileSettings;
use crate::sorter::SortColumn;

/// Per-invocation handles: where the database lives and the settings file.
pub struct Context {
    pub data_dir: PathBuf,
    /// Set when `--data-dir` / `SIFT_DATA_DIR` overrides the saved setting.
    pub data_dir_override: bool,
    pub settings: FileSettings,
}

impl Context {
    pub fn new(data_dir: Option<&str>) -> Self {
        let settings = FileSettings::load();
        let (data_dir, data_dir_override) = match data_dir {
            Some(dir) => (PathBuf::from(dir), true),
            None => (PathBuf::from(&settings.settings().data_dir), false),
        };
        Self {
            data_dir,
            data_dir_override,
            settings,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(db::DB_FILE)
    }

    pub fn open_db(&self) -> Result<Connection> {
        db::open(&self.data_dir)
    }
}

/// Ask a yes/no question; anything but an explicit yes (including a closed
/// stdin) counts as no.
pub(crate) fn confirm(prompt: &str) -> bool {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

#[derive(Parser)]
#[command(
    name = "sift",
    version,
    about = "Import bank statements, drop duplicates, and categorize spending with keyword rules."
)]
pub struct Cli {
    /// Data directory holding sift.db (default: from settings, ~/Documents/sift)
    #[arg(long = "data-dir", global = true, env = "SIFT_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save the data directory and create the database.
    Init,
    /// Import CSV statements, skipping rows already stored, then apply all rules.
    Import {
        /// CSV files with a header row
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Show transactions after applying all rules.
    List {
        /// Column to sort by (default: the saved sort)
        #[arg(long, value_enum)]
        sort: Option<SortColumn>,
        /// Sort ascending
        #[arg(long, conflicts_with = "desc")]
        asc: bool,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Show at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Select a sort column like clicking a table header: a new column
    /// starts in its default direction, the same column flips.
    Sort {
        #[arg(value_enum)]
        column: SortColumn,
    },
    /// Set a transaction's category and optionally turn it into a rule.
    Categorize {
        /// Transaction ID (shown in `sift list`)
        id: i64,
        /// New category; empty string clears it
        category: String,
        /// Create the suggested rule without asking
        #[arg(long, conflicts_with = "no_rule")]
        rule: bool,
        /// Never create a rule
        #[arg(long = "no-rule")]
        no_rule: bool,
        /// Apply a newly created rule to all existing transactions without asking
        #[arg(long)]
        apply: bool,
    },
    /// Set a transaction's memo.
    Memo {
        /// Transaction ID
        id: i64,
        /// Memo text; empty string clears it
        text: String,
    },
    /// Manage categorization rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Manage category labels.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Show or change the display name and group label.
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        group: Option<String>,
    },
    /// Delete every transaction. Rules are kept.
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show data location and counts.
    Status,
    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a rule: descriptions containing KEYWORD (any case) get CATEGORY.
    Add {
        keyword: String,
        #[arg(long)]
        category: String,
        /// Apply the rule to existing transactions right away
        #[arg(long)]
        apply: bool,
    },
    /// List rules in the order they are applied.
    List,
    /// Update an existing rule.
    Update {
        /// Rule ID (shown in `sift rules list`)
        id: i64,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a rule by ID.
    Delete { id: i64 },
    /// Apply one rule to all transactions.
    Apply { id: i64 },
    /// Apply every rule in order; the last matching rule wins.
    ApplyAll,
    /// Delete all rules.
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List categories from transactions, rules and added labels.
    List,
    /// Add a category label.
    Add { name: String },
}
