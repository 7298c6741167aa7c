//! Command-line interface for dayplan
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::config::{Config, Layout};
use crate::error::{Error, Result};
use crate::output::OutputOptions;
use crate::planner::Planner;
use crate::session;
use crate::storage::Storage;

mod account;
mod block;
mod day;
mod init;
mod stats;

/// dayplan - Daily Time Planner
///
/// Plans each day on a grid of 48 half-hour slots, with block tasks
/// spanning several slots and completion statistics.
#[derive(Parser, Debug)]
#[command(name = "dayplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to current directory)
    #[arg(long, global = true, env = "DAYPLAN_DIR")]
    pub dir: Option<PathBuf>,

    /// User id for the per-user layout
    #[arg(long, global = true, env = "DAYPLAN_ID")]
    pub id: Option<String>,

    /// Password completing the per-user partition key
    #[arg(long, global = true, env = "DAYPLAN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Date to operate on, YYYY-MM-DD (defaults to today)
    #[arg(long, global = true)]
    pub date: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize dayplan in the data directory
    Init,

    /// Remember an identity for later commands
    Login,

    /// Forget the remembered identity
    Logout,

    /// Show the active identity
    Whoami,

    /// Show all 48 slots of a day with its completion stats
    Day,

    /// Set the text of a slot
    Set {
        /// Slot start, HH:MM on the half-hour grid
        slot: String,

        /// Task text
        text: String,
    },

    /// Remove a slot entry
    Clear {
        /// Slot start, HH:MM on the half-hour grid
        slot: String,
    },

    /// Mark a slot completed
    Done {
        /// Slot start, HH:MM on the half-hour grid
        slot: String,

        /// Mark not completed instead
        #[arg(long)]
        undo: bool,
    },

    /// Flip a slot's completion
    Toggle {
        /// Slot start, HH:MM on the half-hour grid
        slot: String,
    },

    /// Block task management
    #[command(subcommand)]
    Block(BlockCommands),

    /// Completion statistics
    #[command(subcommand)]
    Stats(StatsCommands),
}

/// Block task subcommands
#[derive(Subcommand, Debug)]
pub enum BlockCommands {
    /// Add a block task over a slot range (end inclusive)
    Add {
        /// Block name
        name: String,

        /// First slot, HH:MM
        #[arg(long)]
        start: String,

        /// Last slot, HH:MM
        #[arg(long)]
        end: String,

        /// Display color, #RRGGBB
        #[arg(long)]
        color: Option<String>,
    },

    /// List the day's block tasks
    #[command(alias = "list")]
    Ls,

    /// Flip a block task's completion
    Done {
        /// Block id (or a prefix of at least 4 characters)
        #[arg(value_name = "ID")]
        block_id: String,
    },

    /// Delete a block task and clear its slots
    #[command(alias = "delete")]
    Rm {
        /// Block id (or a prefix of at least 4 characters)
        #[arg(value_name = "ID")]
        block_id: String,
    },
}

/// Statistics subcommands
#[derive(Subcommand, Debug)]
pub enum StatsCommands {
    /// Completion of a single day
    Day,

    /// Monday through Sunday of the date's week
    Week,

    /// One row per month with stored data
    Month,

    /// The last N days ending at the date, newest first
    Recent {
        /// Number of days (defaults to stats.recent_days)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Totals across every stored day
    Summary,
}

/// Flags shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub dir: Option<PathBuf>,
    pub id: Option<String>,
    pub password: Option<String>,
    pub date: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    /// The data directory, falling back to the current directory
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    pub fn storage(&self) -> Result<Storage> {
        Ok(Storage::new(self.data_dir()?))
    }

    /// The `--date` value, or today in local time
    pub fn date(&self) -> Result<NaiveDate> {
        parse_date(self.date.as_deref())
    }

    /// Open a planner for the configured layout, resolving identity if needed.
    pub fn planner(&self) -> Result<Planner> {
        let dir = self.data_dir()?;
        let storage = Storage::new(dir.clone());
        let config = Config::load_from_dir(&dir);
        let key = match config.layout {
            Layout::PerUser => Some(session::resolve_key(
                &storage,
                self.id.as_deref(),
                self.password.as_deref(),
            )?),
            Layout::PerDay => None,
        };
        Planner::open(storage, config, key)
    }
}

/// Parse `YYYY-MM-DD`; `None` means today.
pub fn parse_date(input: Option<&str>) -> Result<NaiveDate> {
    match input.map(str::trim) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| Error::InvalidDate(raw.to_string())),
        None => Ok(Local::now().date_naive()),
    }
}

fn ensure_dir(path: &Path) -> Result<bool> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::OperationFailed(format!(
                "Expected directory at {}",
                path.display()
            )));
        }
        return Ok(false);
    }

    std::fs::create_dir_all(path)?;
    Ok(true)
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let globals = GlobalOptions {
            dir: self.dir,
            id: self.id,
            password: self.password,
            date: self.date,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init => init::run(&globals),
            Commands::Login => account::run_login(&globals),
            Commands::Logout => account::run_logout(&globals),
            Commands::Whoami => account::run_whoami(&globals),
            Commands::Day => day::run_show(&globals),
            Commands::Set { slot, text } => day::run_set(day::SetOptions { slot, text }, &globals),
            Commands::Clear { slot } => day::run_clear(&slot, &globals),
            Commands::Done { slot, undo } => day::run_done(day::DoneOptions { slot, undo }, &globals),
            Commands::Toggle { slot } => day::run_toggle(&slot, &globals),
            Commands::Block(cmd) => match cmd {
                BlockCommands::Add {
                    name,
                    start,
                    end,
                    color,
                } => block::run_add(
                    block::AddOptions {
                        name,
                        start,
                        end,
                        color,
                    },
                    &globals,
                ),
                BlockCommands::Ls => block::run_list(&globals),
                BlockCommands::Done { block_id } => block::run_done(&block_id, &globals),
                BlockCommands::Rm { block_id } => block::run_rm(&block_id, &globals),
            },
            Commands::Stats(cmd) => match cmd {
                StatsCommands::Day => stats::run_day(&globals),
                StatsCommands::Week => stats::run_week(&globals),
                StatsCommands::Month => stats::run_month(&globals),
                StatsCommands::Recent { days } => stats::run_recent(days, &globals),
                StatsCommands::Summary => stats::run_summary(&globals),
            },
        }
    }
}
