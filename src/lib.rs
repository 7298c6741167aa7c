//! dayplan - Daily Time Planner Library
//!
//! This library provides the core functionality for the dayplan CLI tool,
//! a planner that splits each day into 48 half-hour slots.
//!
//! # Core Concepts
//!
//! - **Slots**: Fixed 30-minute grid from 00:00 to 23:30
//! - **Day records**: Per-slot text and completion, plus block tasks
//! - **Block tasks**: Named activities expanded over a contiguous slot range
//! - **Layouts**: Per-user documents or one flat file per date
//! - **Statistics**: Completion rates per day, week, month and overall
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.dayplan.toml`
//! - `error`: Error types and result aliases
//! - `slot`: The half-hour grid
//! - `day`: Day records and the per-user document
//! - `block`: Block task validation and expansion
//! - `storage`: File storage and atomic JSON writes
//! - `repository`: Layout-specific persistence of day records
//! - `session`: Identity partition keys and the persisted login
//! - `planner`: Load-modify-save operations over one repository
//! - `stats`: Completion statistics

pub mod block;
pub mod cli;
pub mod config;
pub mod day;
pub mod error;
pub mod output;
pub mod planner;
pub mod repository;
pub mod session;
pub mod slot;
pub mod stats;
pub mod storage;

pub use error::{Error, Result};
