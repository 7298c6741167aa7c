//! dayplan block command implementation
//!
//! Block tasks expand a named activity over a contiguous slot range.

use chrono::NaiveDate;

use crate::block::BlockRequest;
use crate::day::BlockTask;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::slot::TimeSlot;

use super::day::block_table;
use super::GlobalOptions;

/// Options for `dayplan block add`
pub struct AddOptions {
    pub name: String,
    pub start: String,
    pub end: String,
    pub color: Option<String>,
}

#[derive(serde::Serialize)]
struct BlockReport {
    date: NaiveDate,
    block: BlockTask,
}

#[derive(serde::Serialize)]
struct BlockListReport {
    date: NaiveDate,
    block_tasks: Vec<BlockTask>,
}

pub fn run_add(options: AddOptions, globals: &GlobalOptions) -> Result<()> {
    let request = BlockRequest {
        name: options.name,
        start: TimeSlot::parse(&options.start)?,
        end: TimeSlot::parse(&options.end)?,
        color: options.color,
    };
    let date = globals.date()?;
    let planner = globals.planner()?;
    let block = planner.add_block(date, request)?;

    let mut human = HumanOutput::new(format!("dayplan block add: {} on {date}", block.name));
    human.push_summary("id", block.id.clone());
    human.push_summary("time", format!("{}-{}", block.start, block.end.end_label()));
    human.push_summary("slots", block.slots().count().to_string());
    human.push_summary("color", block.color.clone());
    human.push_next_step(format!("dayplan block done {}", block.id));

    let report = BlockReport { date, block };
    emit_success(globals.output(), "block add", &report, Some(&human))?;

    Ok(())
}

pub fn run_list(globals: &GlobalOptions) -> Result<()> {
    let date = globals.date()?;
    let planner = globals.planner()?;
    let block_tasks = planner.blocks(date)?;

    let header = if block_tasks.is_empty() {
        format!("dayplan block ls: no block tasks on {date}")
    } else {
        format!("dayplan block ls: {} on {date}", block_tasks.len())
    };
    let mut human = HumanOutput::new(header);
    if block_tasks.is_empty() {
        human.push_next_step("dayplan block add <name> --start HH:MM --end HH:MM");
    } else {
        human.push_table(block_table(&block_tasks));
    }

    let report = BlockListReport { date, block_tasks };
    emit_success(globals.output(), "block ls", &report, Some(&human))?;

    Ok(())
}

pub fn run_done(id: &str, globals: &GlobalOptions) -> Result<()> {
    let date = globals.date()?;
    let planner = globals.planner()?;
    let block = planner.toggle_block(date, id)?;

    let state = if block.completed { "completed" } else { "not completed" };
    let human = HumanOutput::new(format!("dayplan block done: {} {state}", block.name));

    let report = BlockReport { date, block };
    emit_success(globals.output(), "block done", &report, Some(&human))?;

    Ok(())
}

pub fn run_rm(id: &str, globals: &GlobalOptions) -> Result<()> {
    let date = globals.date()?;
    let planner = globals.planner()?;
    let block = planner.delete_block(date, id)?;

    let mut human = HumanOutput::new(format!("dayplan block rm: {}", block.name));
    human.push_summary("time", format!("{}-{}", block.start, block.end.end_label()));

    let report = BlockReport { date, block };
    emit_success(globals.output(), "block rm", &report, Some(&human))?;

    Ok(())
}
