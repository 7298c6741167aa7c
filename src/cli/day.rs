//! dayplan day/set/clear/done/toggle command implementation

use chrono::NaiveDate;

use crate::day::{BlockTask, DayRow, SlotEntry};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, Table};
use crate::slot::{Section, TimeSlot};
use crate::stats::CompletionStats;

use super::GlobalOptions;

/// Options for `dayplan set`
pub struct SetOptions {
    pub slot: String,
    pub text: String,
}

/// Options for `dayplan done`
pub struct DoneOptions {
    pub slot: String,
    pub undo: bool,
}

#[derive(serde::Serialize)]
struct DayReport {
    date: NaiveDate,
    weekday: String,
    stats: CompletionStats,
    rows: Vec<DayRow>,
    block_tasks: Vec<BlockTask>,
}

#[derive(serde::Serialize)]
struct SlotReport {
    date: NaiveDate,
    slot: TimeSlot,
    #[serde(flatten)]
    entry: SlotEntry,
}

#[derive(serde::Serialize)]
struct ClearReport {
    date: NaiveDate,
    slot: TimeSlot,
    cleared: bool,
}

pub fn run_show(globals: &GlobalOptions) -> Result<()> {
    let date = globals.date()?;
    let planner = globals.planner()?;
    let record = planner.day(date)?;
    let stats = CompletionStats::for_day(&record, planner.count_policy());

    let report = DayReport {
        date,
        weekday: date.format("%A").to_string(),
        stats,
        rows: record.rows(),
        block_tasks: record.block_tasks.clone(),
    };

    let mut human = HumanOutput::new(format!("dayplan day: {} ({})", date, report.weekday));
    human.push_summary(
        "completed",
        format!("{}/{} ({:.1}%)", stats.completed, stats.total, stats.rate),
    );
    human.push_summary("blocks", report.block_tasks.len().to_string());

    for section in Section::ALL {
        let mut table = Table::new(["time", "done", "task"]).with_title(section.label());
        for row in report.rows.iter().filter(|row| row.section == section) {
            table.push_row([
                format!("{}-{}", row.time, row.time.end_label()),
                check(row.done).to_string(),
                row.text.clone(),
            ]);
        }
        human.push_table(table);
    }

    if !report.block_tasks.is_empty() {
        human.push_table(block_table(&report.block_tasks));
    }

    emit_success(globals.output(), "day", &report, Some(&human))?;

    Ok(())
}

pub fn run_set(options: SetOptions, globals: &GlobalOptions) -> Result<()> {
    let slot = TimeSlot::parse(&options.slot)?;
    let date = globals.date()?;
    let planner = globals.planner()?;
    let entry = planner.set_text(date, slot, &options.text)?;

    let mut human = HumanOutput::new(format!("dayplan set: {slot} on {date}"));
    human.push_summary("task", entry.text.clone());
    human.push_summary("done", entry.done.to_string());

    let report = SlotReport { date, slot, entry };
    emit_success(globals.output(), "set", &report, Some(&human))?;

    Ok(())
}

pub fn run_clear(slot: &str, globals: &GlobalOptions) -> Result<()> {
    let slot = TimeSlot::parse(slot)?;
    let date = globals.date()?;
    let planner = globals.planner()?;
    let cleared = planner.clear(date, slot)?;

    let header = if cleared {
        format!("dayplan clear: {slot} on {date}")
    } else {
        format!("dayplan clear: {slot} on {date} was already empty")
    };
    let human = HumanOutput::new(header);

    let report = ClearReport {
        date,
        slot,
        cleared,
    };
    emit_success(globals.output(), "clear", &report, Some(&human))?;

    Ok(())
}

pub fn run_done(options: DoneOptions, globals: &GlobalOptions) -> Result<()> {
    let slot = TimeSlot::parse(&options.slot)?;
    let date = globals.date()?;
    let planner = globals.planner()?;
    let entry = planner.set_done(date, slot, !options.undo)?;

    emit_slot("done", date, slot, entry, globals)
}

pub fn run_toggle(slot: &str, globals: &GlobalOptions) -> Result<()> {
    let slot = TimeSlot::parse(slot)?;
    let date = globals.date()?;
    let planner = globals.planner()?;
    let entry = planner.toggle(date, slot)?;

    emit_slot("toggle", date, slot, entry, globals)
}

fn emit_slot(
    command: &str,
    date: NaiveDate,
    slot: TimeSlot,
    entry: SlotEntry,
    globals: &GlobalOptions,
) -> Result<()> {
    let state = if entry.done { "completed" } else { "not completed" };
    let mut human = HumanOutput::new(format!("dayplan {command}: {slot} on {date} {state}"));
    if entry.has_text() {
        human.push_summary("task", entry.text.clone());
    }

    let report = SlotReport { date, slot, entry };
    emit_success(globals.output(), command, &report, Some(&human))
}

pub(super) fn block_table(blocks: &[BlockTask]) -> Table {
    let mut table = Table::new(["id", "name", "time", "done", "color"]).with_title("Blocks");
    for block in blocks {
        table.push_row([
            short_id(&block.id).to_string(),
            block.name.clone(),
            format!("{}-{}", block.start, block.end.end_label()),
            check(block.completed).to_string(),
            block.color.clone(),
        ]);
    }
    table
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn check(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}
