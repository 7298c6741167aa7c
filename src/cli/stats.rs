//! dayplan stats command implementation

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, Table};
use crate::stats::{self, CompletionStats, DayStatsRow};

use super::GlobalOptions;

pub fn run_day(globals: &GlobalOptions) -> Result<()> {
    let date = globals.date()?;
    let planner = globals.planner()?;
    let row = stats::day(planner.repository(), date, planner.count_policy())?;

    let mut human = HumanOutput::new(format!("dayplan stats day: {} ({})", row.date, row.weekday));
    push_completion(&mut human, &row.stats);

    emit_success(globals.output(), "stats day", &row, Some(&human))?;

    Ok(())
}

pub fn run_week(globals: &GlobalOptions) -> Result<()> {
    let date = globals.date()?;
    let planner = globals.planner()?;
    let week = stats::week(planner.repository(), date, planner.count_policy())?;

    let mut human = HumanOutput::new(format!("dayplan stats week: {} to {}", week.start, week.end));
    push_completion(&mut human, &week.combined);
    human.push_table(day_table(&week.days));

    emit_success(globals.output(), "stats week", &week, Some(&human))?;

    Ok(())
}

pub fn run_month(globals: &GlobalOptions) -> Result<()> {
    let planner = globals.planner()?;
    let months = stats::month(planner.repository(), planner.count_policy())?;

    let mut human = HumanOutput::new(format!("dayplan stats month: {} month(s)", months.len()));
    if months.is_empty() {
        human.push_detail("no stored days");
    } else {
        let mut table = Table::new(["month", "days", "completed", "total", "rate"]);
        for row in &months {
            table.push_row([
                row.month.clone(),
                row.days.to_string(),
                row.stats.completed.to_string(),
                row.stats.total.to_string(),
                format_rate(row.stats.rate),
            ]);
        }
        human.push_table(table);
    }

    emit_success(globals.output(), "stats month", &months, Some(&human))?;

    Ok(())
}

pub fn run_recent(days: Option<u32>, globals: &GlobalOptions) -> Result<()> {
    let date = globals.date()?;
    let planner = globals.planner()?;
    let count = days.unwrap_or(planner.config().stats.recent_days);
    if !(1..=stats::MAX_RECENT_DAYS).contains(&count) {
        return Err(Error::InvalidArgument(format!(
            "--days must be between 1 and {}",
            stats::MAX_RECENT_DAYS
        )));
    }
    let recent = stats::recent(planner.repository(), date, count, planner.count_policy())?;

    let mut human = HumanOutput::new(format!("dayplan stats recent: last {count} day(s)"));
    push_completion(&mut human, &recent.combined);
    human.push_summary("average rate", format_rate(recent.average_rate));
    human.push_table(day_table(&recent.days));

    emit_success(globals.output(), "stats recent", &recent, Some(&human))?;

    Ok(())
}

pub fn run_summary(globals: &GlobalOptions) -> Result<()> {
    let planner = globals.planner()?;
    let summary = stats::summary(planner.repository(), planner.count_policy())?;

    let mut human = HumanOutput::new("dayplan stats summary");
    human.push_summary("days tracked", summary.days_tracked.to_string());
    push_completion(&mut human, &summary.stats);
    human.push_summary("planned hours", format!("{:.1}", summary.planned_hours));

    emit_success(globals.output(), "stats summary", &summary, Some(&human))?;

    Ok(())
}

fn push_completion(human: &mut HumanOutput, stats: &CompletionStats) {
    human.push_summary("completed", format!("{}/{}", stats.completed, stats.total));
    human.push_summary("rate", format_rate(stats.rate));
}

fn day_table(rows: &[DayStatsRow]) -> Table {
    let mut table = Table::new(["date", "weekday", "completed", "total", "rate"]);
    for row in rows {
        table.push_row([
            row.date.to_string(),
            row.weekday.clone(),
            row.stats.completed.to_string(),
            row.stats.total.to_string(),
            format_rate(row.stats.rate),
        ]);
    }
    table
}

fn format_rate(rate: f64) -> String {
    format!("{rate:.1}%")
}
