//! Completion statistics over days, weeks and months.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::config::StatsConfig;
use crate::day::DayRecord;
use crate::error::{Error, Result};
use crate::repository::DayRepository;

/// Planned time represented by one counted slot
pub const HOURS_PER_SLOT: f64 = 0.5;

/// Which stored slots count toward the total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountPolicy {
    pub count_empty_slots: bool,
}

impl Default for CountPolicy {
    fn default() -> Self {
        Self {
            count_empty_slots: true,
        }
    }
}

impl From<&StatsConfig> for CountPolicy {
    fn from(config: &StatsConfig) -> Self {
        Self {
            count_empty_slots: config.count_empty_slots,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CompletionStats {
    pub completed: usize,
    pub total: usize,
    pub rate: f64,
}

impl CompletionStats {
    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            rate: completion_rate(completed, total),
        }
    }

    pub fn for_day(day: &DayRecord, policy: CountPolicy) -> Self {
        let mut completed = 0;
        let mut total = 0;
        for entry in day.tasks.values() {
            if !policy.count_empty_slots && !entry.has_text() {
                continue;
            }
            total += 1;
            if entry.done {
                completed += 1;
            }
        }
        Self::new(completed, total)
    }

    /// Combine counts and recompute the rate
    pub fn merge(self, other: CompletionStats) -> Self {
        Self::new(self.completed + other.completed, self.total + other.total)
    }
}

/// `completed / total * 100`, or 0 when there is nothing to complete
pub fn completion_rate(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayStatsRow {
    pub date: NaiveDate,
    pub weekday: String,
    #[serde(flatten)]
    pub stats: CompletionStats,
}

impl DayStatsRow {
    fn new(date: NaiveDate, stats: CompletionStats) -> Self {
        Self {
            date,
            weekday: date.format("%A").to_string(),
            stats,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekStats {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DayStatsRow>,
    pub combined: CompletionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthStatsRow {
    pub month: String,
    pub days: usize,
    #[serde(flatten)]
    pub stats: CompletionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentStats {
    pub days: Vec<DayStatsRow>,
    pub combined: CompletionStats,
    pub average_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub days_tracked: usize,
    #[serde(flatten)]
    pub stats: CompletionStats,
    pub planned_hours: f64,
}

/// Largest window `stats recent` accepts
pub const MAX_RECENT_DAYS: u32 = 366;

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> Result<NaiveDate> {
    shift(date, -i64::from(date.weekday().num_days_from_monday()))
}

// Dates near the ends of chrono's range cannot be shifted.
fn shift(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| Error::InvalidDate(date.to_string()))
}

pub fn day(repo: &dyn DayRepository, date: NaiveDate, policy: CountPolicy) -> Result<DayStatsRow> {
    let record = repo.load_day(date)?;
    Ok(DayStatsRow::new(date, CompletionStats::for_day(&record, policy)))
}

/// Monday through Sunday of the week containing `reference`
pub fn week(repo: &dyn DayRepository, reference: NaiveDate, policy: CountPolicy) -> Result<WeekStats> {
    let start = week_start(reference)?;
    let end = shift(start, 6)?;
    let days = (0..7)
        .map(|offset| day(repo, shift(start, offset)?, policy))
        .collect::<Result<Vec<_>>>()?;
    let combined = combine(&days);

    Ok(WeekStats {
        start,
        end,
        days,
        combined,
    })
}

/// One row per `YYYY-MM` with stored data, ascending
pub fn month(repo: &dyn DayRepository, policy: CountPolicy) -> Result<Vec<MonthStatsRow>> {
    let mut months: BTreeMap<String, (usize, CompletionStats)> = BTreeMap::new();
    for (date, record) in repo.load_all()? {
        let key = date.format("%Y-%m").to_string();
        let (days, stats) = months.entry(key).or_default();
        *days += 1;
        *stats = stats.merge(CompletionStats::for_day(&record, policy));
    }

    Ok(months
        .into_iter()
        .map(|(month, (days, stats))| MonthStatsRow { month, days, stats })
        .collect())
}

/// The last `count` days ending at `today`, newest first
pub fn recent(
    repo: &dyn DayRepository,
    today: NaiveDate,
    count: u32,
    policy: CountPolicy,
) -> Result<RecentStats> {
    if count > 0 {
        // fail before loading anything if the oldest day is out of range
        shift(today, 1 - i64::from(count))?;
    }
    let days = (0..i64::from(count))
        .map(|back| day(repo, shift(today, -back)?, policy))
        .collect::<Result<Vec<_>>>()?;
    let combined = combine(&days);
    let average_rate = if days.is_empty() {
        0.0
    } else {
        days.iter().map(|row| row.stats.rate).sum::<f64>() / days.len() as f64
    };

    Ok(RecentStats {
        days,
        combined,
        average_rate,
    })
}

/// Totals across every stored day
pub fn summary(repo: &dyn DayRepository, policy: CountPolicy) -> Result<Summary> {
    let all = repo.load_all()?;
    let stats = all
        .iter()
        .map(|(_, record)| CompletionStats::for_day(record, policy))
        .fold(CompletionStats::default(), CompletionStats::merge);

    Ok(Summary {
        days_tracked: all.len(),
        stats,
        planned_hours: stats.total as f64 * HOURS_PER_SLOT,
    })
}

fn combine(rows: &[DayStatsRow]) -> CompletionStats {
    rows.iter()
        .map(|row| row.stats)
        .fold(CompletionStats::default(), CompletionStats::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::repository::{DayFileRepository, UserFileRepository};
    use crate::session::PartitionKey;
    use crate::slot::TimeSlot;
    use crate::storage::Storage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_day(done: usize) -> DayRecord {
        let mut day = DayRecord::default();
        for (i, slot) in TimeSlot::all().enumerate() {
            day.set_text(slot, "");
            day.set_done(slot, i < done);
        }
        day
    }

    #[test]
    fn full_grid_with_ten_done() {
        let stats = CompletionStats::for_day(&full_day(10), CountPolicy::default());
        assert_eq!(stats.completed, 10);
        assert_eq!(stats.total, 48);
        assert!((stats.rate - 20.833).abs() < 0.01);
    }

    #[test]
    fn empty_slots_can_be_excluded() {
        let mut day = full_day(10);
        day.set_text(TimeSlot::parse("00:00").unwrap(), "sleep");
        let policy = CountPolicy {
            count_empty_slots: false,
        };

        let stats = CompletionStats::for_day(&day, policy);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.rate, 100.0);
    }

    #[test]
    fn zero_total_never_divides() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(CompletionStats::for_day(&DayRecord::default(), CountPolicy::default()).rate, 0.0);
    }

    #[test]
    fn week_runs_monday_to_sunday() {
        let temp = TempDir::new().unwrap();
        let repo = DayFileRepository::new(Storage::new(temp.path().to_path_buf()), "#FF6B6B");

        // 2024-03-07 is a Thursday
        let week = week(&repo, date(2024, 3, 7), CountPolicy::default()).unwrap();
        assert_eq!(week.start, date(2024, 3, 4));
        assert_eq!(week.end, date(2024, 3, 10));
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.days[0].weekday, "Monday");
        assert_eq!(week.days[6].weekday, "Sunday");
        assert!(week.days.iter().all(|row| row.stats.rate == 0.0 && row.stats.total == 0));
        assert_eq!(week.combined.rate, 0.0);
    }

    #[test]
    fn week_start_of_sunday_is_previous_monday() {
        assert_eq!(week_start(date(2024, 3, 10)).unwrap(), date(2024, 3, 4));
        assert_eq!(week_start(date(2024, 3, 4)).unwrap(), date(2024, 3, 4));
    }

    #[test]
    fn windows_past_the_calendar_edge_are_rejected() {
        let temp = TempDir::new().unwrap();
        let repo = DayFileRepository::new(Storage::new(temp.path().to_path_buf()), "#FF6B6B");
        let policy = CountPolicy::default();

        assert!(matches!(week(&repo, NaiveDate::MAX, policy), Err(Error::InvalidDate(_))));
        assert!(matches!(week(&repo, NaiveDate::MIN, policy), Err(Error::InvalidDate(_))));
        assert!(matches!(recent(&repo, NaiveDate::MIN, 2, policy), Err(Error::InvalidDate(_))));

        let edge = recent(&repo, NaiveDate::MIN, 1, policy).unwrap();
        assert_eq!(edge.days.len(), 1);
    }

    #[test]
    fn months_group_by_prefix() {
        let temp = TempDir::new().unwrap();
        let repo = UserFileRepository::new(
            Storage::new(temp.path().to_path_buf()),
            PartitionKey::new("kim", "pw").unwrap(),
        );
        repo.save_day(date(2024, 1, 30), &full_day(12)).unwrap();
        repo.save_day(date(2024, 1, 31), &full_day(0)).unwrap();
        repo.save_day(date(2024, 2, 1), &full_day(48)).unwrap();

        let rows = month(&repo, CountPolicy::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, "2024-01");
        assert_eq!(rows[0].days, 2);
        assert_eq!(rows[0].stats.total, 96);
        assert_eq!(rows[0].stats.completed, 12);
        assert_eq!(rows[0].stats.rate, 12.5);
        assert_eq!(rows[1].month, "2024-02");
        assert_eq!(rows[1].stats.rate, 100.0);
    }

    #[test]
    fn recent_is_newest_first_with_mean_rate() {
        let temp = TempDir::new().unwrap();
        let repo = DayFileRepository::new(Storage::new(temp.path().to_path_buf()), "#FF6B6B");
        repo.save_day(date(2024, 3, 7), &full_day(24)).unwrap();

        let recent = recent(&repo, date(2024, 3, 7), 4, CountPolicy::default()).unwrap();
        assert_eq!(recent.days.len(), 4);
        assert_eq!(recent.days[0].date, date(2024, 3, 7));
        assert_eq!(recent.days[3].date, date(2024, 3, 4));
        assert_eq!(recent.days[0].stats.rate, 50.0);
        assert_eq!(recent.average_rate, 12.5);
    }

    #[test]
    fn summary_counts_planned_hours() {
        let temp = TempDir::new().unwrap();
        let repo = DayFileRepository::new(Storage::new(temp.path().to_path_buf()), "#FF6B6B");
        repo.save_day(date(2024, 3, 7), &full_day(6)).unwrap();
        repo.save_day(date(2024, 3, 8), &full_day(0)).unwrap();

        let summary = summary(&repo, CountPolicy::default()).unwrap();
        assert_eq!(summary.days_tracked, 2);
        assert_eq!(summary.stats.total, 96);
        assert_eq!(summary.stats.completed, 6);
        assert_eq!(summary.planned_hours, 48.0);
    }
}
