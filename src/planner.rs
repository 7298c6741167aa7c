//! Planner operations.
//!
//! Every edit is one full cycle: load the day, mutate it, save it. Nothing is
//! buffered between calls, so each command sees what the previous one wrote.

use chrono::NaiveDate;

use crate::block::{self, BlockMarkers, BlockRequest};
use crate::config::{Config, Layout};
use crate::day::{BlockTask, DayRecord, SlotEntry};
use crate::error::{Error, Result};
use crate::repository::{DayFileRepository, DayRepository, UserFileRepository};
use crate::session::PartitionKey;
use crate::slot::TimeSlot;
use crate::stats::CountPolicy;
use crate::storage::Storage;

pub struct Planner {
    repo: Box<dyn DayRepository>,
    config: Config,
}

impl Planner {
    pub fn new(repo: Box<dyn DayRepository>, config: Config) -> Self {
        Self { repo, config }
    }

    /// Build a planner for the configured layout.
    ///
    /// The per-user layout needs a partition key; the per-day layout ignores it.
    pub fn open(storage: Storage, config: Config, key: Option<PartitionKey>) -> Result<Self> {
        let repo: Box<dyn DayRepository> = match config.layout {
            Layout::PerUser => {
                let key = key.ok_or(Error::NotLoggedIn)?;
                Box::new(UserFileRepository::new(storage, key))
            }
            Layout::PerDay => Box::new(DayFileRepository::new(
                storage,
                config.blocks.default_color.clone(),
            )),
        };
        Ok(Self::new(repo, config))
    }

    pub fn repository(&self) -> &dyn DayRepository {
        self.repo.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn count_policy(&self) -> CountPolicy {
        CountPolicy::from(&self.config.stats)
    }

    pub fn day(&self, date: NaiveDate) -> Result<DayRecord> {
        self.repo.load_day(date)
    }

    pub fn set_text(&self, date: NaiveDate, slot: TimeSlot, text: &str) -> Result<SlotEntry> {
        self.update(date, |day| {
            day.set_text(slot, text);
            Ok(day.tasks[&slot].clone())
        })
    }

    /// Remove a slot entry; returns whether there was one.
    pub fn clear(&self, date: NaiveDate, slot: TimeSlot) -> Result<bool> {
        self.update(date, |day| Ok(day.clear(slot).is_some()))
    }

    pub fn set_done(&self, date: NaiveDate, slot: TimeSlot, done: bool) -> Result<SlotEntry> {
        self.update(date, |day| {
            day.set_done(slot, done);
            Ok(day.tasks[&slot].clone())
        })
    }

    pub fn toggle(&self, date: NaiveDate, slot: TimeSlot) -> Result<SlotEntry> {
        self.update(date, |day| {
            day.toggle(slot);
            Ok(day.tasks[&slot].clone())
        })
    }

    /// Validate, expand over the slot range, and record the block.
    pub fn add_block(&self, date: NaiveDate, request: BlockRequest) -> Result<BlockTask> {
        let color = request
            .color
            .unwrap_or_else(|| self.config.blocks.default_color.clone());
        block::validate(&request.name, request.start, request.end)?;
        block::validate_color(&color)?;

        let markers = BlockMarkers::from(&self.config.blocks);
        let mut created = BlockTask::new(request.name.trim(), request.start, request.end, color);
        if self.config.layout == Layout::PerDay {
            // per-day files rebuild blocks from slot runs, keyed by start slot
            created.id = created.start.to_string();
        }
        self.update(date, |day| {
            block::expand(day, &created.name, created.start, created.end, &markers)?;
            for old in block::displace_overlapping(day, created.start, created.end) {
                tracing::debug!(%date, id = %old.id, "block displaced by overlap");
            }
            day.block_tasks.push(created.clone());
            Ok(())
        })?;

        tracing::debug!(%date, id = %created.id, start = %created.start, end = %created.end, "block added");
        Ok(created)
    }

    pub fn blocks(&self, date: NaiveDate) -> Result<Vec<BlockTask>> {
        Ok(self.repo.load_day(date)?.block_tasks)
    }

    /// Flip a block's completion and mirror it onto its slots.
    pub fn toggle_block(&self, date: NaiveDate, id: &str) -> Result<BlockTask> {
        self.update(date, |day| {
            let block = day.toggle_block(id)?;
            block::mark_slots(day, &block, block.completed);
            Ok(block)
        })
    }

    /// Delete a block by its stable id and clear the slots it still owns.
    pub fn delete_block(&self, date: NaiveDate, id: &str) -> Result<BlockTask> {
        self.update(date, |day| {
            let block = day.remove_block(id)?;
            let cleared = block::clear_slots(day, &block);
            tracing::debug!(%date, id = %block.id, cleared, "block deleted");
            Ok(block)
        })
    }

    fn update<T, F>(&self, date: NaiveDate, f: F) -> Result<T>
    where
        F: FnOnce(&mut DayRecord) -> Result<T>,
    {
        let mut day = self.repo.load_day(date)?;
        let result = f(&mut day)?;
        self.repo.save_day(date, &day)?;
        Ok(result)
    }
}
