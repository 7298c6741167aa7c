//! Layout-specific persistence of day records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::block;
use crate::day::{fold_slot_map, DayRecord, SlotEntry, UserDocument};
use crate::error::Result;
use crate::session::PartitionKey;
use crate::slot::TimeSlot;
use crate::storage::Storage;

/// Load and store day records for one partition
pub trait DayRepository {
    /// The day's record; empty when nothing is stored
    fn load_day(&self, date: NaiveDate) -> Result<DayRecord>;

    /// Replace the stored record of `date`
    fn save_day(&self, date: NaiveDate, day: &DayRecord) -> Result<()>;

    /// Every date with stored data, ascending
    fn dates(&self) -> Result<Vec<NaiveDate>>;

    /// Every stored day, ascending by date
    fn load_all(&self) -> Result<Vec<(NaiveDate, DayRecord)>> {
        self.dates()?
            .into_iter()
            .map(|date| Ok((date, self.load_day(date)?)))
            .collect()
    }
}

/// One document per identity, holding all of its days
#[derive(Debug, Clone)]
pub struct UserFileRepository {
    storage: Storage,
    key: PartitionKey,
}

impl UserFileRepository {
    pub fn new(storage: Storage, key: PartitionKey) -> Self {
        Self { storage, key }
    }

    pub fn key(&self) -> &PartitionKey {
        &self.key
    }

    pub fn load_document(&self) -> Result<UserDocument> {
        self.storage.load(&self.storage.user_file(self.key.as_str()))
    }

    pub fn save_document(&self, doc: &UserDocument) -> Result<()> {
        self.storage.save(&self.storage.user_file(self.key.as_str()), doc)
    }
}

impl DayRepository for UserFileRepository {
    fn load_day(&self, date: NaiveDate) -> Result<DayRecord> {
        Ok(self.load_document()?.day(date).cloned().unwrap_or_default())
    }

    fn save_day(&self, date: NaiveDate, day: &DayRecord) -> Result<()> {
        let mut doc = self.load_document()?;
        *doc.day_mut(date) = day.clone();
        self.save_document(&doc)
    }

    fn dates(&self) -> Result<Vec<NaiveDate>> {
        Ok(self.load_document()?.days.keys().copied().collect())
    }

    fn load_all(&self) -> Result<Vec<(NaiveDate, DayRecord)>> {
        Ok(self.load_document()?.days.into_iter().collect())
    }
}

/// One flat slot map per calendar date
///
/// Only slots are persisted; block tasks are rebuilt from slot runs on load,
/// so their colors fall back to `default_color`.
#[derive(Debug, Clone)]
pub struct DayFileRepository {
    storage: Storage,
    default_color: String,
}

impl DayFileRepository {
    pub fn new(storage: Storage, default_color: impl Into<String>) -> Self {
        Self {
            storage,
            default_color: default_color.into(),
        }
    }
}

impl DayRepository for DayFileRepository {
    fn load_day(&self, date: NaiveDate) -> Result<DayRecord> {
        let raw: BTreeMap<String, Value> = self.storage.load(&self.storage.day_file(date))?;
        let mut day = DayRecord {
            tasks: fold_slot_map(raw),
            block_tasks: Vec::new(),
        };
        day.block_tasks = block::block_runs(&day, &self.default_color);
        Ok(day)
    }

    fn save_day(&self, date: NaiveDate, day: &DayRecord) -> Result<()> {
        let path = self.storage.day_file(date);
        if day.tasks.is_empty() {
            self.storage.remove(&path)?;
            return Ok(());
        }
        let flat: &BTreeMap<TimeSlot, SlotEntry> = &day.tasks;
        self.storage.save(&path, flat)
    }

    fn dates(&self) -> Result<Vec<NaiveDate>> {
        self.storage.day_file_dates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::block::{expand, BlockMarkers};
    use crate::day::SlotKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn slot(label: &str) -> TimeSlot {
        TimeSlot::parse(label).unwrap()
    }

    #[test]
    fn user_file_keeps_days_side_by_side() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        let repo = UserFileRepository::new(storage.clone(), PartitionKey::new("kim", "pw").unwrap());

        let mut monday = DayRecord::default();
        monday.set_text(slot("09:00"), "standup");
        repo.save_day(date(2024, 3, 4), &monday).unwrap();
        repo.save_day(date(2024, 3, 5), &DayRecord::default()).unwrap();

        assert_eq!(repo.load_day(date(2024, 3, 4)).unwrap(), monday);
        assert_eq!(repo.dates().unwrap(), vec![date(2024, 3, 4), date(2024, 3, 5)]);
        assert!(storage.user_file("kim_pw").exists());

        let other = UserFileRepository::new(storage, PartitionKey::new("kim", "other").unwrap());
        assert!(other.load_day(date(2024, 3, 4)).unwrap().is_empty());
    }

    #[test]
    fn user_file_reads_legacy_documents() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        let legacy = r#"{
  "2024-03-04": {
    "tasks": {
      "09:00-09:30": "운동",
      "09:00-09:30_completed": true,
      "09:30-10:00": "",
      "09:30-10:00_completed": false
    },
    "block_tasks": []
  }
}"#;
        fs::write(storage.user_file("kim_pw"), legacy).unwrap();

        let repo = UserFileRepository::new(storage, PartitionKey::new("kim", "pw").unwrap());
        let day = repo.load_day(date(2024, 3, 4)).unwrap();
        assert_eq!(day.tasks.len(), 2);
        assert_eq!(day.tasks[&slot("09:00")].text, "운동");
        assert!(day.tasks[&slot("09:00")].done);
    }

    #[test]
    fn day_file_is_flat_and_rebuilds_blocks() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        let repo = DayFileRepository::new(storage.clone(), "#FF6B6B");
        let markers = BlockMarkers {
            middle: "→".to_string(),
            end: "끝".to_string(),
        };

        let mut day = DayRecord::default();
        expand(&mut day, "Study", slot("09:00"), slot("10:00"), &markers).unwrap();
        repo.save_day(date(2024, 3, 4), &day).unwrap();

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(storage.day_file(date(2024, 3, 4))).unwrap())
                .unwrap();
        assert_eq!(raw["09:00"]["text"], "Study");
        assert_eq!(raw["09:00"]["type"], "block_start");
        assert!(raw.get("tasks").is_none());

        let loaded = repo.load_day(date(2024, 3, 4)).unwrap();
        assert_eq!(loaded.tasks[&slot("10:00")].kind, SlotKind::BlockEnd);
        assert_eq!(loaded.block_tasks.len(), 1);
        assert_eq!(loaded.block_tasks[0].id, "09:00");
    }

    #[test]
    fn saving_empty_day_deletes_its_file() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        let repo = DayFileRepository::new(storage.clone(), "#FF6B6B");
        let path = storage.day_file(date(2024, 3, 4));

        let mut day = DayRecord::default();
        day.set_text(slot("12:00"), "lunch");
        repo.save_day(date(2024, 3, 4), &day).unwrap();
        assert!(path.exists());

        day.clear(slot("12:00"));
        repo.save_day(date(2024, 3, 4), &day).unwrap();
        assert!(!path.exists());
        assert!(repo.dates().unwrap().is_empty());
    }

    #[test]
    fn day_file_skips_non_object_values() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());
        fs::write(
            storage.day_file(date(2024, 3, 4)),
            r#"{"08:00": {"text": "wake", "done": true, "type": "normal"}, "08:30": 5}"#,
        )
        .unwrap();

        let repo = DayFileRepository::new(storage, "#FF6B6B");
        let day = repo.load_day(date(2024, 3, 4)).unwrap();
        assert_eq!(day.tasks.len(), 1);
        assert!(day.tasks[&slot("08:00")].done);
    }
}
