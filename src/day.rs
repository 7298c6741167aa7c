//! In-memory day records.
//!
//! A day is a map from [`TimeSlot`] to [`SlotEntry`] plus the list of block
//! tasks defined on it. The per-user document groups day records by date.
//!
//! Older per-user files stored each slot as two sibling keys,
//! `"09:00-09:30"` (text) and `"09:00-09:30_completed"` (flag). The reader
//! folds those pairs into one [`SlotEntry`]; the writer only emits the
//! structured form.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Error;
use crate::slot::{Section, TimeSlot};

const LEGACY_COMPLETED_SUFFIX: &str = "_completed";

/// Role of a slot within the day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    #[default]
    Normal,
    BlockStart,
    BlockMiddle,
    BlockEnd,
}

impl SlotKind {
    pub fn is_block(self) -> bool {
        !matches!(self, SlotKind::Normal)
    }
}

/// Task recorded in one slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(rename = "type", default)]
    pub kind: SlotKind,
}

impl SlotEntry {
    pub fn new(text: impl Into<String>, kind: SlotKind) -> Self {
        Self {
            text: text.into(),
            done: false,
            kind,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Named activity spanning a contiguous run of slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTask {
    /// Stable identifier, assigned at creation
    #[serde(default = "new_block_id")]
    pub id: String,
    pub name: String,
    pub start: TimeSlot,
    pub end: TimeSlot,
    pub color: String,
    #[serde(default)]
    pub completed: bool,
}

impl BlockTask {
    pub fn new(name: impl Into<String>, start: TimeSlot, end: TimeSlot, color: impl Into<String>) -> Self {
        Self {
            id: new_block_id(),
            name: name.into(),
            start,
            end,
            color: color.into(),
            completed: false,
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> {
        TimeSlot::range_inclusive(self.start, self.end)
    }

    /// True when `input` is this block's id or an unambiguous-looking prefix of it
    pub fn matches_id(&self, input: &str) -> bool {
        let input = input.trim();
        !input.is_empty() && (self.id == input || (input.len() >= 4 && self.id.starts_with(input)))
    }
}

fn new_block_id() -> String {
    Uuid::new_v4().to_string()
}

/// One calendar day of one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(default, deserialize_with = "deserialize_slot_map")]
    pub tasks: BTreeMap<TimeSlot, SlotEntry>,
    #[serde(default, deserialize_with = "deserialize_blocks")]
    pub block_tasks: Vec<BlockTask>,
}

/// Display row for one slot of the day view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayRow {
    pub time: TimeSlot,
    pub section: Section,
    pub text: String,
    pub done: bool,
    #[serde(rename = "type")]
    pub kind: SlotKind,
}

impl DayRecord {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.block_tasks.is_empty()
    }

    pub fn entry(&self, slot: TimeSlot) -> Option<&SlotEntry> {
        self.tasks.get(&slot)
    }

    /// Set the text of a slot, keeping its completion flag and kind.
    pub fn set_text(&mut self, slot: TimeSlot, text: impl Into<String>) {
        self.tasks.entry(slot).or_default().text = text.into();
    }

    /// Remove a slot entry entirely; returns the removed entry.
    pub fn clear(&mut self, slot: TimeSlot) -> Option<SlotEntry> {
        self.tasks.remove(&slot)
    }

    pub fn set_done(&mut self, slot: TimeSlot, done: bool) {
        self.tasks.entry(slot).or_default().done = done;
    }

    /// Flip the completion flag; returns the new value.
    pub fn toggle(&mut self, slot: TimeSlot) -> bool {
        let entry = self.tasks.entry(slot).or_default();
        entry.done = !entry.done;
        entry.done
    }

    /// All 48 slots, filling gaps with empty normal rows
    pub fn rows(&self) -> Vec<DayRow> {
        TimeSlot::all()
            .map(|slot| {
                let entry = self.tasks.get(&slot);
                DayRow {
                    time: slot,
                    section: slot.section(),
                    text: entry.map(|e| e.text.clone()).unwrap_or_default(),
                    done: entry.map(|e| e.done).unwrap_or(false),
                    kind: entry.map(|e| e.kind).unwrap_or_default(),
                }
            })
            .collect()
    }

    /// Index of the block addressed by `id`. An exact id wins; a prefix must
    /// match exactly one block.
    fn block_index(&self, id: &str) -> crate::error::Result<usize> {
        let id = id.trim();
        if let Some(idx) = self.block_tasks.iter().position(|b| b.id == id) {
            return Ok(idx);
        }
        let mut matches = self
            .block_tasks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.matches_id(id))
            .map(|(idx, _)| idx);
        match (matches.next(), matches.next()) {
            (Some(idx), None) => Ok(idx),
            (Some(_), Some(_)) => Err(Error::InvalidArgument(format!(
                "block id prefix '{id}' matches more than one block"
            ))),
            (None, _) => Err(Error::BlockNotFound(id.to_string())),
        }
    }

    pub fn block(&self, id: &str) -> crate::error::Result<&BlockTask> {
        let idx = self.block_index(id)?;
        Ok(&self.block_tasks[idx])
    }

    pub fn block_mut(&mut self, id: &str) -> crate::error::Result<&mut BlockTask> {
        let idx = self.block_index(id)?;
        Ok(&mut self.block_tasks[idx])
    }

    /// Flip a block's completion; returns the updated block.
    pub fn toggle_block(&mut self, id: &str) -> crate::error::Result<BlockTask> {
        let block = self.block_mut(id)?;
        block.completed = !block.completed;
        Ok(block.clone())
    }

    pub fn remove_block(&mut self, id: &str) -> crate::error::Result<BlockTask> {
        let idx = self.block_index(id)?;
        Ok(self.block_tasks.remove(idx))
    }
}

/// All days of one identity, keyed by calendar date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserDocument {
    pub days: BTreeMap<NaiveDate, DayRecord>,
}

impl UserDocument {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.days.get(&date)
    }

    /// The day's record, materialized empty on first touch
    pub fn day_mut(&mut self, date: NaiveDate) -> &mut DayRecord {
        self.days.entry(date).or_default()
    }
}

/// Fold a raw JSON slot map into structured entries.
///
/// Accepts structured values keyed by `HH:MM`, legacy text keyed by
/// `HH:MM-HH:MM`, and legacy `<key>_completed` flags. Keys off the grid and
/// values of any other shape are dropped.
pub(crate) fn fold_slot_map(raw: BTreeMap<String, Value>) -> BTreeMap<TimeSlot, SlotEntry> {
    let mut tasks: BTreeMap<TimeSlot, SlotEntry> = BTreeMap::new();

    for (key, value) in raw {
        if let Some(base) = key.strip_suffix(LEGACY_COMPLETED_SUFFIX) {
            match (legacy_slot(base), value) {
                (Some(slot), Value::Bool(done)) => tasks.entry(slot).or_default().done = done,
                _ => tracing::trace!(key = %key, "dropping unrecognized completion key"),
            }
            continue;
        }

        let Some(slot) = legacy_slot(&key) else {
            tracing::trace!(key = %key, "dropping off-grid slot key");
            continue;
        };

        match value {
            Value::String(text) => tasks.entry(slot).or_default().text = text,
            Value::Object(_) => match serde_json::from_value::<SlotEntry>(value) {
                Ok(entry) => {
                    tasks.insert(slot, entry);
                }
                Err(err) => tracing::trace!(key = %key, error = %err, "dropping malformed slot"),
            },
            _ => tracing::trace!(key = %key, "dropping slot with unsupported value"),
        }
    }

    tasks
}

/// `"09:00"` or legacy `"09:00-09:30"` to a slot. A range must span exactly
/// one slot.
fn legacy_slot(key: &str) -> Option<TimeSlot> {
    match key.split_once('-') {
        Some((start, end)) => {
            let slot = TimeSlot::parse(start).ok()?;
            (slot.end_label() == end).then_some(slot)
        }
        None => TimeSlot::parse(key).ok(),
    }
}

fn deserialize_slot_map<'de, D>(deserializer: D) -> Result<BTreeMap<TimeSlot, SlotEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(fold_slot_map(raw))
}

fn deserialize_blocks<'de, D>(deserializer: D) -> Result<Vec<BlockTask>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<BlockTask>(value) {
            Ok(block) => Some(block),
            Err(err) => {
                tracing::trace!(error = %err, "dropping malformed block task");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(label: &str) -> TimeSlot {
        TimeSlot::parse(label).unwrap()
    }

    #[test]
    fn set_text_keeps_flag_and_kind() {
        let mut day = DayRecord::default();
        day.set_done(slot("09:00"), true);
        day.set_text(slot("09:00"), "write report");

        let entry = day.entry(slot("09:00")).unwrap();
        assert_eq!(entry.text, "write report");
        assert!(entry.done);
        assert_eq!(entry.kind, SlotKind::Normal);
    }

    #[test]
    fn double_toggle_restores_flag() {
        let mut day = DayRecord::default();
        day.set_text(slot("10:30"), "gym");

        assert!(day.toggle(slot("10:30")));
        assert!(!day.toggle(slot("10:30")));
        assert!(!day.entry(slot("10:30")).unwrap().done);
    }

    #[test]
    fn rows_cover_the_whole_grid() {
        let mut day = DayRecord::default();
        day.set_text(slot("07:00"), "breakfast");

        let rows = day.rows();
        assert_eq!(rows.len(), 48);
        assert_eq!(rows[14].text, "breakfast");
        assert_eq!(rows[14].section, Section::Morning);
        assert_eq!(rows[0].text, "");
        assert_eq!(rows[0].kind, SlotKind::Normal);
    }

    #[test]
    fn legacy_pairs_fold_into_entries() {
        let raw = serde_json::json!({
            "tasks": {
                "09:00-09:30": "standup",
                "09:00-09:30_completed": true,
                "23:30-00:00": "",
                "23:30-00:00_completed": false,
                "25:00-25:30": "nonsense"
            },
            "block_tasks": [
                {"name": "deep work", "start": "13:00", "end": "15:00", "color": "#FF6B6B", "completed": false},
                {"name": "odd", "start": "13:15", "end": "14:00", "color": "#000000", "completed": false}
            ]
        });

        let day: DayRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(day.tasks.len(), 2);
        let standup = day.entry(slot("09:00")).unwrap();
        assert_eq!(standup.text, "standup");
        assert!(standup.done);
        assert!(day.entry(slot("23:30")).is_some());

        assert_eq!(day.block_tasks.len(), 1);
        assert_eq!(day.block_tasks[0].name, "deep work");
        assert!(!day.block_tasks[0].id.is_empty());
    }

    #[test]
    fn structured_form_round_trips() {
        let mut day = DayRecord::default();
        day.set_text(slot("08:00"), "출근");
        day.set_done(slot("08:00"), true);
        day.block_tasks
            .push(BlockTask::new("focus", slot("13:00"), slot("14:00"), "#00AA00"));

        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["tasks"]["08:00"]["type"], "normal");
        let back: DayRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, day);
    }

    #[test]
    fn day_mut_materializes_empty_record() {
        let mut doc = UserDocument::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert!(doc.day(date).is_none());

        let day = doc.day_mut(date);
        assert!(day.tasks.is_empty());
        assert!(day.block_tasks.is_empty());

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json, serde_json::json!({"2024-03-04": {"tasks": {}, "block_tasks": []}}));
    }

    #[test]
    fn block_lookup_accepts_prefix() {
        let mut day = DayRecord::default();
        let block = BlockTask::new("focus", slot("13:00"), slot("14:00"), "#00AA00");
        let id = block.id.clone();
        day.block_tasks.push(block);

        assert!(day.block(&id[..8]).is_ok());
        assert!(matches!(day.block("abc"), Err(Error::BlockNotFound(_))));
        assert!(day.remove_block(&id).is_ok());
        assert!(day.block_tasks.is_empty());
    }

    #[test]
    fn toggle_block_twice_restores_state() {
        let mut day = DayRecord::default();
        let block = BlockTask::new("walk", slot("18:00"), slot("18:30"), "#00AA00");
        let id = block.id.clone();
        day.block_tasks.push(block);

        assert!(day.toggle_block(&id).unwrap().completed);
        assert!(!day.toggle_block(&id).unwrap().completed);
        assert!(matches!(day.toggle_block("missing-id"), Err(Error::BlockNotFound(_))));
    }

    #[test]
    fn shared_prefix_is_rejected_but_exact_id_wins() {
        let mut day = DayRecord::default();
        for (id, name) in [("abcd1111", "first"), ("abcd1222", "second"), ("abcd", "short")] {
            let mut block = BlockTask::new(name, slot("13:00"), slot("14:00"), "#00AA00");
            block.id = id.to_string();
            day.block_tasks.push(block);
        }

        assert!(matches!(day.block("abcd1"), Err(Error::InvalidArgument(_))));
        assert!(matches!(day.remove_block("abcd1"), Err(Error::InvalidArgument(_))));
        assert_eq!(day.block_tasks.len(), 3);

        assert_eq!(day.block("abcd").unwrap().name, "short");
        assert_eq!(day.block("abcd11").unwrap().name, "first");
        assert_eq!(day.toggle_block("abcd12").unwrap().name, "second");
    }

    #[test]
    fn legacy_range_keys_must_span_one_slot() {
        let raw = serde_json::json!({
            "09:00-09:30": "kept",
            "23:30-00:00": "late",
            "10:00": {"text": "plain", "done": false, "type": "normal"},
            "11:00-garbage": "dropped",
            "12:00-13:00": "dropped",
            "12:30-13:00_completed": true,
            "14:00-15:00_completed": true
        });
        let raw: BTreeMap<String, Value> = serde_json::from_value(raw).unwrap();

        let tasks = fold_slot_map(raw);
        let kept: Vec<String> = tasks.keys().map(|s| s.to_string()).collect();
        assert_eq!(kept, vec!["09:00", "10:00", "12:30", "23:30"]);
        assert!(tasks[&slot("12:30")].done);
    }
}
