//! The fixed 30-minute grid.
//!
//! A day has 48 slots, `00:00` through `23:30`. A [`TimeSlot`] can only be
//! constructed on that grid, so nothing downstream has to re-check it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Number of slots in a day
pub const SLOTS_PER_DAY: u8 = 48;

/// Minutes covered by one slot
pub const SLOT_MINUTES: u32 = 30;

/// One 30-minute interval of a day, identified by its start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(u8);

impl TimeSlot {
    /// Build a slot from its position on the grid (0 = `00:00`, 47 = `23:30`).
    pub fn from_index(index: u8) -> Option<Self> {
        (index < SLOTS_PER_DAY).then_some(Self(index))
    }

    /// Parse an `HH:MM` label; minutes must be `00` or `30`.
    pub fn parse(label: &str) -> Result<Self> {
        let invalid = || Error::InvalidSlot(label.to_string());
        let (hour, minute) = label.trim().split_once(':').ok_or_else(invalid)?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 {
            return Err(invalid());
        }
        match minute {
            0 => Ok(Self(hour * 2)),
            30 => Ok(Self(hour * 2 + 1)),
            _ => Err(invalid()),
        }
    }

    /// All 48 slots in chronological order
    pub fn all() -> impl Iterator<Item = TimeSlot> {
        (0..SLOTS_PER_DAY).map(TimeSlot)
    }

    /// Walk the grid from `start` through `end`, both included.
    ///
    /// Yields nothing when `start > end`.
    pub fn range_inclusive(start: TimeSlot, end: TimeSlot) -> impl Iterator<Item = TimeSlot> {
        (start.0..=end.0).map(TimeSlot)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn hour(self) -> u8 {
        self.0 / 2
    }

    pub fn minute(self) -> u8 {
        (self.0 % 2) * 30
    }

    /// The following slot, or `None` after `23:30`
    pub fn next(self) -> Option<TimeSlot> {
        Self::from_index(self.0 + 1)
    }

    /// Label of the slot's end time; the last slot ends at `00:00`.
    pub fn end_label(self) -> String {
        match self.next() {
            Some(next) => next.to_string(),
            None => "00:00".to_string(),
        }
    }

    /// Key used by older per-user files: `"HH:MM-HH:MM"`.
    pub fn legacy_key(self) -> String {
        format!("{}-{}", self, self.end_label())
    }

    pub fn section(self) -> Section {
        Section::for_hour(self.hour())
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeSlot {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeSlot::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Part of the day used to group the day view
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Dawn,
    Morning,
    Afternoon,
    Night,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Dawn,
        Section::Morning,
        Section::Afternoon,
        Section::Night,
    ];

    pub fn for_hour(hour: u8) -> Section {
        match hour {
            6..=11 => Section::Morning,
            12..=17 => Section::Afternoon,
            18..=23 => Section::Night,
            _ => Section::Dawn,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Dawn => "Dawn (00:00-06:00)",
            Section::Morning => "Morning (06:00-12:00)",
            Section::Afternoon => "Afternoon (12:00-18:00)",
            Section::Night => "Night (18:00-24:00)",
        }
    }
}
