//! Block tasks: expansion of a named activity over a run of slots.

use crate::config::BlocksConfig;
use crate::day::{BlockTask, DayRecord, SlotEntry, SlotKind};
use crate::error::{Error, Result};
use crate::slot::TimeSlot;

/// Request to create a block task
#[derive(Debug, Clone)]
pub struct BlockRequest {
    pub name: String,
    pub start: TimeSlot,
    pub end: TimeSlot,
    pub color: Option<String>,
}

/// Markers written into the interior and final slot of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMarkers {
    pub middle: String,
    pub end: String,
}

impl From<&BlocksConfig> for BlockMarkers {
    fn from(config: &BlocksConfig) -> Self {
        Self {
            middle: config.middle_marker.clone(),
            end: config.end_marker.clone(),
        }
    }
}

/// Check name and range; nothing is touched on failure.
pub fn validate(name: &str, start: TimeSlot, end: TimeSlot) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidBlock("name cannot be empty".to_string()));
    }
    if start >= end {
        return Err(Error::InvalidBlock(format!(
            "start {start} must be earlier than end {end}"
        )));
    }
    Ok(())
}

/// Accept `#RRGGBB` (case-insensitive hex digits).
pub fn validate_color(color: &str) -> Result<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|ch| ch.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidBlock(format!(
            "color '{color}' must be a #RRGGBB hex value"
        )))
    }
}

/// Expand `label` over `start..=end`, overwriting every covered slot.
///
/// Returns the slots written, in order.
pub fn expand(
    day: &mut DayRecord,
    label: &str,
    start: TimeSlot,
    end: TimeSlot,
    markers: &BlockMarkers,
) -> Result<Vec<TimeSlot>> {
    validate(label, start, end)?;

    let slots: Vec<TimeSlot> = TimeSlot::range_inclusive(start, end).collect();
    let last = slots.len() - 1;
    for (i, slot) in slots.iter().enumerate() {
        let entry = if i == 0 {
            SlotEntry::new(label.trim(), SlotKind::BlockStart)
        } else if i == last {
            SlotEntry::new(markers.end.clone(), SlotKind::BlockEnd)
        } else {
            SlotEntry::new(markers.middle.clone(), SlotKind::BlockMiddle)
        };
        day.tasks.insert(*slot, entry);
    }

    Ok(slots)
}

/// Slots still owned by `block`: its range, cut short at another block's start.
fn owned_slots(day: &DayRecord, block: &BlockTask) -> Vec<TimeSlot> {
    let mut owned = Vec::new();
    for slot in block.slots() {
        match day.tasks.get(&slot) {
            Some(entry) if entry.kind == SlotKind::BlockStart && slot != block.start => break,
            Some(entry) if entry.kind.is_block() => owned.push(slot),
            _ => {}
        }
    }
    owned
}

/// Set `done` on the block's slots that still carry block markers.
pub fn mark_slots(day: &mut DayRecord, block: &BlockTask, done: bool) {
    for slot in owned_slots(day, block) {
        if let Some(entry) = day.tasks.get_mut(&slot) {
            entry.done = done;
        }
    }
}

/// Remove the block's slots that still carry block markers; returns how many.
pub fn clear_slots(day: &mut DayRecord, block: &BlockTask) -> usize {
    let owned = owned_slots(day, block);
    for slot in &owned {
        day.tasks.remove(slot);
    }
    owned.len()
}

/// Drop blocks whose range intersects `start..=end` and return them.
///
/// Their leftover slots outside the range keep text and completion but lose
/// block markers, so no run points back at a block that no longer exists.
pub fn displace_overlapping(
    day: &mut DayRecord,
    start: TimeSlot,
    end: TimeSlot,
) -> Vec<BlockTask> {
    let (displaced, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut day.block_tasks)
        .into_iter()
        .partition(|b| b.start <= end && start <= b.end);
    day.block_tasks = kept;

    for block in &displaced {
        for slot in block.slots() {
            if slot >= start && slot <= end {
                continue;
            }
            if let Some(entry) = day.tasks.get_mut(&slot) {
                if entry.kind.is_block() {
                    entry.kind = SlotKind::Normal;
                }
            }
        }
    }
    displaced
}

/// Rebuild block tasks from contiguous `block_start .. block_end` runs.
///
/// Used where only slots are persisted. The start label doubles as the id; a
/// run is completed when every slot in it is done.
pub fn block_runs(day: &DayRecord, color: &str) -> Vec<BlockTask> {
    let mut blocks = Vec::new();
    let mut open: Option<(TimeSlot, String, bool)> = None;
    let mut previous: Option<TimeSlot> = None;

    for (slot, entry) in &day.tasks {
        let contiguous = previous.and_then(|p| p.next()) == Some(*slot);
        if !contiguous {
            open = None;
        }

        match entry.kind {
            SlotKind::BlockStart => open = Some((*slot, entry.text.clone(), entry.done)),
            SlotKind::BlockMiddle => {
                if let Some((_, _, all_done)) = open.as_mut() {
                    *all_done &= entry.done;
                }
            }
            SlotKind::BlockEnd => {
                if let Some((start, name, all_done)) = open.take() {
                    blocks.push(BlockTask {
                        id: start.to_string(),
                        name,
                        start,
                        end: *slot,
                        color: color.to_string(),
                        completed: all_done && entry.done,
                    });
                }
            }
            SlotKind::Normal => open = None,
        }

        previous = Some(*slot);
    }

    blocks
}
