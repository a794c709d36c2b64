//! Study slot and session types.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Length of one study unit in minutes.
pub const SLOT_MINUTES: i64 = 15;

/// Length of one study unit.
pub fn slot_duration() -> Duration {
    Duration::minutes(SLOT_MINUTES)
}

/// A candidate (or chosen) 15-minute interval on a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StudySlot {
    pub day: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl StudySlot {
    /// Slot beginning at `start`, lasting one unit.
    pub fn at(start: NaiveDateTime) -> Self {
        Self {
            day: start.date(),
            start,
            end: start + slot_duration(),
        }
    }
}

/// One allocated study slot, attributed to the assignment it serves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudySession {
    pub term_id: String,
    pub assignment_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl StudySession {
    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && start < self.end
    }
}
