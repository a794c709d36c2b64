//! Busy-interval utilities shared by both scheduling phases.
//!
//! Intervals are half-open `[start, end)`. `merge` collapses an arbitrary
//! collection into a sorted, disjoint set, which is the form `free_slots`
//! expects its busy input in.

use chrono::NaiveDateTime;

use crate::domain::Meeting;

/// A time interval [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl From<&Meeting> for Interval {
    fn from(meeting: &Meeting) -> Self {
        Self::new(meeting.start, meeting.end)
    }
}

/// Sort by start and union overlapping or adjacent intervals.
///
/// Empty intervals are dropped. The result is sorted and pairwise disjoint
/// with a gap between every two neighbours.
pub fn merge(intervals: impl IntoIterator<Item = Interval>) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.into_iter().filter(|i| !i.is_empty()).collect();
    sorted.sort();

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for next in sorted {
        match merged.last_mut() {
            Some(last) if next.start <= last.end => last.end = last.end.max(next.end),
            _ => merged.push(next),
        }
    }
    merged
}
