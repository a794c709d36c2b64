//! Free-slot generation.
//!
//! A day's study bounds minus its busy intervals, cut into whole 15-minute
//! slots. Slots start at the beginning of each free gap; whatever is left of
//! a gap after the last full slot is dropped.

use std::ops::Range;

use chrono::NaiveDate;

use super::interval::Interval;
use crate::domain::{StudySlot, StudyWindow, Term, slot_duration};

/// The study-window bounds of `day`.
pub fn day_bounds(day: NaiveDate, window: &StudyWindow) -> Interval {
    Interval::new(day.and_time(window.start), day.and_time(window.end))
}

/// Ordered free slots of `day` inside `bounds`.
///
/// `busy` must be merged (sorted and disjoint, see [`super::interval::merge`]).
/// Busy intervals reaching outside `bounds`, including across midnight, are
/// clipped to it.
pub fn free_slots(day: NaiveDate, bounds: Interval, busy: &[Interval]) -> Vec<StudySlot> {
    let mut slots = Vec::new();
    if bounds.is_empty() {
        return slots;
    }

    let first = busy.partition_point(|b| b.end <= bounds.start);
    let mut cursor = bounds.start;
    for b in busy[first..].iter().take_while(|b| b.start < bounds.end) {
        if b.start > cursor {
            push_gap(day, cursor, b.start, &mut slots);
        }
        cursor = cursor.max(b.end);
    }
    push_gap(day, cursor, bounds.end, &mut slots);

    slots
}

fn push_gap(day: NaiveDate, from: chrono::NaiveDateTime, to: chrono::NaiveDateTime, slots: &mut Vec<StudySlot>) {
    let step = slot_duration();
    let mut start = from;
    while start + step <= to {
        slots.push(StudySlot {
            day,
            start,
            end: start + step,
        });
        start += step;
    }
}

/// Every free slot of a term, with the day each belongs to.
///
/// Built with meetings as the only busy input. Both scheduling phases pick
/// from this one grid.
#[derive(Debug, Clone)]
pub struct SlotUniverse {
    slots: Vec<StudySlot>,
    slot_day: Vec<usize>,
    days: Vec<NaiveDate>,
    day_counts: Vec<usize>,
}

impl SlotUniverse {
    pub fn build(term: &Term, window: &StudyWindow, busy: &[Interval]) -> Self {
        let mut universe = Self {
            slots: Vec::new(),
            slot_day: Vec::new(),
            days: Vec::with_capacity(term.day_count()),
            day_counts: Vec::with_capacity(term.day_count()),
        };

        for (day_index, day) in term.days().enumerate() {
            let day_slots = free_slots(day, day_bounds(day, window), busy);
            universe.days.push(day);
            universe.day_counts.push(day_slots.len());
            universe.slot_day.extend(std::iter::repeat_n(day_index, day_slots.len()));
            universe.slots.extend(day_slots);
        }

        universe
    }

    pub fn slots(&self) -> &[StudySlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Index into [`Self::days`] of the day owning slot `slot_index`.
    pub fn day_of(&self, slot_index: usize) -> usize {
        self.slot_day[slot_index]
    }

    /// Free slot count of day `day_index`.
    pub fn day_capacity(&self, day_index: usize) -> usize {
        self.day_counts[day_index]
    }

    /// The largest free slot count of any single day.
    pub fn max_day_capacity(&self) -> usize {
        self.day_counts.iter().copied().max().unwrap_or(0)
    }

    /// Indices of the slots lying entirely inside `span`.
    pub fn within(&self, span: &Interval) -> Range<usize> {
        // Slots are equal-length and disjoint, so ends are sorted like starts.
        let lo = self.slots.partition_point(|s| s.start < span.start);
        let hi = self.slots.partition_point(|s| s.end <= span.end);
        lo..hi.max(lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, m, 0).unwrap()
    }

    fn iv(d: u32, s: (u32, u32), e: (u32, u32)) -> Interval {
        Interval::new(at(d, s.0, s.1), at(d, e.0, e.1))
    }

    fn window(start: &str, end: &str) -> StudyWindow {
        StudyWindow::parse(start, end).unwrap()
    }

    #[test]
    fn test_free_day_is_fully_sliced() {
        let slots = free_slots(day(2), iv(2, (8, 0), (9, 0)), &[]);
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![at(2, 8, 0), at(2, 8, 15), at(2, 8, 30), at(2, 8, 45)]);
        assert!(slots.iter().all(|s| s.day == day(2)));
    }

    #[test]
    fn test_busy_interval_splits_day() {
        let busy = vec![iv(2, (8, 30), (9, 0))];
        let slots = free_slots(day(2), iv(2, (8, 0), (10, 0)), &busy);
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(
            starts,
            vec![at(2, 8, 0), at(2, 8, 15), at(2, 9, 0), at(2, 9, 15), at(2, 9, 30), at(2, 9, 45)]
        );
    }

    #[test]
    fn test_short_gap_yields_nothing() {
        let busy = vec![iv(2, (8, 0), (8, 50)), iv(2, (9, 0), (10, 0))];
        let slots = free_slots(day(2), iv(2, (8, 0), (10, 0)), &busy);
        assert!(slots.is_empty());
    }

    #[test]
    fn test_gap_is_truncated_to_whole_units() {
        let busy = vec![iv(2, (8, 0), (8, 10))];
        let slots = free_slots(day(2), iv(2, (8, 0), (8, 45)), &busy);
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![at(2, 8, 10), at(2, 8, 25)]);
    }

    #[test]
    fn test_overnight_busy_is_clipped() {
        let busy = vec![Interval::new(at(2, 21, 0), at(3, 8, 30))];
        let today = free_slots(day(2), iv(2, (20, 0), (22, 0)), &busy);
        assert_eq!(today.len(), 4);
        assert_eq!(today.last().unwrap().end, at(2, 21, 0));

        let tomorrow = free_slots(day(3), iv(3, (8, 0), (9, 0)), &busy);
        let starts: Vec<_> = tomorrow.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![at(3, 8, 30), at(3, 8, 45)]);
    }

    #[test]
    fn test_busy_outside_bounds_is_ignored() {
        let busy = vec![iv(2, (6, 0), (7, 0)), iv(2, (23, 0), (23, 30))];
        let slots = free_slots(day(2), iv(2, (8, 0), (9, 0)), &busy);
        assert_eq!(slots.len(), 4);
    }

    #[test]
    fn test_fully_busy_day() {
        let busy = vec![iv(2, (7, 0), (23, 0))];
        assert!(free_slots(day(2), iv(2, (8, 0), (22, 0)), &busy).is_empty());
    }

    #[test]
    fn test_universe_tracks_days() {
        let term = Term::new("t", day(2), day(3));
        let busy = vec![iv(2, (8, 0), (8, 30))];
        let universe = SlotUniverse::build(&term, &window("08:00", "09:00"), &busy);

        assert_eq!(universe.len(), 6);
        assert_eq!(universe.days(), &[day(2), day(3)]);
        assert_eq!(universe.day_capacity(0), 2);
        assert_eq!(universe.day_capacity(1), 4);
        assert_eq!(universe.max_day_capacity(), 4);
        assert_eq!(universe.day_of(0), 0);
        assert_eq!(universe.day_of(2), 1);
    }

    #[test]
    fn test_universe_within() {
        let term = Term::new("t", day(2), day(3));
        let universe = SlotUniverse::build(&term, &window("08:00", "09:00"), &[]);

        assert_eq!(universe.within(&Interval::new(at(2, 8, 15), at(3, 8, 15))), 1..5);
        assert_eq!(universe.within(&Interval::new(at(2, 8, 10), at(2, 8, 40))), 1..2);
        assert!(universe.within(&Interval::new(at(2, 8, 5), at(2, 8, 10))).is_empty());
    }
}
