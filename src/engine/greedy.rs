//! Phase 1: least-slack-first greedy allocation.
//!
//! # Algorithm
//!
//! 1. Slack of an assignment = universe slots inside its window - load.
//! 2. Process assignments by slack ascending, then due ascending.
//! 3. For each, take the universe slots inside its window that are still
//!    unused, order them by (minutes already placed on the slot's day, start)
//!    and take the first `load`.
//!
//! Candidates come from the same [`SlotUniverse`] the optimizer uses, so both
//! phases agree on which slots exist and a term has one feasibility answer.
//! Fast and usually sufficient, but not optimal: a failure here says nothing
//! about feasibility. The caller must discard a partial result.
//!
//! # Complexity
//! O(A log A + A * S log S) where A = assignments, S = slots per window.

use std::collections::HashMap;

use chrono::NaiveDate;
use log::debug;

use super::interval::Interval;
use super::materialize::Placement;
use super::slots::SlotUniverse;
use crate::domain::{Assignment, SLOT_MINUTES, StudyWindow, TermData};

/// Outcome of the greedy pass.
#[derive(Debug, Clone, Default)]
pub struct GreedyResult {
    pub placements: Vec<Placement>,
    /// Whether every assignment received its full load
    pub fully_allocated: bool,
}

/// Assignments with work to place, most constrained first.
pub fn slack_order<'a>(data: &'a TermData, universe: &SlotUniverse) -> Vec<(i64, &'a Assignment)> {
    let mut queue: Vec<(i64, &Assignment)> = data
        .assignments()
        .filter(|a| a.load > 0)
        .map(|a| {
            let free = universe.within(&Interval::new(a.start, a.due)).len() as i64;
            (free - a.load, a)
        })
        .collect();

    queue.sort_by(|(slack_a, a), (slack_b, b)| {
        slack_a
            .cmp(slack_b)
            .then(a.due.cmp(&b.due))
            .then_with(|| a.id.cmp(&b.id))
    });
    queue
}

/// Run the greedy pass. `meetings` must be merged.
pub fn schedule_greedy(data: &TermData, window: &StudyWindow, meetings: &[Interval]) -> GreedyResult {
    let universe = SlotUniverse::build(&data.term, window, meetings);
    let queue = slack_order(data, &universe);

    let mut used = vec![false; universe.len()];
    let mut daily_minutes: HashMap<NaiveDate, i64> = HashMap::new();
    let mut placements = Vec::new();

    for (slack, assignment) in queue {
        let span = Interval::new(assignment.start, assignment.due);

        let mut candidates: Vec<usize> = universe.within(&span).filter(|&i| !used[i]).collect();
        candidates.sort_by_key(|&i| {
            let slot = &universe.slots()[i];
            (daily_minutes.get(&slot.day).copied().unwrap_or(0), slot.start)
        });

        let wanted = usize::try_from(assignment.load).unwrap_or(usize::MAX);
        let taken = candidates.len().min(wanted);
        for i in candidates.into_iter().take(wanted) {
            let slot = universe.slots()[i];
            used[i] = true;
            *daily_minutes.entry(slot.day).or_insert(0) += SLOT_MINUTES;
            placements.push(Placement::new(assignment.id.clone(), slot));
        }

        if taken < wanted {
            debug!(
                "Greedy pass placed {}/{} units for assignment {} (slack {}), giving up",
                taken, wanted, assignment.id, slack
            );
            return GreedyResult {
                placements,
                fully_allocated: false,
            };
        }
    }

    debug!("Greedy pass placed {} sessions", placements.len());
    GreedyResult {
        placements,
        fully_allocated: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CourseData, Term};
    use crate::engine::interval::merge;
    use chrono::NaiveDateTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, m, 0).unwrap()
    }

    fn hour_window() -> StudyWindow {
        StudyWindow::parse("08:00", "09:00").unwrap()
    }

    fn meetings_of(data: &TermData) -> Vec<Interval> {
        merge(data.meetings().map(Interval::from))
    }

    fn universe_of(data: &TermData) -> SlotUniverse {
        SlotUniverse::build(&data.term, &hour_window(), &meetings_of(data))
    }

    #[test]
    fn test_slack_order_least_slack_first() {
        let data = TermData::new(Term::new("t", day(2), day(3))).with_course(
            CourseData::new("c")
                .with_assignment(Assignment::new("wide", 2, at(2, 8, 0), at(3, 9, 0)))
                .with_assignment(Assignment::new("narrow", 3, at(2, 8, 0), at(2, 9, 0))),
        );
        let order = slack_order(&data, &universe_of(&data));
        let ids: Vec<_> = order.iter().map(|(_, a)| a.id.as_str()).collect();
        assert_eq!(ids, vec!["narrow", "wide"]);
        assert_eq!(order[0].0, 1);
        assert_eq!(order[1].0, 6);
    }

    #[test]
    fn test_slack_ties_broken_by_due() {
        let data = TermData::new(Term::new("t", day(2), day(3))).with_course(
            CourseData::new("c")
                .with_assignment(Assignment::new("late", 1, at(2, 8, 0), at(3, 9, 0)))
                .with_assignment(Assignment::new("early", 5, at(2, 8, 0), at(3, 8, 30)))
                .with_assignment(Assignment::new("skip", 0, at(2, 8, 0), at(3, 9, 0))),
        );
        // late: 8 free - 1 = 7; early: 6 free - 5 = 1
        let order = slack_order(&data, &universe_of(&data));
        let ids: Vec<_> = order.iter().map(|(_, a)| a.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);

        let tied = TermData::new(Term::new("t", day(2), day(3))).with_course(
            CourseData::new("c")
                .with_assignment(Assignment::new("b", 7, at(2, 8, 0), at(3, 9, 0)))
                .with_assignment(Assignment::new("a", 5, at(2, 8, 0), at(3, 8, 30))),
        );
        // both slack 1; "a" is due first
        let order = slack_order(&tied, &universe_of(&tied));
        let ids: Vec<_> = order.iter().map(|(_, a)| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_greedy_places_full_load() {
        let data = TermData::new(Term::new("t", day(2), day(4))).with_course(
            CourseData::new("c").with_assignment(Assignment::new("hw", 4, at(2, 8, 0), at(4, 22, 0))),
        );
        let result = schedule_greedy(&data, &StudyWindow::default(), &[]);
        assert!(result.fully_allocated);
        assert_eq!(result.placements.len(), 4);
        let starts: Vec<_> = result.placements.iter().map(|p| p.slot.start).collect();
        assert_eq!(starts, vec![at(2, 8, 0), at(2, 8, 15), at(2, 8, 30), at(2, 8, 45)]);
    }

    #[test]
    fn test_greedy_prefers_lighter_day() {
        let data = TermData::new(Term::new("t", day(2), day(3))).with_course(
            CourseData::new("c")
                .with_assignment(Assignment::new("first", 3, at(2, 8, 0), at(2, 9, 0)))
                .with_assignment(Assignment::new("second", 2, at(2, 8, 0), at(3, 9, 0))),
        );
        let result = schedule_greedy(&data, &hour_window(), &[]);
        assert!(result.fully_allocated);

        let second: Vec<_> = result
            .placements
            .iter()
            .filter(|p| p.assignment_id == "second")
            .map(|p| p.slot.day)
            .collect();
        assert_eq!(second, vec![day(3), day(3)]);
    }

    #[test]
    fn test_greedy_avoids_meetings_and_itself() {
        let data = TermData::new(Term::new("t", day(2), day(2))).with_course(
            CourseData::new("c")
                .with_meeting(at(2, 8, 15), at(2, 8, 45))
                .with_assignment(Assignment::new("a", 1, at(2, 8, 0), at(2, 9, 0)))
                .with_assignment(Assignment::new("b", 1, at(2, 8, 0), at(2, 9, 0))),
        );
        let meetings = meetings_of(&data);
        let result = schedule_greedy(&data, &hour_window(), &meetings);
        assert!(result.fully_allocated);

        let mut starts: Vec<_> = result.placements.iter().map(|p| p.slot.start).collect();
        starts.sort();
        assert_eq!(starts, vec![at(2, 8, 0), at(2, 8, 45)]);
    }

    #[test]
    fn test_greedy_reports_shortfall() {
        let data = TermData::new(Term::new("t", day(2), day(2))).with_course(
            CourseData::new("c").with_assignment(Assignment::new("big", 5, at(2, 8, 0), at(2, 9, 0))),
        );
        let result = schedule_greedy(&data, &hour_window(), &[]);
        assert!(!result.fully_allocated);
        assert_eq!(result.placements.len(), 4);
    }

    #[test]
    fn test_greedy_uses_the_shared_slot_grid() {
        // Window opens at 08:10, between grid slots
        let data = TermData::new(Term::new("t", day(2), day(2))).with_course(
            CourseData::new("c").with_assignment(Assignment::new("a", 2, at(2, 8, 10), at(2, 8, 55))),
        );
        let result = schedule_greedy(&data, &hour_window(), &[]);
        assert!(result.fully_allocated);
        let starts: Vec<_> = result.placements.iter().map(|p| p.slot.start).collect();
        assert_eq!(starts, vec![at(2, 8, 15), at(2, 8, 30)]);

        let order = slack_order(&data, &universe_of(&data));
        assert_eq!(order[0].0, 0);
    }

    #[test]
    fn test_greedy_short_of_grid_slots_fails() {
        // Only 08:15 and 08:30 fit inside [08:10, 08:55)
        let data = TermData::new(Term::new("t", day(2), day(2))).with_course(
            CourseData::new("c").with_assignment(Assignment::new("a", 3, at(2, 8, 10), at(2, 8, 55))),
        );
        let result = schedule_greedy(&data, &hour_window(), &[]);
        assert!(!result.fully_allocated);
        assert_eq!(result.placements.len(), 2);
    }
}
