//! Turns chosen slots into study-session records.

use crate::domain::{StudySession, StudySlot};

/// A slot chosen for an assignment by one of the scheduling phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub assignment_id: String,
    pub slot: StudySlot,
}

impl Placement {
    pub fn new(assignment_id: impl Into<String>, slot: StudySlot) -> Self {
        Self {
            assignment_id: assignment_id.into(),
            slot,
        }
    }
}

/// One session per placement, ordered by start time.
pub fn materialize(term_id: &str, placements: Vec<Placement>) -> Vec<StudySession> {
    let mut sessions: Vec<StudySession> = placements
        .into_iter()
        .map(|p| StudySession {
            term_id: term_id.to_string(),
            assignment_id: p.assignment_id,
            start: p.slot.start,
            end: p.slot.end,
        })
        .collect();
    sessions.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.assignment_id.cmp(&b.assignment_id)));
    sessions
}
