//! Caller-side orchestration of one scheduling run.
//!
//! Load the term through a `TermSource`, run the engine, then hand the result
//! to a `SessionSink` for the replace-all write. The `&mut` sink borrow is what
//! serializes runs against one store handle; processes sharing a database
//! file must serialize runs of the same term themselves.

use eyre::{Context, Result};
use log::info;
use serde::Serialize;

use crate::domain::StudyWindow;
use crate::engine::{Resolution, ScheduleOutcome, generate_study_sessions};
use crate::error::PlannerError;
use crate::store::{SessionSink, TermSource};

/// Summary of a planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    pub term_id: String,
    pub resolution: Resolution,
    pub fully_allocated: bool,
    pub session_count: usize,
    pub max_day_load: usize,
    /// Whether the sessions were written to the sink
    pub persisted: bool,
}

impl PlanReport {
    fn from_outcome(outcome: &ScheduleOutcome, persisted: bool) -> Self {
        Self {
            term_id: outcome.term_id.clone(),
            resolution: outcome.resolution.clone(),
            fully_allocated: outcome.fully_allocated,
            session_count: outcome.sessions.len(),
            max_day_load: outcome.max_day_load(),
            persisted,
        }
    }
}

/// Compute a term's sessions without persisting them.
pub fn preview_term<S: TermSource>(source: &S, term_id: &str, window: &StudyWindow) -> Result<ScheduleOutcome> {
    let data = source
        .load_term(term_id)
        .with_context(|| format!("Failed to load term {}", term_id))?
        .ok_or_else(|| PlannerError::TermNotFound(term_id.to_string()))?;

    let outcome = generate_study_sessions(&data, window)?;
    Ok(outcome)
}

/// Schedule a term and replace its persisted sessions with the result.
///
/// An infeasible run also replaces them: the term ends up with no sessions,
/// never with a stale or partial set.
pub fn plan_term<S>(store: &mut S, term_id: &str, window: &StudyWindow) -> Result<PlanReport>
where
    S: TermSource + SessionSink,
{
    let outcome = preview_term(&*store, term_id, window)?;
    let written = store
        .replace_sessions(term_id, &outcome.sessions)
        .with_context(|| format!("Failed to persist sessions for term {}", term_id))?;

    info!(
        "Planned term {}: {} ({} sessions written)",
        term_id,
        outcome.resolution.as_str(),
        written
    );
    Ok(PlanReport::from_outcome(&outcome, true))
}

/// Report for an outcome that was not persisted.
pub fn dry_run_report(outcome: &ScheduleOutcome) -> PlanReport {
    PlanReport::from_outcome(outcome, false)
}
