//! Study-session allocation engine.
//!
//! This module provides:
//! - **Interval utilities**: merging busy time ranges
//! - **Free-slot generation**: a day's study window minus busy time, in 15-minute units
//! - **Greedy scheduler (Phase 1)**: least-slack-first, lightest-day-first fast path
//! - **Optimizer (Phase 2)**: max-flow + binary search on the per-day cap,
//!   run only when Phase 1 cannot place every unit
//! - **Materializer**: chosen slots to `StudySession` records
//!
//! # Flow
//!
//! 1. Validate the term data
//! 2. Merge all meetings into one busy set
//! 3. Phase 1; if every assignment is fully placed, done
//! 4. Otherwise drop Phase 1's output and let Phase 2 decide from scratch
//!
//! The engine is synchronous, holds no state between runs and does no I/O.
//! Runs for different terms may execute in parallel; persisting two runs of
//! the same term concurrently must be serialized by the caller.

pub mod flow;
pub mod greedy;
pub mod interval;
pub mod materialize;
pub mod optimizer;
pub mod slots;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::{StudySession, StudyWindow, TermData};
use crate::error::Result;

pub use greedy::{GreedyResult, schedule_greedy};
pub use interval::{Interval, merge};
pub use materialize::{Placement, materialize};
pub use optimizer::{Allocation, Infeasibility, optimize};
pub use slots::{SlotUniverse, day_bounds, free_slots};

/// How a run reached its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// No assignment carries any load
    NothingToSchedule,
    /// The greedy pass placed everything
    Greedy,
    /// The optimizer placed everything with the busiest day at `max_day_load`
    Optimized { max_day_load: usize },
    /// No conflict-free full allocation exists
    Infeasible { reason: Infeasibility },
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NothingToSchedule => "nothing_to_schedule",
            Self::Greedy => "greedy",
            Self::Optimized { .. } => "optimized",
            Self::Infeasible { .. } => "infeasible",
        }
    }
}

/// Full replacement session set for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub term_id: String,
    pub sessions: Vec<StudySession>,
    /// False only when the optimizer proved the workload cannot fit
    pub fully_allocated: bool,
    pub resolution: Resolution,
}

impl ScheduleOutcome {
    fn empty(term_id: &str, fully_allocated: bool, resolution: Resolution) -> Self {
        Self {
            term_id: term_id.to_string(),
            sessions: Vec::new(),
            fully_allocated,
            resolution,
        }
    }

    /// Session count per calendar day, in date order.
    pub fn daily_load(&self) -> BTreeMap<NaiveDate, usize> {
        let mut load = BTreeMap::new();
        for session in &self.sessions {
            *load.entry(session.day()).or_insert(0) += 1;
        }
        load
    }

    /// Session count of the busiest day.
    pub fn max_day_load(&self) -> usize {
        self.daily_load().values().copied().max().unwrap_or(0)
    }

    /// Number of sessions attributed to `assignment_id`.
    pub fn sessions_for(&self, assignment_id: &str) -> usize {
        self.sessions.iter().filter(|s| s.assignment_id == assignment_id).count()
    }
}

/// Allocate study sessions for one term.
///
/// Invalid input (negative load, inverted windows, inverted term or study
/// window) is an error. An impossible workload is not: it comes back with
/// `fully_allocated = false`, no sessions and a `Resolution::Infeasible`.
pub fn generate_study_sessions(data: &TermData, window: &StudyWindow) -> Result<ScheduleOutcome> {
    data.validate()?;
    window.validate()?;

    let term_id = data.term.id.as_str();
    let meetings = merge(data.meetings().map(Interval::from));

    if data.assignments().all(|a| a.load == 0) {
        info!("Term {}: nothing to schedule", term_id);
        return Ok(ScheduleOutcome::empty(term_id, true, Resolution::NothingToSchedule));
    }

    let greedy = schedule_greedy(data, window, &meetings);
    if greedy.fully_allocated {
        let sessions = materialize(term_id, greedy.placements);
        info!("Term {}: greedy pass placed {} sessions", term_id, sessions.len());
        return Ok(ScheduleOutcome {
            term_id: term_id.to_string(),
            sessions,
            fully_allocated: true,
            resolution: Resolution::Greedy,
        });
    }

    info!(
        "Term {}: greedy pass fell short after {} sessions, running optimizer",
        term_id,
        greedy.placements.len()
    );

    match optimize(data, window, &meetings) {
        Allocation::Feasible {
            placements,
            max_day_load,
        } => {
            let sessions = materialize(term_id, placements);
            info!(
                "Term {}: optimizer placed {} sessions, busiest day {}",
                term_id,
                sessions.len(),
                max_day_load
            );
            Ok(ScheduleOutcome {
                term_id: term_id.to_string(),
                sessions,
                fully_allocated: true,
                resolution: Resolution::Optimized { max_day_load },
            })
        }
        Allocation::Infeasible(reason) => {
            warn!("Term {}: infeasible: {}", term_id, reason);
            Ok(ScheduleOutcome::empty(term_id, false, Resolution::Infeasible { reason }))
        }
    }
}
