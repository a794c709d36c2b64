//! studyplan - study-session allocation for an academic term
//!
//! Given a term's courses, their class meetings and their graded assignments,
//! studyplan produces a conflict-free set of 15-minute study sessions inside a
//! daily study window, placing every assignment's work between its start and
//! due instants whenever that is possible at all.

pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod store;

pub use error::{PlannerError, Result};
