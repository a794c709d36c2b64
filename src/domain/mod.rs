//! Domain types for studyplan
//!
//! This module contains the data handed into and out of the engine:
//! - TermData: a term with its courses, meetings and assignments
//! - StudyWindow: the daily clock range eligible for study
//! - StudySlot / StudySession: candidate and allocated 15-minute units

pub mod session;
pub mod term;
pub mod window;

pub use session::{SLOT_MINUTES, StudySession, StudySlot, slot_duration};
pub use term::{Assignment, CourseData, Meeting, Term, TermData};
pub use window::StudyWindow;
