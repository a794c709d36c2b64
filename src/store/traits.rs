//! Collaborator seams around the engine.
//!
//! The engine never touches storage. Callers load a `TermData` through a
//! `TermSource` before a run and hand the result to a `SessionSink` after it.

use eyre::Result;

use crate::domain::{StudySession, TermData};

/// Loads a term with its courses, meetings and assignments, eagerly.
pub trait TermSource {
    fn load_term(&self, term_id: &str) -> Result<Option<TermData>>;
}

/// Persists a term's study sessions.
pub trait SessionSink {
    /// Delete every session of `term_id` and insert `sessions`, as one unit.
    ///
    /// Returns the number of sessions written.
    fn replace_sessions(&mut self, term_id: &str, sessions: &[StudySession]) -> Result<usize>;
}
