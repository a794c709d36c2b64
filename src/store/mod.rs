//! Storage layer for studyplan.
//!
//! Terms (with their courses, meetings and assignments) and generated study
//! sessions live in one SQLite database. The engine sees none of this: callers
//! go through `TermSource` to assemble a `TermData` and through `SessionSink`
//! to persist a run's output.
//!
//! # Example
//!
//! ```ignore
//! use studyplan::store::{SessionSink, TermSource, TermStore};
//! use std::path::Path;
//!
//! let mut store = TermStore::open_at(Path::new("/tmp/studyplan.db"))?;
//! store.import_term(&term_data)?;
//!
//! let data = store.load_term("fall-2024")?.expect("imported above");
//! store.replace_sessions("fall-2024", &sessions)?;
//! ```

mod term_store;
mod traits;

pub use term_store::TermStore;
pub use traits::{SessionSink, TermSource};
