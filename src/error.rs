//! Error types for studyplan
//!
//! Centralized error handling using thiserror. Infeasible workloads are not
//! errors; they come back as `Resolution::Infeasible` on the schedule outcome.

use thiserror::Error;

/// All error types that can occur while planning a term
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Term id could not be resolved by the store
    #[error("Term not found: {0}")]
    TermNotFound(String),

    /// Term date range is malformed
    #[error("Invalid term: {0}")]
    InvalidTerm(String),

    /// Daily study window is malformed
    #[error("Invalid study window: {0}")]
    InvalidStudyWindow(String),

    /// Assignment load is negative
    #[error("Invalid load {load} for assignment {assignment}")]
    InvalidLoad { assignment: String, load: i64 },

    /// Assignment due instant is not after its start
    #[error("Invalid window for assignment {assignment}: due must be after start")]
    InvalidWindow { assignment: String },

    /// Two assignments of one term share an id
    #[error("Duplicate assignment id {assignment} in term {term}")]
    DuplicateAssignment { term: String, assignment: String },

    /// Meeting end is not after its start
    #[error("Invalid meeting in course {course}: end must be after start")]
    InvalidMeeting { course: String },

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for studyplan operations
pub type Result<T> = std::result::Result<T, PlannerError>;
