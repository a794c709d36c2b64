//! Daily study window.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Clock-time range of each day that is eligible for study, `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudyWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for StudyWindow {
    /// 08:00 to 22:00.
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
        }
    }
}

impl StudyWindow {
    /// Build a window, rejecting one that does not end after it starts.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if end <= start {
            return Err(PlannerError::InvalidStudyWindow(format!(
                "window end {} must be after start {}",
                end.format("%H:%M"),
                start.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse `HH:MM` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse = |s: &str| {
            NaiveTime::parse_from_str(s.trim(), "%H:%M")
                .map_err(|e| PlannerError::InvalidStudyWindow(format!("'{}': {}", s, e)))
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub fn validate(&self) -> Result<()> {
        Self::new(self.start, self.end).map(|_| ())
    }
}
