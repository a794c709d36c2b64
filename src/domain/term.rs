//! Term input types.
//!
//! `TermData` is the read-only view of one term that the caller assembles
//! before a scheduling run: the term's date range plus, per course, its class
//! meetings and graded assignments. Nothing in here is mutated by the engine.
//!
//! All instants are wall-clock `NaiveDateTime` values in the term's timezone.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// An academic term. `start_date` and `end_date` are both inclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Term {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// IANA zone name the wall-clock instants are expressed in
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Term {
    pub fn new(id: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            start_date,
            end_date,
            timezone: default_timezone(),
        }
    }

    /// Every calendar day of the term, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date.iter_days().take_while(move |day| *day <= self.end_date)
    }

    /// Number of calendar days in the term.
    pub fn day_count(&self) -> usize {
        ((self.end_date - self.start_date).num_days() + 1).max(0) as usize
    }
}

/// A class meeting: time during which the student cannot study.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meeting {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Meeting {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }
}

/// A graded assignment needing `load` 15-minute units of work in `[start, due)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub load: i64,
    pub start: NaiveDateTime,
    pub due: NaiveDateTime,
}

impl Assignment {
    pub fn new(id: impl Into<String>, load: i64, start: NaiveDateTime, due: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            load,
            start,
            due,
        }
    }

    /// Set a human-readable title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// A course with its meetings and assignments, eagerly loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseData {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl CourseData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_meeting(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.meetings.push(Meeting::new(start, end));
        self
    }

    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }
}

/// Everything one scheduling run needs for a term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermData {
    pub term: Term,
    #[serde(default)]
    pub courses: Vec<CourseData>,
}

impl TermData {
    pub fn new(term: Term) -> Self {
        Self {
            term,
            courses: Vec::new(),
        }
    }

    pub fn with_course(mut self, course: CourseData) -> Self {
        self.courses.push(course);
        self
    }

    pub fn meetings(&self) -> impl Iterator<Item = &Meeting> {
        self.courses.iter().flat_map(|c| c.meetings.iter())
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.courses.iter().flat_map(|c| c.assignments.iter())
    }

    /// Reject input the engine cannot schedule against.
    ///
    /// Nothing is clamped: a negative load, an assignment due at or before its
    /// start, a meeting that ends before it begins, or a term ending before it
    /// starts is an error for the caller to surface. Assignment ids must be
    /// unique across the term since sessions are attributed by id alone.
    pub fn validate(&self) -> Result<()> {
        if self.term.end_date < self.term.start_date {
            return Err(PlannerError::InvalidTerm(format!(
                "term {} ends ({}) before it starts ({})",
                self.term.id, self.term.end_date, self.term.start_date
            )));
        }

        let mut seen = HashSet::new();
        for course in &self.courses {
            if course.meetings.iter().any(|m| m.end <= m.start) {
                return Err(PlannerError::InvalidMeeting {
                    course: course.id.clone(),
                });
            }

            for assignment in &course.assignments {
                if assignment.load < 0 {
                    return Err(PlannerError::InvalidLoad {
                        assignment: assignment.id.clone(),
                        load: assignment.load,
                    });
                }
                if assignment.due <= assignment.start {
                    return Err(PlannerError::InvalidWindow {
                        assignment: assignment.id.clone(),
                    });
                }
                if !seen.insert(assignment.id.as_str()) {
                    return Err(PlannerError::DuplicateAssignment {
                        term: self.term.id.clone(),
                        assignment: assignment.id.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, m, 0).unwrap()
    }

    fn sample() -> TermData {
        TermData::new(Term::new("fall", date(2), date(6))).with_course(
            CourseData::new("cs101")
                .with_meeting(at(2, 9, 0), at(2, 10, 30))
                .with_assignment(Assignment::new("hw1", 4, at(2, 8, 0), at(4, 22, 0))),
        )
    }

    #[test]
    fn test_term_days_inclusive() {
        let term = Term::new("t", date(2), date(4));
        let days: Vec<_> = term.days().collect();
        assert_eq!(days, vec![date(2), date(3), date(4)]);
        assert_eq!(term.day_count(), 3);
    }

    #[test]
    fn test_single_day_term() {
        let term = Term::new("t", date(2), date(2));
        assert_eq!(term.days().count(), 1);
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_load() {
        let mut data = sample();
        data.courses[0].assignments[0].load = -1;
        let err = data.validate().unwrap_err();
        assert!(matches!(err, PlannerError::InvalidLoad { load: -1, .. }));
    }

    #[test]
    fn test_validate_rejects_due_before_start() {
        let mut data = sample();
        data.courses[0].assignments[0].due = at(2, 8, 0);
        let err = data.validate().unwrap_err();
        assert!(matches!(err, PlannerError::InvalidWindow { .. }));
    }

    #[test]
    fn test_validate_rejects_inverted_meeting() {
        let data = TermData::new(Term::new("t", date(2), date(3)))
            .with_course(CourseData::new("c").with_meeting(at(2, 11, 0), at(2, 10, 0)));
        let err = data.validate().unwrap_err();
        assert!(matches!(err, PlannerError::InvalidMeeting { .. }));
    }

    #[test]
    fn test_validate_rejects_inverted_term() {
        let data = TermData::new(Term::new("t", date(5), date(3)));
        assert!(matches!(data.validate(), Err(PlannerError::InvalidTerm(_))));
    }

    #[test]
    fn test_validate_rejects_assignment_id_reused_across_courses() {
        let data = sample().with_course(
            CourseData::new("math201").with_assignment(Assignment::new("hw1", 3, at(3, 8, 0), at(5, 22, 0))),
        );
        let err = data.validate().unwrap_err();
        assert!(matches!(
            err,
            PlannerError::DuplicateAssignment { ref term, ref assignment } if term == "fall" && assignment == "hw1"
        ));
    }

    #[test]
    fn test_zero_load_is_valid() {
        let mut data = sample();
        data.courses[0].assignments[0].load = 0;
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = r#"
term:
  id: fall
  start_date: 2024-09-02
  end_date: 2024-09-06
courses:
  - id: cs101
    meetings:
      - start: 2024-09-02T09:00:00
        end: 2024-09-02T10:30:00
    assignments:
      - id: hw1
        load: 4
        start: 2024-09-02T08:00:00
        due: 2024-09-04T22:00:00
"#;
        let data: TermData = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(data, sample());
        assert_eq!(data.term.timezone, "UTC");
    }
}
