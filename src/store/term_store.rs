//! SQLite-backed store for terms and their study sessions.
//!
//! One database file holds every imported term. Importing a term replaces its
//! courses, meetings and assignments; scheduling a term replaces its sessions.
//! Both replacements run inside a single transaction so readers never see a
//! half-written term.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Transaction, params};

use super::traits::{SessionSink, TermSource};
use crate::domain::{Assignment, CourseData, Meeting, StudySession, Term, TermData};
use crate::error::PlannerError;

/// TermStore manages term input data and generated sessions in SQLite.
pub struct TermStore {
    db: Connection,
}

impl std::fmt::Debug for TermStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermStore").finish_non_exhaustive()
    }
}

impl TermStore {
    /// Open or create a store at the given database path.
    pub fn open_at(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory: {}", parent.display()))?;
        }

        let db = Connection::open(db_path)
            .with_context(|| format!("Failed to open SQLite database: {}", db_path.display()))?;
        Self::init_schema(&db)?;

        Ok(Self { db })
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init_schema(&db)?;
        Ok(Self { db })
    }

    /// Initialize the SQLite schema.
    fn init_schema(db: &Connection) -> Result<()> {
        db.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS terms (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                timezone TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS courses (
                term_id TEXT NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
                id TEXT NOT NULL,
                name TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (term_id, id)
            );

            CREATE TABLE IF NOT EXISTS meetings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                term_id TEXT NOT NULL,
                course_id TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL,
                FOREIGN KEY (term_id, course_id) REFERENCES courses(term_id, id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS assignments (
                term_id TEXT NOT NULL,
                course_id TEXT NOT NULL,
                id TEXT NOT NULL,
                title TEXT NOT NULL,
                load_units INTEGER NOT NULL,
                start_at TEXT NOT NULL,
                due_at TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (term_id, course_id, id),
                FOREIGN KEY (term_id, course_id) REFERENCES courses(term_id, id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS study_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                term_id TEXT NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
                assignment_id TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_meetings_course ON meetings(term_id, course_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_term ON study_sessions(term_id, start_at);
            "#,
        )
        .context("Failed to initialize database schema")?;

        Ok(())
    }

    /// Insert or fully replace a term and everything it owns.
    ///
    /// Sessions already generated for the term are left alone until the next
    /// scheduling run replaces them.
    pub fn import_term(&mut self, data: &TermData) -> Result<()> {
        let tx = self.db.transaction()?;
        let term = &data.term;

        tx.execute("DELETE FROM courses WHERE term_id = ?1", [&term.id])?;
        tx.execute(
            r#"
            INSERT INTO terms (id, name, start_date, end_date, timezone)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                timezone = excluded.timezone
            "#,
            params![term.id, term.name, term.start_date, term.end_date, term.timezone],
        )?;

        for (position, course) in data.courses.iter().enumerate() {
            Self::insert_course(&tx, &term.id, position, course)?;
        }

        tx.commit().context("Failed to commit term import")?;
        log::info!("Imported term {} with {} courses", term.id, data.courses.len());
        Ok(())
    }

    fn insert_course(tx: &Transaction<'_>, term_id: &str, position: usize, course: &CourseData) -> Result<()> {
        tx.execute(
            "INSERT INTO courses (term_id, id, name, position) VALUES (?1, ?2, ?3, ?4)",
            params![term_id, course.id, course.name, position as i64],
        )
        .with_context(|| format!("Failed to insert course {}", course.id))?;

        for meeting in &course.meetings {
            tx.execute(
                "INSERT INTO meetings (term_id, course_id, start_at, end_at) VALUES (?1, ?2, ?3, ?4)",
                params![term_id, course.id, meeting.start, meeting.end],
            )?;
        }

        for (position, assignment) in course.assignments.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO assignments
                (term_id, course_id, id, title, load_units, start_at, due_at, position)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    term_id,
                    course.id,
                    assignment.id,
                    assignment.title,
                    assignment.load,
                    assignment.start,
                    assignment.due,
                    position as i64,
                ],
            )
            .with_context(|| format!("Failed to insert assignment {}", assignment.id))?;
        }

        Ok(())
    }

    /// Get a term record by ID.
    pub fn get_term(&self, term_id: &str) -> Result<Option<Term>> {
        self.db
            .query_row(
                "SELECT id, name, start_date, end_date, timezone FROM terms WHERE id = ?1",
                [term_id],
                |row| {
                    Ok(Term {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        start_date: row.get::<_, NaiveDate>(2)?,
                        end_date: row.get::<_, NaiveDate>(3)?,
                        timezone: row.get(4)?,
                    })
                },
            )
            .optional()
            .context("Failed to query term")
    }

    /// List all imported terms, ordered by start date.
    pub fn list_terms(&self) -> Result<Vec<Term>> {
        let mut stmt = self
            .db
            .prepare("SELECT id, name, start_date, end_date, timezone FROM terms ORDER BY start_date, id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Term {
                id: row.get(0)?,
                name: row.get(1)?,
                start_date: row.get(2)?,
                end_date: row.get(3)?,
                timezone: row.get(4)?,
            })
        })?;

        let mut terms = Vec::new();
        for row in rows {
            terms.push(row?);
        }
        Ok(terms)
    }

    fn load_courses(&self, term_id: &str) -> Result<Vec<CourseData>> {
        let mut stmt = self
            .db
            .prepare("SELECT id, name FROM courses WHERE term_id = ?1 ORDER BY position")?;
        let rows = stmt.query_map([term_id], |row| Ok(CourseData::new(row.get::<_, String>(0)?).named(row.get::<_, String>(1)?)))?;

        let mut courses = Vec::new();
        for row in rows {
            let mut course = row?;
            course.meetings = self.load_meetings(term_id, &course.id)?;
            course.assignments = self.load_assignments(term_id, &course.id)?;
            courses.push(course);
        }
        Ok(courses)
    }

    fn load_meetings(&self, term_id: &str, course_id: &str) -> Result<Vec<Meeting>> {
        let mut stmt = self.db.prepare(
            "SELECT start_at, end_at FROM meetings WHERE term_id = ?1 AND course_id = ?2 ORDER BY start_at, id",
        )?;
        let rows = stmt.query_map([term_id, course_id], |row| {
            Ok(Meeting::new(row.get::<_, NaiveDateTime>(0)?, row.get::<_, NaiveDateTime>(1)?))
        })?;

        let mut meetings = Vec::new();
        for row in rows {
            meetings.push(row?);
        }
        Ok(meetings)
    }

    fn load_assignments(&self, term_id: &str, course_id: &str) -> Result<Vec<Assignment>> {
        let mut stmt = self.db.prepare(
            r#"
            SELECT id, title, load_units, start_at, due_at FROM assignments
            WHERE term_id = ?1 AND course_id = ?2 ORDER BY position
            "#,
        )?;
        let rows = stmt.query_map([term_id, course_id], |row| {
            Ok(Assignment {
                id: row.get(0)?,
                title: row.get(1)?,
                load: row.get(2)?,
                start: row.get(3)?,
                due: row.get(4)?,
            })
        })?;

        let mut assignments = Vec::new();
        for row in rows {
            assignments.push(row?);
        }
        Ok(assignments)
    }

    /// List a term's persisted sessions in start order.
    pub fn list_sessions(&self, term_id: &str) -> Result<Vec<StudySession>> {
        let mut stmt = self.db.prepare(
            "SELECT term_id, assignment_id, start_at, end_at FROM study_sessions WHERE term_id = ?1 ORDER BY start_at, id",
        )?;
        let rows = stmt.query_map([term_id], |row| {
            Ok(StudySession {
                term_id: row.get(0)?,
                assignment_id: row.get(1)?,
                start: row.get(2)?,
                end: row.get(3)?,
            })
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    /// Count a term's persisted sessions.
    pub fn count_sessions(&self, term_id: &str) -> Result<usize> {
        let count: i64 = self.db.query_row(
            "SELECT COUNT(*) FROM study_sessions WHERE term_id = ?1",
            [term_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl TermSource for TermStore {
    fn load_term(&self, term_id: &str) -> Result<Option<TermData>> {
        let Some(term) = self.get_term(term_id)? else {
            return Ok(None);
        };
        let courses = self
            .load_courses(term_id)
            .with_context(|| format!("Failed to load courses for term {}", term_id))?;
        Ok(Some(TermData { term, courses }))
    }
}

impl SessionSink for TermStore {
    fn replace_sessions(&mut self, term_id: &str, sessions: &[StudySession]) -> Result<usize> {
        if let Some(stray) = sessions.iter().find(|s| s.term_id != term_id) {
            return Err(PlannerError::Storage(format!(
                "session for term {} handed to term {}",
                stray.term_id, term_id
            ))
            .into());
        }

        let tx = self.db.transaction()?;
        let removed = tx.execute("DELETE FROM study_sessions WHERE term_id = ?1", [term_id])?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO study_sessions (term_id, assignment_id, start_at, end_at) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for session in sessions {
                insert.execute(params![term_id, session.assignment_id, session.start, session.end])?;
            }
        }

        tx.commit().context("Failed to commit session replacement")?;
        log::debug!(
            "Replaced {} sessions of term {} with {}",
            removed,
            term_id,
            sessions.len()
        );
        Ok(sessions.len())
    }
}
