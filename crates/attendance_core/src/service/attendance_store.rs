//! Attendance persistence store.
//!
//! # Responsibility
//! - Own the storage connection and the clock for the lifetime of a session.
//! - Expose registration, marking, listing and aggregate use-cases.
//! - Map repository failures into the error taxonomy shown to users.
//!
//! # Invariants
//! - Every failure leaves stored data unchanged.
//! - "Today" always comes from the injected clock, read once per call.
//! - Roll numbers are trimmed before any lookup or write.
//! - Log lines carry roll numbers and counts, never student names.

use crate::clock::{Clock, SystemClock};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, AttendanceView, DailyCounts, InvalidStatusError,
    RecordFilter, StudentSummary,
};
use crate::model::student::{NewStudent, Student, StudentId, StudentValidationError};
use crate::repo::attendance_repo::{AttendanceRepository, SqliteAttendanceRepository};
use crate::repo::student_repo::{SqliteStudentRepository, StudentRepository};
use crate::repo::{ensure_tables, RepoError};
use log::{debug, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported to store callers.
#[derive(Debug)]
pub enum StoreError {
    /// A required text field is blank.
    Validation(StudentValidationError),
    /// Roll number is already registered.
    DuplicateKey(String),
    /// No student is registered under the roll number.
    StudentNotFound(String),
    /// Status text is not `Present` or `Absent`.
    InvalidStatus(InvalidStatusError),
    /// Storage could not be opened, read or written.
    StorageUnavailable(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateKey(roll) => write!(f, "roll number '{roll}' already exists"),
            Self::StudentNotFound(roll) => write!(f, "no student with roll '{roll}'"),
            Self::InvalidStatus(err) => write!(f, "{err}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidStatus(err) => Some(err),
            Self::StorageUnavailable(err) => Some(err),
            Self::DuplicateKey(_) | Self::StudentNotFound(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::DuplicateRollNumber(roll) => Self::DuplicateKey(roll),
            other => Self::StorageUnavailable(other),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(RepoError::Db(value))
    }
}

impl From<InvalidStatusError> for StoreError {
    fn from(value: InvalidStatusError) -> Self {
        Self::InvalidStatus(value)
    }
}

/// Single-client attendance store over one SQLite connection.
///
/// The connection is released when the store is dropped or [`closed`].
///
/// [`closed`]: AttendanceStore::close
#[derive(Debug)]
pub struct AttendanceStore<C: Clock = SystemClock> {
    conn: Connection,
    clock: C,
}

impl AttendanceStore<SystemClock> {
    /// Opens the database file at `path` using the wall clock.
    ///
    /// # Errors
    /// Returns [`StoreError::StorageUnavailable`] when the file cannot be
    /// opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_clock(path, SystemClock)
    }

    /// Opens a throwaway in-memory store using the wall clock.
    ///
    /// # Errors
    /// Returns [`StoreError::StorageUnavailable`] when SQLite setup fails.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_clock(open_db_in_memory()?, SystemClock)
    }
}

impl<C: Clock> AttendanceStore<C> {
    /// Opens the database file at `path` with a caller-provided clock.
    ///
    /// # Errors
    /// Returns [`StoreError::StorageUnavailable`] when the file cannot be
    /// opened or migrated.
    pub fn open_with_clock(path: impl AsRef<Path>, clock: C) -> StoreResult<Self> {
        Self::with_clock(open_db(path)?, clock)
    }

    /// Takes ownership of an already migrated connection.
    ///
    /// # Errors
    /// Returns [`StoreError::StorageUnavailable`] when required tables are
    /// missing.
    pub fn with_clock(conn: Connection, clock: C) -> StoreResult<Self> {
        ensure_tables(&conn, &["students", "attendance"])?;
        Ok(Self { conn, clock })
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Borrow of the underlying connection for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Releases the connection, reporting any close failure.
    ///
    /// # Errors
    /// Returns [`StoreError::StorageUnavailable`] when SQLite refuses to close.
    pub fn close(self) -> StoreResult<()> {
        self.conn
            .close()
            .map_err(|(_, err)| StoreError::from(RepoError::from(err)))
    }

    fn students(&self) -> SqliteStudentRepository<'_> {
        SqliteStudentRepository::new(&self.conn)
    }

    fn attendance(&self) -> SqliteAttendanceRepository<'_> {
        SqliteAttendanceRepository::new(&self.conn)
    }

    /// Registers a student from raw form values.
    ///
    /// Fields are trimmed; a blank department is stored as NULL.
    ///
    /// # Errors
    /// - [`StoreError::Validation`] for a blank name or roll number.
    /// - [`StoreError::DuplicateKey`] when the roll number exists; nothing is written.
    pub fn register_student(
        &self,
        name: &str,
        roll_number: &str,
        department: &str,
    ) -> StoreResult<StudentId> {
        let input = NewStudent::new(name, roll_number, Some(department));

        match self.students().create_student(&input) {
            Ok(id) => {
                info!(
                    "event=student_register module=service status=ok student_id={id} roll={}",
                    input.roll_number
                );
                Ok(id)
            }
            Err(err) => {
                warn!(
                    "event=student_register module=service status=error roll={} error={err}",
                    input.roll_number
                );
                Err(err.into())
            }
        }
    }

    /// Looks up a student id by exact trimmed roll number.
    ///
    /// # Errors
    /// Returns [`StoreError::StorageUnavailable`] on read failure.
    pub fn resolve_student_by_roll(&self, roll_number: &str) -> StoreResult<Option<StudentId>> {
        Ok(self.students().find_id_by_roll(roll_number.trim())?)
    }

    /// Returns the full student row for a roll number.
    ///
    /// # Errors
    /// Returns [`StoreError::StorageUnavailable`] on read failure.
    pub fn find_student(&self, roll_number: &str) -> StoreResult<Option<Student>> {
        Ok(self.students().find_by_roll(roll_number.trim())?)
    }

    /// Marks today's attendance for a student, replacing any earlier mark
    /// from the same day.
    ///
    /// # Errors
    /// - [`StoreError::Validation`] for a blank roll number.
    /// - [`StoreError::StudentNotFound`] when the roll is not registered.
    pub fn mark_attendance(
        &self,
        roll_number: &str,
        status: AttendanceStatus,
    ) -> StoreResult<AttendanceRecord> {
        let student_id = self.require_student_id(roll_number)?;
        let now = self.clock.now();

        let record = self
            .attendance()
            .upsert_record(student_id, now.date(), status, now)?;
        info!(
            "event=attendance_mark module=service status=ok roll={} date={} mark={} record_id={}",
            roll_number.trim(),
            record.date,
            record.status,
            record.id
        );
        Ok(record)
    }

    /// Same as [`mark_attendance`](Self::mark_attendance) but with status
    /// text from a form or command line.
    ///
    /// # Errors
    /// [`StoreError::InvalidStatus`] when `status` is not `Present`/`Absent`,
    /// before any lookup or write; otherwise as `mark_attendance`.
    pub fn mark_attendance_text(
        &self,
        roll_number: &str,
        status: &str,
    ) -> StoreResult<AttendanceRecord> {
        let status = status.parse::<AttendanceStatus>().map_err(|err| {
            warn!("event=attendance_mark module=service status=error error_code=invalid_status");
            StoreError::from(err)
        })?;
        self.mark_attendance(roll_number, status)
    }

    /// Lists joined attendance rows, most recent first.
    ///
    /// # Errors
    /// Returns [`StoreError::StorageUnavailable`] on read failure.
    pub fn list_records(&self, filter: RecordFilter) -> StoreResult<Vec<AttendanceView>> {
        let date = match filter {
            RecordFilter::All => None,
            RecordFilter::TodayOnly => Some(self.clock.today()),
        };
        let views = self.attendance().list_views(date)?;
        debug!(
            "event=records_list module=service status=ok filter={filter:?} rows={}",
            views.len()
        );
        Ok(views)
    }

    /// Counts students and today's marks.
    ///
    /// # Errors
    /// Returns [`StoreError::StorageUnavailable`] on read failure.
    pub fn compute_daily_counts(&self) -> StoreResult<DailyCounts> {
        Ok(self.attendance().daily_counts(self.clock.today())?)
    }

    /// All registered students ordered by roll number.
    ///
    /// # Errors
    /// Returns [`StoreError::StorageUnavailable`] on read failure.
    pub fn list_students(&self) -> StoreResult<Vec<Student>> {
        Ok(self.students().list_students()?)
    }

    /// Every record of one student, most recent first.
    ///
    /// # Errors
    /// [`StoreError::StudentNotFound`] when the roll is not registered.
    pub fn student_history(&self, roll_number: &str) -> StoreResult<Vec<AttendanceView>> {
        let student_id = self.require_student_id(roll_number)?;
        Ok(self.attendance().list_views_for_student(student_id)?)
    }

    /// Lifetime present/absent totals of one student.
    ///
    /// # Errors
    /// [`StoreError::StudentNotFound`] when the roll is not registered.
    pub fn student_summary(&self, roll_number: &str) -> StoreResult<StudentSummary> {
        let student = self
            .find_student(roll_number)?
            .ok_or_else(|| StoreError::StudentNotFound(roll_number.trim().to_string()))?;
        let (present_days, absent_days) = self.attendance().status_totals(student.id)?;
        Ok(StudentSummary {
            student,
            present_days,
            absent_days,
        })
    }

    /// Removes a student and all of its attendance records.
    ///
    /// # Errors
    /// [`StoreError::StudentNotFound`] when the roll is not registered.
    pub fn delete_student(&self, roll_number: &str) -> StoreResult<()> {
        let student_id = self.require_student_id(roll_number)?;
        match self.students().delete_student(student_id) {
            Ok(()) => {
                info!(
                    "event=student_delete module=service status=ok student_id={student_id} roll={}",
                    roll_number.trim()
                );
                Ok(())
            }
            Err(RepoError::StudentNotFound(_)) => {
                Err(StoreError::StudentNotFound(roll_number.trim().to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn require_student_id(&self, roll_number: &str) -> StoreResult<StudentId> {
        let roll = roll_number.trim();
        if roll.is_empty() {
            return Err(StoreError::Validation(
                StudentValidationError::EmptyRollNumber,
            ));
        }

        self.students().find_id_by_roll(roll)?.ok_or_else(|| {
            warn!("event=student_lookup module=service status=not_found roll={roll}");
            StoreError::StudentNotFound(roll.to_string())
        })
    }
}
