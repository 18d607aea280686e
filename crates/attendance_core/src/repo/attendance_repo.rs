//! Attendance repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Upsert the single per-day record of a student.
//! - Serve the joined record view and per-day aggregate counts.
//!
//! # Invariants
//! - `UNIQUE(student_id, date) ON CONFLICT REPLACE` makes a second write for
//!   the same day replace the first; the replacement gets a fresh row id.
//! - Views are ordered by `timestamp DESC, id DESC`.

use crate::model::attendance::{
    AttendanceRecord, AttendanceStatus, AttendanceView, DailyCounts, DATE_FORMAT,
    TIMESTAMP_FORMAT,
};
use crate::model::student::StudentId;
use crate::repo::{constraint_violation, ensure_tables, to_count, RepoError, RepoResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const VIEW_SELECT_SQL: &str = "SELECT
    a.id,
    s.name,
    s.roll_number,
    s.department,
    a.date,
    a.status,
    a.timestamp
FROM attendance a
JOIN students s ON s.id = a.student_id";

const VIEW_ORDER_SQL: &str = " ORDER BY a.timestamp DESC, a.id DESC";

/// Repository interface for attendance writes and reads.
pub trait AttendanceRepository {
    /// Inserts or replaces the record for (`student_id`, `date`).
    fn upsert_record(
        &self,
        student_id: StudentId,
        date: NaiveDate,
        status: AttendanceStatus,
        timestamp: NaiveDateTime,
    ) -> RepoResult<AttendanceRecord>;
    fn get_record(&self, student_id: StudentId, date: NaiveDate)
        -> RepoResult<Option<AttendanceRecord>>;
    /// Joined rows, optionally limited to one date, most recent first.
    fn list_views(&self, date: Option<NaiveDate>) -> RepoResult<Vec<AttendanceView>>;
    /// Joined rows of one student, most recent first.
    fn list_views_for_student(&self, student_id: StudentId) -> RepoResult<Vec<AttendanceView>>;
    fn daily_counts(&self, date: NaiveDate) -> RepoResult<DailyCounts>;
    /// Lifetime `(present, absent)` day totals for one student.
    fn status_totals(&self, student_id: StudentId) -> RepoResult<(u64, u64)>;
}

/// SQLite-backed attendance repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    /// Wraps a connection that is known to be migrated.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking the joined tables exist.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["students", "attendance"])?;
        Ok(Self::new(conn))
    }

    fn query_views(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<AttendanceView>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut views = Vec::new();

        while let Some(row) = rows.next()? {
            views.push(parse_view_row(row)?);
        }

        Ok(views)
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn upsert_record(
        &self,
        student_id: StudentId,
        date: NaiveDate,
        status: AttendanceStatus,
        timestamp: NaiveDateTime,
    ) -> RepoResult<AttendanceRecord> {
        let written = self.conn.execute(
            "INSERT INTO attendance (student_id, date, status, timestamp)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                student_id,
                date.format(DATE_FORMAT).to_string(),
                status.as_str(),
                timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ],
        );

        match written {
            Ok(_) => Ok(AttendanceRecord {
                id: self.conn.last_insert_rowid(),
                student_id,
                date,
                status,
                timestamp,
            }),
            Err(err)
                if constraint_violation(&err)
                    == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) =>
            {
                Err(RepoError::MissingStudentReference(student_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_record(
        &self,
        student_id: StudentId,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, student_id, date, status, timestamp
                 FROM attendance
                 WHERE student_id = ?1 AND date = ?2;",
                params![student_id, date.format(DATE_FORMAT).to_string()],
                |row| {
                    Ok((
                        row.get::<_, i64>("id")?,
                        row.get::<_, StudentId>("student_id")?,
                        row.get::<_, String>("date")?,
                        row.get::<_, String>("status")?,
                        row.get::<_, String>("timestamp")?,
                    ))
                },
            )
            .optional()?;

        let Some((id, student_id, date_text, status_text, timestamp_text)) = raw else {
            return Ok(None);
        };

        Ok(Some(AttendanceRecord {
            id,
            student_id,
            date: parse_date(&date_text)?,
            status: parse_status(&status_text)?,
            timestamp: parse_timestamp(&timestamp_text)?,
        }))
    }

    fn list_views(&self, date: Option<NaiveDate>) -> RepoResult<Vec<AttendanceView>> {
        let mut sql = VIEW_SELECT_SQL.to_string();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(date) = date {
            sql.push_str(" WHERE a.date = ?");
            bind_values.push(Value::Text(date.format(DATE_FORMAT).to_string()));
        }
        sql.push_str(VIEW_ORDER_SQL);

        self.query_views(&sql, bind_values)
    }

    fn list_views_for_student(&self, student_id: StudentId) -> RepoResult<Vec<AttendanceView>> {
        let sql = format!("{VIEW_SELECT_SQL} WHERE a.student_id = ?{VIEW_ORDER_SQL}");
        self.query_views(&sql, vec![Value::Integer(student_id)])
    }

    fn daily_counts(&self, date: NaiveDate) -> RepoResult<DailyCounts> {
        let (total, present, absent, marked): (i64, i64, i64, i64) = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM students),
                COALESCE(SUM(status = 'Present'), 0),
                COALESCE(SUM(status = 'Absent'), 0),
                COUNT(*)
             FROM attendance
             WHERE date = ?1;",
            [date.format(DATE_FORMAT).to_string()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        Ok(DailyCounts {
            total_students: to_count(total, "students")?,
            present_today: to_count(present, "present")?,
            absent_today: to_count(absent, "absent")?,
            marked_today: to_count(marked, "marked")?,
        })
    }

    fn status_totals(&self, student_id: StudentId) -> RepoResult<(u64, u64)> {
        let (present, absent): (i64, i64) = self.conn.query_row(
            "SELECT
                COALESCE(SUM(status = 'Present'), 0),
                COALESCE(SUM(status = 'Absent'), 0)
             FROM attendance
             WHERE student_id = ?1;",
            [student_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok((to_count(present, "present")?, to_count(absent, "absent")?))
    }
}

fn parse_view_row(row: &Row<'_>) -> RepoResult<AttendanceView> {
    let date_text: String = row.get("date")?;
    let status_text: String = row.get("status")?;
    let timestamp_text: String = row.get("timestamp")?;

    Ok(AttendanceView {
        id: row.get("id")?,
        name: row.get("name")?,
        roll_number: row.get("roll_number")?,
        department: row.get("department")?,
        date: parse_date(&date_text)?,
        status: parse_status(&status_text)?,
        timestamp: parse_timestamp(&timestamp_text)?,
    })
}

fn parse_date(value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in attendance.date")))
}

fn parse_timestamp(value: &str) -> RepoResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{value}` in attendance.timestamp"
        ))
    })
}

// Storage text is exact; the lenient `FromStr` is for user input only.
fn parse_status(value: &str) -> RepoResult<AttendanceStatus> {
    match value {
        "Present" => Ok(AttendanceStatus::Present),
        "Absent" => Ok(AttendanceStatus::Absent),
        other => Err(RepoError::InvalidData(format!(
            "invalid status `{other}` in attendance.status"
        ))),
    }
}
