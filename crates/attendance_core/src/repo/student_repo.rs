//! Student repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Register, look up, list and remove rows in `students`.
//! - Surface the roll-number unique constraint as a semantic error.
//!
//! # Invariants
//! - Registration never overwrites an existing roll number.
//! - Removing a student relies on `ON DELETE CASCADE` to drop attendance.

use crate::model::student::{NewStudent, Student, StudentId};
use crate::repo::{constraint_violation, ensure_tables, to_count, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    roll_number,
    department
FROM students";

/// Repository interface for student registration and lookup.
pub trait StudentRepository {
    /// Inserts a new student and returns its generated id.
    fn create_student(&self, student: &NewStudent) -> RepoResult<StudentId>;
    /// Exact roll-number lookup; the caller passes a trimmed value.
    fn find_by_roll(&self, roll_number: &str) -> RepoResult<Option<Student>>;
    fn find_id_by_roll(&self, roll_number: &str) -> RepoResult<Option<StudentId>>;
    /// All students ordered by roll number.
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    fn count_students(&self) -> RepoResult<u64>;
    /// Deletes a student and, through the foreign key, its attendance rows.
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
}

/// SQLite-backed student repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Wraps a connection that is known to be migrated.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking the `students` table exists.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["students"])?;
        Ok(Self::new(conn))
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &NewStudent) -> RepoResult<StudentId> {
        student.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO students (name, roll_number, department) VALUES (?1, ?2, ?3);",
            params![
                student.name.as_str(),
                student.roll_number.as_str(),
                student.department.as_deref(),
            ],
        );

        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err)
                if constraint_violation(&err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) =>
            {
                Err(RepoError::DuplicateRollNumber(student.roll_number.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn find_by_roll(&self, roll_number: &str) -> RepoResult<Option<Student>> {
        let student = self
            .conn
            .query_row(
                &format!("{STUDENT_SELECT_SQL} WHERE roll_number = ?1;"),
                [roll_number],
                parse_student_row,
            )
            .optional()?;
        Ok(student)
    }

    fn find_id_by_roll(&self, roll_number: &str) -> RepoResult<Option<StudentId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM students WHERE roll_number = ?1;",
                [roll_number],
                |row| row.get::<_, StudentId>(0),
            )
            .optional()?;
        Ok(id)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY roll_number ASC, id ASC;"))?;
        let students = stmt
            .query_map([], parse_student_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(students)
    }

    fn count_students(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;
        to_count(count, "students")
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::StudentNotFound(id));
        }
        Ok(())
    }
}

fn parse_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get("id")?,
        name: row.get("name")?,
        roll_number: row.get("roll_number")?,
        department: row.get("department")?,
    })
}
