//! Attendance domain model.
//!
//! # Responsibility
//! - Define the per-day attendance record and its read projections.
//! - Own the textual encoding of statuses, dates and timestamps.
//!
//! # Invariants
//! - Status is one of `Present | Absent`; no other value is representable.
//! - Dates are ISO 8601 calendar dates without a time component.
//! - `DailyCounts::marked_today == present_today + absent_today`.

use crate::model::student::{Student, StudentId};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Storage format for `attendance.date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format for `attendance.timestamp`, same shape as SQLite `datetime()`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// System-assigned attendance record identifier (`attendance.id`).
pub type RecordId = i64;

/// Daily attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Returns the persisted text (`Present` / `Absent`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
        }
    }
}

impl Display for AttendanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returned when text does not name a known attendance status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatusError(pub String);

impl Display for InvalidStatusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid attendance status `{}`; expected Present|Absent",
            self.0
        )
    }
}

impl Error for InvalidStatusError {}

impl FromStr for AttendanceStatus {
    type Err = InvalidStatusError;

    /// Parses `Present` / `Absent`, ignoring case and surrounding whitespace.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("present") {
            Ok(Self::Present)
        } else if trimmed.eq_ignore_ascii_case("absent") {
            Ok(Self::Absent)
        } else {
            Err(InvalidStatusError(trimmed.to_string()))
        }
    }
}

/// One attendance row as persisted in `attendance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub student_id: StudentId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// Write time assigned by the store, second precision.
    pub timestamp: NaiveDateTime,
}

/// Attendance record joined with its owning student, for table display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceView {
    pub id: RecordId,
    pub name: String,
    pub roll_number: String,
    pub department: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub timestamp: NaiveDateTime,
}

/// Row filter for record listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordFilter {
    #[default]
    All,
    /// Only rows dated with the store clock's current date.
    TodayOnly,
}

impl RecordFilter {
    pub fn from_today_only(today_only: bool) -> Self {
        if today_only {
            Self::TodayOnly
        } else {
            Self::All
        }
    }
}

/// Aggregate counts for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounts {
    /// All registered students, independent of date.
    pub total_students: u64,
    pub present_today: u64,
    pub absent_today: u64,
    /// Records for the day regardless of status.
    pub marked_today: u64,
}

impl DailyCounts {
    /// Students with no record for the day yet.
    pub fn unmarked_today(&self) -> u64 {
        self.total_students.saturating_sub(self.marked_today)
    }

    /// Tuple form `(total, present, absent, marked)`.
    pub fn as_tuple(&self) -> (u64, u64, u64, u64) {
        (
            self.total_students,
            self.present_today,
            self.absent_today,
            self.marked_today,
        )
    }
}

/// Lifetime totals for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub student: Student,
    pub present_days: u64,
    pub absent_days: u64,
}

impl StudentSummary {
    pub fn marked_days(&self) -> u64 {
        self.present_days + self.absent_days
    }
}
