//! Core domain logic for the student attendance desktop app.
//! This crate owns the storage schema and every attendance invariant;
//! shells (FFI, CLI) only translate input and render results.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::attendance::{
    AttendanceRecord, AttendanceStatus, AttendanceView, DailyCounts, InvalidStatusError,
    RecordFilter, RecordId, StudentSummary,
};
pub use model::student::{NewStudent, Student, StudentId, StudentValidationError};
pub use repo::attendance_repo::{AttendanceRepository, SqliteAttendanceRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::attendance_store::{AttendanceStore, StoreError, StoreResult};

/// Minimal health-check API for shell wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
