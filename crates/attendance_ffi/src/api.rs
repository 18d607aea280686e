//! FFI use-case API for the desktop attendance UI.
//!
//! # Responsibility
//! - Expose register/mark/list/count operations as sync, UI-callable functions.
//! - Turn store errors into user-facing notification text.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Every call opens the store, runs one operation and releases it.
//! - `ok == false` always comes with a non-empty `message`.

use attendance_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppConfig, AttendanceStore, AttendanceView, RecordFilter, StoreError,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for bridge smoke tests.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core file logging once per process.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the database file used by every later call.
///
/// Without this call the path comes from `ATTENDANCE_DB_PATH` or the default
/// `attendance.db`.
///
/// # FFI contract
/// - Repeating the same path is accepted.
/// - Returns empty string on success, error message when a different path
///   is already active or the path is blank.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "database path cannot be empty".to_string();
    }

    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "database path already set to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Outcome of a write operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Notification text for the UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// One row of the records table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordItem {
    pub id: i64,
    pub name: String,
    pub roll: String,
    /// Empty when no department was recorded.
    pub department: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `Present` or `Absent`.
    pub status: String,
    /// `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsResponse {
    pub ok: bool,
    /// Most recent first.
    pub items: Vec<RecordItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountsResponse {
    pub ok: bool,
    pub total: u64,
    pub present: u64,
    pub absent: u64,
    pub marked: u64,
    pub message: String,
}

/// Registers a student from the add-student form.
#[flutter_rust_bridge::frb(sync)]
pub fn register_student(name: String, roll: String, department: String) -> ActionResponse {
    let result = with_store(|store| store.register_student(&name, &roll, &department));
    match result {
        Ok(_) => ActionResponse::success("Student added."),
        Err(err) => ActionResponse::failure(user_message(&err, roll.trim())),
    }
}

/// Marks today's attendance; `status` is `Present` or `Absent`.
#[flutter_rust_bridge::frb(sync)]
pub fn mark_attendance(roll: String, status: String) -> ActionResponse {
    match with_store(|store| store.mark_attendance_text(&roll, &status)) {
        Ok(record) => ActionResponse::success(format!(
            "Marked {} for roll {} on {}.",
            record.status,
            roll.trim(),
            record.date
        )),
        Err(err) => ActionResponse::failure(user_message(&err, roll.trim())),
    }
}

/// Lists attendance rows, optionally only today's.
#[flutter_rust_bridge::frb(sync)]
pub fn list_records(today_only: bool) -> RecordsResponse {
    let filter = RecordFilter::from_today_only(today_only);
    match with_store(|store| store.list_records(filter)) {
        Ok(views) => RecordsResponse {
            ok: true,
            message: format!("{} record(s).", views.len()),
            items: views.into_iter().map(to_record_item).collect(),
        },
        Err(err) => RecordsResponse {
            ok: false,
            items: Vec::new(),
            message: user_message(&err, ""),
        },
    }
}

/// Status-bar counters for today.
#[flutter_rust_bridge::frb(sync)]
pub fn compute_daily_counts() -> CountsResponse {
    match with_store(|store| store.compute_daily_counts()) {
        Ok(counts) => CountsResponse {
            ok: true,
            total: counts.total_students,
            present: counts.present_today,
            absent: counts.absent_today,
            marked: counts.marked_today,
            message: String::new(),
        },
        Err(err) => CountsResponse {
            ok: false,
            total: 0,
            present: 0,
            absent: 0,
            marked: 0,
            message: user_message(&err, ""),
        },
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| AppConfig::from_env().db_path)
        .clone()
}

fn with_store<T>(
    f: impl FnOnce(&AttendanceStore) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let store = AttendanceStore::open(resolve_db_path())?;
    let result = f(&store);
    if let Err(err) = store.close() {
        warn!("event=store_close module=ffi status=error error={err}");
    }
    result
}

fn user_message(err: &StoreError, roll: &str) -> String {
    match err {
        StoreError::Validation(_) => "Full Name and Roll Number are required.".to_string(),
        StoreError::DuplicateKey(_) => format!("Roll Number '{roll}' already exists."),
        StoreError::StudentNotFound(_) => {
            format!("No student with roll '{roll}'. Add the student first.")
        }
        StoreError::InvalidStatus(inner) => inner.to_string(),
        StoreError::StorageUnavailable(_) => err.to_string(),
    }
}

fn to_record_item(view: AttendanceView) -> RecordItem {
    RecordItem {
        id: view.id,
        name: view.name,
        roll: view.roll_number,
        department: view.department.unwrap_or_default(),
        date: view.date.format("%Y-%m-%d").to_string(),
        status: view.status.to_string(),
        timestamp: view.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}
