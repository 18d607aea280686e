//! Domain model for students and their daily attendance.
//!
//! # Responsibility
//! - Define canonical records owned by the persistence store.
//! - Keep input validation next to the types it protects.
//!
//! # Invariants
//! - A student is identified by a system-assigned `StudentId` and a unique
//!   human-assigned roll number.
//! - At most one attendance record exists per (student, date).

pub mod attendance;
pub mod student;
