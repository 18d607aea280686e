//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the operations shells invoke.
//! - Keep UI/FFI/CLI layers decoupled from storage details.

pub mod attendance_store;
