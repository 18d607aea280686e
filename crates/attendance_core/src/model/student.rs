//! Student domain model.
//!
//! # Responsibility
//! - Define the registered student record and its registration input.
//! - Normalize and validate registration input before persistence.
//!
//! # Invariants
//! - `name` and `roll_number` are non-empty after trimming.
//! - `department` is `None` rather than an empty string.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// System-assigned numeric student identifier (`students.id`).
pub type StudentId = i64;

/// Registered student as persisted in `students`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub roll_number: String,
    pub department: Option<String>,
}

/// Registration input for a new student.
///
/// Values are stored trimmed; see [`NewStudent::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub roll_number: String,
    pub department: Option<String>,
}

impl NewStudent {
    /// Builds registration input from raw form values.
    ///
    /// Surrounding whitespace is removed from every field and a blank
    /// department collapses to `None`. No validation happens here.
    pub fn new(name: &str, roll_number: &str, department: Option<&str>) -> Self {
        let department = department
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Self {
            name: name.trim().to_string(),
            roll_number: roll_number.trim().to_string(),
            department,
        }
    }

    /// Checks required fields.
    ///
    /// # Errors
    /// - [`StudentValidationError::EmptyName`] when `name` is blank.
    /// - [`StudentValidationError::EmptyRollNumber`] when `roll_number` is blank.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.name.trim().is_empty() {
            return Err(StudentValidationError::EmptyName);
        }
        if self.roll_number.trim().is_empty() {
            return Err(StudentValidationError::EmptyRollNumber);
        }
        Ok(())
    }
}

/// Validation failures for student registration input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentValidationError {
    EmptyName,
    EmptyRollNumber,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "full name is required"),
            Self::EmptyRollNumber => write!(f, "roll number is required"),
        }
    }
}

impl Error for StudentValidationError {}
