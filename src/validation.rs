//! Input validation for allocation runs.
//!
//! Checks structural integrity of the input collections before the
//! algorithms run. Detects:
//! - Duplicate IDs
//! - Preferences and presets referencing unknown entities
//! - Schedule entries pointing at unknown courses or blocks
//! - Conflicting presets (two for one student on the same weekday)
//!
//! All issues are collected; nothing short-circuits. Preset capacity is
//! deliberately not checked here, preset placements are authoritative.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::models::{Course, CourseSchedule, Preference, PresetAssignment, Student, TimeBlock};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A reference to a student that doesn't exist.
    UnknownStudent,
    /// A reference to a course that doesn't exist.
    UnknownCourse,
    /// A reference to a block that doesn't exist.
    UnknownBlock,
    /// Two presets place one student on the same weekday.
    PresetConflict,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for an allocation run.
///
/// Checks:
/// 1. No duplicate student, block, or course IDs
/// 2. Every schedule entry maps an existing course to an existing block
/// 3. Every preference references an existing student, block, and course
/// 4. Every preset references an existing student, block, and course
/// 5. No two presets place one student on the same weekday
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    students: &[Student],
    blocks: &[TimeBlock],
    courses: &[Course],
    schedule: &CourseSchedule,
    preferences: &[Preference],
    presets: &[PresetAssignment],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut student_ids = HashSet::new();
    for s in students {
        if !student_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate student ID: {}", s.id),
            ));
        }
    }

    let mut block_days = HashMap::new();
    for b in blocks {
        if block_days.insert(b.id.as_str(), b.weekday).is_some() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate block ID: {}", b.id),
            ));
        }
    }

    let mut course_ids = HashSet::new();
    for c in courses {
        if !course_ids.insert(c.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", c.id),
            ));
        }
    }

    for (course_id, block_id) in schedule.iter() {
        if !course_ids.contains(course_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownCourse,
                format!("Schedule maps unknown course '{course_id}'"),
            ));
        }
        if !block_days.contains_key(block_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownBlock,
                format!("Course '{course_id}' is mapped to unknown block '{block_id}'"),
            ));
        }
    }

    for p in preferences {
        if !student_ids.contains(p.student_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStudent,
                format!("Preference references unknown student '{}'", p.student_id),
            ));
        }
        if !block_days.contains_key(p.block_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownBlock,
                format!("Preference references unknown block '{}'", p.block_id),
            ));
        }
        if let Some(course_id) = p.course_id.as_deref() {
            if !course_ids.contains(course_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownCourse,
                    format!("Preference references unknown course '{course_id}'"),
                ));
            }
        }
    }

    let mut preset_days: HashSet<(&str, crate::models::Weekday)> = HashSet::new();
    for p in presets {
        if !student_ids.contains(p.student_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStudent,
                format!("Preset references unknown student '{}'", p.student_id),
            ));
        }
        if !course_ids.contains(p.course_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownCourse,
                format!("Preset references unknown course '{}'", p.course_id),
            ));
        }
        match block_days.get(p.block_id.as_str()) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownBlock,
                format!("Preset references unknown block '{}'", p.block_id),
            )),
            Some(&weekday) => {
                if !preset_days.insert((p.student_id.as_str(), weekday)) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::PresetConflict,
                        format!(
                            "Student '{}' has multiple presets on {:?}",
                            p.student_id, weekday
                        ),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
