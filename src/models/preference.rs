//! Student preferences and preset assignments.

use serde::{Deserialize, Serialize};

/// A ranked course wish within a block, or a pause marker.
///
/// The embedded block records where the student expressed the wish; the
/// authoritative location of the course is always the
/// [`CourseSchedule`](super::CourseSchedule) mapping, which may have
/// moved the course since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    /// Student who expressed the preference.
    pub student_id: String,
    /// Block the preference was expressed for.
    pub block_id: String,
    /// Desired course. `None` = pause marker (no real course desired).
    pub course_id: Option<String>,
    /// Preference rank within the block (0 = best).
    pub rank: u32,
}

impl Preference {
    /// Creates a ranked course preference.
    pub fn ranked(
        student_id: impl Into<String>,
        block_id: impl Into<String>,
        course_id: impl Into<String>,
        rank: u32,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            block_id: block_id.into(),
            course_id: Some(course_id.into()),
            rank,
        }
    }

    /// Creates a pause marker: the student wants no real course in this block.
    pub fn pause(student_id: impl Into<String>, block_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            block_id: block_id.into(),
            course_id: None,
            rank: 0,
        }
    }

    /// Whether this is a pause marker.
    #[inline]
    pub fn is_pause(&self) -> bool {
        self.course_id.is_none()
    }
}

/// An administrator-fixed assignment.
///
/// Immutable input: it counts toward occupancy, day, and category sets
/// but is never reassigned by any phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetAssignment {
    /// Student receiving the preset.
    pub student_id: String,
    /// Block of the preset.
    pub block_id: String,
    /// Course of the preset.
    pub course_id: String,
}

impl PresetAssignment {
    /// Creates a preset assignment.
    pub fn new(
        student_id: impl Into<String>,
        block_id: impl Into<String>,
        course_id: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            block_id: block_id.into(),
            course_id: course_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_preference() {
        let p = Preference::ranked("S1", "mon_am", "C1", 0);
        assert!(!p.is_pause());
        assert_eq!(p.course_id.as_deref(), Some("C1"));
        assert_eq!(p.rank, 0);
    }

    #[test]
    fn test_pause_marker() {
        let p = Preference::pause("S1", "mon_am");
        assert!(p.is_pause());
        assert_eq!(p.course_id, None);
    }
}
