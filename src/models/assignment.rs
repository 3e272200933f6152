//! Assignment output model.

use serde::{Deserialize, Serialize};

/// How good the achieved placement was for the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AchievedPriority {
    /// The student's preference of this rank was satisfied (0 = best).
    Rank(u32),
    /// Administrator-fixed placement. Excluded from preference statistics.
    Preset,
    /// Placement without any matching preference.
    NoPreference,
}

impl AchievedPriority {
    /// Whether this is a preset placement.
    #[inline]
    pub fn is_preset(&self) -> bool {
        matches!(self, AchievedPriority::Preset)
    }

    /// The satisfied preference rank, if any.
    #[inline]
    pub fn rank(&self) -> Option<u32> {
        match self {
            AchievedPriority::Rank(r) => Some(*r),
            _ => None,
        }
    }
}

/// A committed student-block-course placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned student ID.
    pub student_id: String,
    /// Block the course occupies.
    pub block_id: String,
    /// Assigned course ID.
    pub course_id: String,
    /// How the placement ranks against the student's preferences.
    pub priority: AchievedPriority,
}

impl Assignment {
    /// Creates an assignment.
    pub fn new(
        student_id: impl Into<String>,
        block_id: impl Into<String>,
        course_id: impl Into<String>,
        priority: AchievedPriority,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            block_id: block_id.into(),
            course_id: course_id.into(),
            priority,
        }
    }

    /// Creates an assignment satisfying a preference of the given rank.
    pub fn ranked(
        student_id: impl Into<String>,
        block_id: impl Into<String>,
        course_id: impl Into<String>,
        rank: u32,
    ) -> Self {
        Self::new(student_id, block_id, course_id, AchievedPriority::Rank(rank))
    }

    /// Creates a preset assignment.
    pub fn preset(
        student_id: impl Into<String>,
        block_id: impl Into<String>,
        course_id: impl Into<String>,
    ) -> Self {
        Self::new(student_id, block_id, course_id, AchievedPriority::Preset)
    }

    /// Creates an assignment without a matching preference.
    pub fn unpreferred(
        student_id: impl Into<String>,
        block_id: impl Into<String>,
        course_id: impl Into<String>,
    ) -> Self {
        Self::new(student_id, block_id, course_id, AchievedPriority::NoPreference)
    }
}

/// How completely a student's weekly slots were filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillState {
    /// All target slots assigned.
    Full,
    /// Some but not all slots assigned (count given).
    Partial(usize),
    /// No slot assigned.
    Unassigned,
}

impl FillState {
    /// Derives a fill state from an assignment count and the slot target.
    pub fn from_count(assigned: usize, target: usize) -> Self {
        if assigned == 0 {
            FillState::Unassigned
        } else if assigned >= target {
            FillState::Full
        } else {
            FillState::Partial(assigned)
        }
    }

    /// Whether all slots are filled.
    #[inline]
    pub fn is_full(&self) -> bool {
        matches!(self, FillState::Full)
    }
}
