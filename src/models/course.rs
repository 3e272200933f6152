//! Course model and the authoritative course→block mapping.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::Gender;

/// An elective course occupying one weekly time block.
///
/// Restriction fields are plain data: an empty `allowed_grades` set means
/// unrestricted, and the `manual_assignment_only` / `placeholder` flags
/// structurally exclude the course from automatic assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Pedagogical categories (for the category-diversity rule).
    pub categories: HashSet<String>,
    /// Minimum viable enrollment.
    pub min_capacity: u32,
    /// Maximum enrollment. Never exceeded.
    pub max_capacity: u32,
    /// Grades admitted. Empty = unrestricted.
    pub allowed_grades: HashSet<u8>,
    /// Genders barred from this course.
    pub excluded_genders: HashSet<Gender>,
    /// Only administrators may assign this course.
    pub manual_assignment_only: bool,
    /// Non-real filler course, never eligible for real assignment.
    pub placeholder: bool,
}

impl Course {
    /// Creates a new course with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            categories: HashSet::new(),
            min_capacity: 0,
            max_capacity: 0,
            allowed_grades: HashSet::new(),
            excluded_genders: HashSet::new(),
            manual_assignment_only: false,
            placeholder: false,
        }
    }

    /// Sets the course name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    /// Sets minimum and maximum capacity.
    pub fn with_capacity(mut self, min: u32, max: u32) -> Self {
        self.min_capacity = min;
        self.max_capacity = max;
        self
    }

    /// Restricts the course to a grade. Call once per admitted grade.
    pub fn with_allowed_grade(mut self, grade: u8) -> Self {
        self.allowed_grades.insert(grade);
        self
    }

    /// Bars a gender from this course.
    pub fn with_excluded_gender(mut self, gender: Gender) -> Self {
        self.excluded_genders.insert(gender);
        self
    }

    /// Marks the course as manual-assignment-only.
    pub fn manual_only(mut self) -> Self {
        self.manual_assignment_only = true;
        self
    }

    /// Marks the course as a placeholder.
    pub fn as_placeholder(mut self) -> Self {
        self.placeholder = true;
        self
    }

    /// Whether a student of the given grade is admitted.
    #[inline]
    pub fn admits_grade(&self, grade: u8) -> bool {
        self.allowed_grades.is_empty() || self.allowed_grades.contains(&grade)
    }

    /// Whether a student of the given gender is admitted.
    #[inline]
    pub fn admits_gender(&self, gender: Gender) -> bool {
        !self.excluded_genders.contains(&gender)
    }
}

/// Authoritative course→block mapping.
///
/// All block lookups for a course must go through this mapping — a
/// preference's embedded block may be stale after a course was moved.
/// Maintains a reverse block→courses index for block-wise scans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseSchedule {
    block_by_course: HashMap<String, String>,
    courses_by_block: HashMap<String, Vec<String>>,
}

impl CourseSchedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course→block assignment (builder form).
    pub fn with_assignment(
        mut self,
        course_id: impl Into<String>,
        block_id: impl Into<String>,
    ) -> Self {
        self.assign(course_id, block_id);
        self
    }

    /// Assigns a course to a block, replacing any previous location.
    pub fn assign(&mut self, course_id: impl Into<String>, block_id: impl Into<String>) {
        let course_id = course_id.into();
        let block_id = block_id.into();

        if let Some(old_block) = self.block_by_course.insert(course_id.clone(), block_id.clone()) {
            if let Some(list) = self.courses_by_block.get_mut(&old_block) {
                list.retain(|c| c != &course_id);
            }
        }
        self.courses_by_block
            .entry(block_id)
            .or_default()
            .push(course_id);
    }

    /// The block a course is located in, if mapped.
    pub fn block_of(&self, course_id: &str) -> Option<&str> {
        self.block_by_course.get(course_id).map(String::as_str)
    }

    /// Courses located in a block (insertion order).
    pub fn courses_in(&self, block_id: &str) -> &[String] {
        self.courses_by_block
            .get(block_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates over all (course, block) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.block_by_course
            .iter()
            .map(|(c, b)| (c.as_str(), b.as_str()))
    }

    /// Number of mapped courses.
    pub fn len(&self) -> usize {
        self.block_by_course.len()
    }

    /// Whether no course is mapped.
    pub fn is_empty(&self) -> bool {
        self.block_by_course.is_empty()
    }
}
