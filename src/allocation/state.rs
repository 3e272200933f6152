//! Working allocation state.
//!
//! [`AssignmentState`] owns the allocation under construction: committed
//! assignments, course occupancy counts, and the per-student weekday and
//! category footprint. It is created fresh per run, mutated only through
//! [`assign`](AssignmentState::assign) / [`unassign`](AssignmentState::unassign),
//! and discarded after statistics.

use std::collections::{HashMap, HashSet};

use crate::models::{Assignment, Course, TimeBlock, Weekday};

#[derive(Debug, Clone)]
struct SlotRecord {
    assignment: Assignment,
    weekday: Weekday,
    categories: Vec<String>,
}

/// The mutable allocation under construction.
///
/// Weekday and category information is captured at assignment time so
/// queries never need the course or block tables again.
#[derive(Debug, Clone, Default)]
pub struct AssignmentState {
    slots: HashMap<String, Vec<SlotRecord>>,
    occupancy: HashMap<String, u32>,
}

impl AssignmentState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits an assignment.
    ///
    /// `course` and `block` must be the entities the assignment refers
    /// to; their category set and weekday are recorded for later queries.
    pub fn assign(&mut self, assignment: Assignment, course: &Course, block: &TimeBlock) {
        debug_assert_eq!(assignment.course_id, course.id);
        debug_assert_eq!(assignment.block_id, block.id);

        *self.occupancy.entry(assignment.course_id.clone()).or_insert(0) += 1;

        let mut categories: Vec<String> = course.categories.iter().cloned().collect();
        categories.sort();

        self.slots
            .entry(assignment.student_id.clone())
            .or_default()
            .push(SlotRecord {
                assignment,
                weekday: block.weekday,
                categories,
            });
    }

    /// Removes the student's assignment in the given block and returns it.
    ///
    /// Preset assignments are never removed; attempting to unassign one
    /// returns `None` and leaves the state untouched.
    pub fn unassign(&mut self, student_id: &str, block_id: &str) -> Option<Assignment> {
        let records = self.slots.get_mut(student_id)?;
        let idx = records.iter().position(|r| {
            r.assignment.block_id == block_id && !r.assignment.priority.is_preset()
        })?;
        let record = records.remove(idx);
        if let Some(count) = self.occupancy.get_mut(&record.assignment.course_id) {
            *count = count.saturating_sub(1);
        }
        Some(record.assignment)
    }

    /// Number of assignments a student currently holds.
    pub fn slot_count(&self, student_id: &str) -> usize {
        self.slots.get(student_id).map_or(0, Vec::len)
    }

    /// The student's current assignments.
    pub fn assignments_for(&self, student_id: &str) -> impl Iterator<Item = &Assignment> {
        self.slots
            .get(student_id)
            .into_iter()
            .flat_map(|records| records.iter().map(|r| &r.assignment))
    }

    /// The student's assignment in a specific block, if any.
    pub fn assignment_at(&self, student_id: &str, block_id: &str) -> Option<&Assignment> {
        self.assignments_for(student_id)
            .find(|a| a.block_id == block_id)
    }

    /// Whether the student already has an assignment on the given weekday.
    pub fn weekday_taken(&self, student_id: &str, weekday: Weekday) -> bool {
        self.slots
            .get(student_id)
            .is_some_and(|records| records.iter().any(|r| r.weekday == weekday))
    }

    /// Distinct categories across the student's current assignments.
    pub fn categories_for(&self, student_id: &str) -> HashSet<&str> {
        self.slots
            .get(student_id)
            .into_iter()
            .flat_map(|records| records.iter())
            .flat_map(|r| r.categories.iter().map(String::as_str))
            .collect()
    }

    /// Current enrollment of a course.
    pub fn occupancy(&self, course_id: &str) -> u32 {
        self.occupancy.get(course_id).copied().unwrap_or(0)
    }

    /// All assignments located in a block.
    pub fn assignments_in_block(&self, block_id: &str) -> Vec<&Assignment> {
        let mut found: Vec<&Assignment> = self
            .slots
            .values()
            .flat_map(|records| records.iter().map(|r| &r.assignment))
            .filter(|a| a.block_id == block_id)
            .collect();
        found.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        found
    }

    /// All committed assignments, sorted by (student, block) for
    /// deterministic output.
    pub fn all_assignments(&self) -> Vec<Assignment> {
        let mut all: Vec<Assignment> = self
            .slots
            .values()
            .flat_map(|records| records.iter().map(|r| r.assignment.clone()))
            .collect();
        all.sort_by(|a, b| {
            (a.student_id.as_str(), a.block_id.as_str())
                .cmp(&(b.student_id.as_str(), b.block_id.as_str()))
        });
        all
    }

    /// Total number of committed assignments.
    pub fn assignment_count(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    /// The student's fairness score: mean achieved rank across
    /// rank-bearing assignments.
    ///
    /// `Rank(r)` counts as `r`; `NoPreference` counts as
    /// `no_preference_penalty`; presets are excluded. A student with no
    /// counted assignments scores 0.0 (treated as well-served).
    pub fn fairness_score(&self, student_id: &str, no_preference_penalty: f64) -> f64 {
        let mut sum = 0.0;
        let mut counted = 0usize;
        for a in self.assignments_for(student_id) {
            match a.priority {
                crate::models::AchievedPriority::Rank(r) => {
                    sum += r as f64;
                    counted += 1;
                }
                crate::models::AchievedPriority::NoPreference => {
                    sum += no_preference_penalty;
                    counted += 1;
                }
                crate::models::AchievedPriority::Preset => {}
            }
        }
        if counted == 0 {
            0.0
        } else {
            sum / counted as f64
        }
    }
}
