//! Indexed input context for an allocation run.

use std::collections::HashMap;

use crate::allocation::AssignmentState;
use crate::models::{
    AchievedPriority, Course, CourseSchedule, Preference, PresetAssignment, Student, TimeBlock,
};

/// The immutable inputs of one allocation run, indexed for lookup.
///
/// Built once from plain collections and passed by reference to every
/// phase. Blocks are kept in natural schedule order; each student's
/// preferences are kept sorted by rank.
#[derive(Debug, Clone)]
pub struct AllocationProblem {
    students: Vec<Student>,
    blocks: Vec<TimeBlock>,
    courses: HashMap<String, Course>,
    schedule: CourseSchedule,
    preferences: HashMap<String, Vec<Preference>>,
    presets: Vec<PresetAssignment>,
    block_index: HashMap<String, usize>,
    student_index: HashMap<String, usize>,
}

impl AllocationProblem {
    /// Builds the indexed problem.
    ///
    /// Callers are expected to have run
    /// [`validate_input`](crate::validation::validate_input) first;
    /// dangling references are skipped at use sites, never panicked on.
    pub fn new(
        students: Vec<Student>,
        mut blocks: Vec<TimeBlock>,
        courses: Vec<Course>,
        schedule: CourseSchedule,
        preferences: Vec<Preference>,
        presets: Vec<PresetAssignment>,
    ) -> Self {
        blocks.sort();
        let block_index = blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.clone(), i))
            .collect();

        let student_index = students
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();

        let courses = courses.into_iter().map(|c| (c.id.clone(), c)).collect();

        let mut grouped: HashMap<String, Vec<Preference>> = HashMap::new();
        for p in preferences {
            grouped.entry(p.student_id.clone()).or_default().push(p);
        }
        for prefs in grouped.values_mut() {
            prefs.sort_by_key(|p| p.rank);
        }

        Self {
            students,
            blocks,
            courses,
            schedule,
            preferences: grouped,
            presets,
            block_index,
            student_index,
        }
    }

    /// All students.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// All blocks, in natural schedule order.
    pub fn blocks(&self) -> &[TimeBlock] {
        &self.blocks
    }

    /// Looks up a student by ID.
    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.student_index.get(student_id).map(|&i| &self.students[i])
    }

    /// Looks up a course by ID.
    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.get(course_id)
    }

    /// Looks up a block by ID.
    pub fn block(&self, block_id: &str) -> Option<&TimeBlock> {
        self.block_index.get(block_id).map(|&i| &self.blocks[i])
    }

    /// The authoritative course→block mapping.
    pub fn schedule(&self) -> &CourseSchedule {
        &self.schedule
    }

    /// Preset assignments.
    pub fn presets(&self) -> &[PresetAssignment] {
        &self.presets
    }

    /// The student's preferences, sorted by rank. Empty if none.
    pub fn preferences_for(&self, student_id: &str) -> &[Preference] {
        self.preferences
            .get(student_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the student expressed any real (non-pause) preference.
    pub fn has_ranked_preferences(&self, student_id: &str) -> bool {
        self.preferences_for(student_id).iter().any(|p| !p.is_pause())
    }

    /// Blocks the student could still receive an assignment in: not in
    /// the exclusion set and on a weekday without an assignment yet.
    pub fn available_blocks<'a>(
        &'a self,
        student: &Student,
        state: &AssignmentState,
    ) -> Vec<&'a TimeBlock> {
        self.blocks
            .iter()
            .filter(|b| !student.is_block_excluded(&b.id))
            .filter(|b| !state.weekday_taken(&student.id, b.weekday))
            .collect()
    }

    /// Number of blocks still available to the student.
    pub fn available_block_count(&self, student: &Student, state: &AssignmentState) -> usize {
        self.available_blocks(student, state).len()
    }

    /// The priority the student would achieve when placed into `course_id`.
    ///
    /// Matches by course only: the preference's embedded block may be
    /// stale, the course location is authoritative. Multiple matching
    /// preferences resolve to the lowest rank.
    pub fn achieved_priority(&self, student_id: &str, course_id: &str) -> AchievedPriority {
        self.preferences_for(student_id)
            .iter()
            .filter(|p| p.course_id.as_deref() == Some(course_id))
            .map(|p| p.rank)
            .min()
            .map_or(AchievedPriority::NoPreference, AchievedPriority::Rank)
    }
}
