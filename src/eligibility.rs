//! Eligibility verdicts.
//!
//! The eligibility engine answers one question: may student X occupy
//! course Y in block Z given the current allocation state? It is a pure
//! function — identical (state, inputs) always yields the identical
//! verdict — and all constraint checks produce values, never errors, so
//! bulk runs cannot abort partway through.
//!
//! Checks short-circuit in a fixed order: structural exclusions first
//! (flags, block exclusion, grade, gender), then soft constraints (day
//! conflict, category diversity, schedule full, capacity).

use std::collections::HashSet;
use std::fmt;

use crate::allocation::AssignmentState;
use crate::models::{Course, Student, TimeBlock};

/// Structural impossibility: hide the option from any UI entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Only administrators may assign this course.
    ManualAssignmentOnly,
    /// The course is a placeholder, never a real assignment target.
    Placeholder,
    /// The block is in the student's exclusion set.
    BlockExcluded,
    /// The course does not admit the student's grade.
    GradeNotAllowed,
    /// The course excludes the student's gender.
    GenderExcluded,
}

/// Soft violation: relevant to ranking and relaxation, not structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibilityReason {
    /// The student already has an assignment on this weekday.
    DayConflict,
    /// Taking this course as the last slot would leave the student's
    /// courses spanning fewer than the required distinct categories.
    CategoryDiversity,
    /// The student already holds all target slots.
    ScheduleFull,
    /// The course is at maximum capacity.
    AtCapacity,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExclusionReason::ManualAssignmentOnly => "manual assignment only",
            ExclusionReason::Placeholder => "placeholder course",
            ExclusionReason::BlockExcluded => "block excluded for student",
            ExclusionReason::GradeNotAllowed => "grade not allowed",
            ExclusionReason::GenderExcluded => "gender excluded",
        };
        f.write_str(s)
    }
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IneligibilityReason::DayConflict => "day conflict",
            IneligibilityReason::CategoryDiversity => "category diversity",
            IneligibilityReason::ScheduleFull => "schedule full",
            IneligibilityReason::AtCapacity => "course at capacity",
        };
        f.write_str(s)
    }
}

/// The verdict for a (student, course, block) candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// The placement is allowed.
    Eligible,
    /// The placement is allowed but carries a caveat (used by exchange
    /// option lists to keep full courses visible).
    EligibleWithWarning(IneligibilityReason),
    /// The placement violates a soft constraint.
    Ineligible(IneligibilityReason),
    /// The placement is structurally impossible; hide the option.
    Excluded(ExclusionReason),
}

impl Eligibility {
    /// Whether the verdict is a clean pass.
    #[inline]
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }

    /// Whether the placement may be shown as an option (clean pass or
    /// warning).
    #[inline]
    pub fn is_assignable(&self) -> bool {
        matches!(self, Eligibility::Eligible | Eligibility::EligibleWithWarning(_))
    }
}

/// Whether the category-diversity rule is enforced.
///
/// `Relaxed` is used by the final fill phase, which relaxes only this
/// rule; every other check applies in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Relaxed,
}

/// Distinct categories a student would span after adding a candidate
/// course's categories to those already held.
///
/// Isolated as a pure function because the rule only matters on the last
/// remaining slot and is easy to get wrong inside the allocation loop.
pub fn distinct_categories_after<'a>(
    held: impl IntoIterator<Item = &'a str>,
    candidate: impl IntoIterator<Item = &'a str>,
) -> usize {
    let mut set: HashSet<&str> = held.into_iter().collect();
    set.extend(candidate);
    set.len()
}

/// The eligibility engine.
///
/// Holds only the two limits the checks depend on; everything else comes
/// from the arguments, keeping [`check`](EligibilityEngine::check) pure.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityEngine {
    /// Target assignments per student.
    pub slots_per_student: usize,
    /// Minimum distinct categories across a full schedule.
    pub min_categories: usize,
}

impl EligibilityEngine {
    /// Creates an engine with the standard limits (3 slots, 2 categories).
    pub fn new() -> Self {
        Self {
            slots_per_student: 3,
            min_categories: 2,
        }
    }

    /// Creates an engine with explicit limits.
    pub fn with_limits(slots_per_student: usize, min_categories: usize) -> Self {
        Self {
            slots_per_student,
            min_categories,
        }
    }

    /// Evaluates whether `student` may occupy `course` in `block`.
    ///
    /// Checks are short-circuited in order:
    /// 1. manual-only / placeholder course → `Excluded`
    /// 2. block in the student's exclusion set → `Excluded`
    /// 3. grade restriction → `Excluded`
    /// 4. gender restriction → `Excluded`
    /// 5. weekday already occupied → `Ineligible(DayConflict)`
    /// 6. strict only: last remaining slot would break category
    ///    diversity → `Ineligible(CategoryDiversity)`
    /// 7. all target slots held → `Ineligible(ScheduleFull)`
    /// 8. course at max capacity → `Ineligible(AtCapacity)`
    pub fn check(
        &self,
        student: &Student,
        course: &Course,
        block: &TimeBlock,
        state: &AssignmentState,
        strictness: Strictness,
    ) -> Eligibility {
        if course.manual_assignment_only {
            return Eligibility::Excluded(ExclusionReason::ManualAssignmentOnly);
        }
        if course.placeholder {
            return Eligibility::Excluded(ExclusionReason::Placeholder);
        }
        if student.is_block_excluded(&block.id) {
            return Eligibility::Excluded(ExclusionReason::BlockExcluded);
        }
        if !course.admits_grade(student.grade) {
            return Eligibility::Excluded(ExclusionReason::GradeNotAllowed);
        }
        if !course.admits_gender(student.gender) {
            return Eligibility::Excluded(ExclusionReason::GenderExcluded);
        }

        if state.weekday_taken(&student.id, block.weekday) {
            return Eligibility::Ineligible(IneligibilityReason::DayConflict);
        }

        let held = state.slot_count(&student.id);

        if strictness == Strictness::Strict && held + 1 == self.slots_per_student {
            let after = distinct_categories_after(
                state.categories_for(&student.id),
                course.categories.iter().map(String::as_str),
            );
            if after < self.min_categories {
                return Eligibility::Ineligible(IneligibilityReason::CategoryDiversity);
            }
        }

        if held >= self.slots_per_student {
            return Eligibility::Ineligible(IneligibilityReason::ScheduleFull);
        }

        if state.occupancy(&course.id) >= course.max_capacity {
            return Eligibility::Ineligible(IneligibilityReason::AtCapacity);
        }

        Eligibility::Eligible
    }
}

impl Default for EligibilityEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Gender, Weekday};

    fn student(id: &str) -> Student {
        Student::new(id, 8, Gender::Female)
    }

    fn course(id: &str, category: &str, max: u32) -> Course {
        Course::new(id).with_category(category).with_capacity(0, max)
    }

    fn block(id: &str, weekday: Weekday) -> TimeBlock {
        TimeBlock::new(id, weekday, 480, 570)
    }

    fn assign(state: &mut AssignmentState, sid: &str, c: &Course, b: &TimeBlock, rank: u32) {
        state.assign(Assignment::ranked(sid, &b.id, &c.id, rank), c, b);
    }

    #[test]
    fn test_eligible_baseline() {
        let engine = EligibilityEngine::new();
        let state = AssignmentState::new();
        let v = engine.check(
            &student("S1"),
            &course("C1", "STEM", 10),
            &block("mon_am", Weekday::Monday),
            &state,
            Strictness::Strict,
        );
        assert_eq!(v, Eligibility::Eligible);
    }

    #[test]
    fn test_manual_only_and_placeholder_excluded() {
        let engine = EligibilityEngine::new();
        let state = AssignmentState::new();
        let b = block("mon_am", Weekday::Monday);

        let manual = course("C1", "STEM", 10).manual_only();
        assert_eq!(
            engine.check(&student("S1"), &manual, &b, &state, Strictness::Strict),
            Eligibility::Excluded(ExclusionReason::ManualAssignmentOnly)
        );

        let filler = course("C2", "STEM", 10).as_placeholder();
        assert_eq!(
            engine.check(&student("S1"), &filler, &b, &state, Strictness::Strict),
            Eligibility::Excluded(ExclusionReason::Placeholder)
        );
    }

    #[test]
    fn test_block_exclusion() {
        let engine = EligibilityEngine::new();
        let state = AssignmentState::new();
        let s = student("S1").with_excluded_block("mon_am");
        let v = engine.check(
            &s,
            &course("C1", "STEM", 10),
            &block("mon_am", Weekday::Monday),
            &state,
            Strictness::Strict,
        );
        assert_eq!(v, Eligibility::Excluded(ExclusionReason::BlockExcluded));
    }

    #[test]
    fn test_grade_and_gender_restrictions() {
        let engine = EligibilityEngine::new();
        let state = AssignmentState::new();
        let b = block("mon_am", Weekday::Monday);

        let seniors = course("C1", "STEM", 10).with_allowed_grade(10);
        assert_eq!(
            engine.check(&student("S1"), &seniors, &b, &state, Strictness::Strict),
            Eligibility::Excluded(ExclusionReason::GradeNotAllowed)
        );

        let no_female = course("C2", "STEM", 10).with_excluded_gender(Gender::Female);
        assert_eq!(
            engine.check(&student("S1"), &no_female, &b, &state, Strictness::Strict),
            Eligibility::Excluded(ExclusionReason::GenderExcluded)
        );
    }

    #[test]
    fn test_day_conflict() {
        let engine = EligibilityEngine::new();
        let mut state = AssignmentState::new();
        let c1 = course("C1", "STEM", 10);
        let mon_am = block("mon_am", Weekday::Monday);
        let mon_pm = block("mon_pm", Weekday::Monday);
        assign(&mut state, "S1", &c1, &mon_am, 0);

        let v = engine.check(
            &student("S1"),
            &course("C2", "Arts", 10),
            &mon_pm,
            &state,
            Strictness::Strict,
        );
        assert_eq!(v, Eligibility::Ineligible(IneligibilityReason::DayConflict));
    }

    #[test]
    fn test_category_diversity_on_last_slot_only() {
        let engine = EligibilityEngine::new();
        let mut state = AssignmentState::new();
        let stem1 = course("C1", "STEM", 10);
        let stem2 = course("C2", "STEM", 10);
        let stem3 = course("C3", "STEM", 10);
        let arts = course("C4", "Arts", 10);
        assign(&mut state, "S1", &stem1, &block("mon_am", Weekday::Monday), 0);

        // Second slot: diversity not yet enforced
        let tue = block("tue_am", Weekday::Tuesday);
        assert_eq!(
            engine.check(&student("S1"), &stem2, &tue, &state, Strictness::Strict),
            Eligibility::Eligible
        );
        assign(&mut state, "S1", &stem2, &tue, 0);

        // Last slot: a third STEM course would leave only one category
        let wed = block("wed_am", Weekday::Wednesday);
        assert_eq!(
            engine.check(&student("S1"), &stem3, &wed, &state, Strictness::Strict),
            Eligibility::Ineligible(IneligibilityReason::CategoryDiversity)
        );
        // A second category passes
        assert_eq!(
            engine.check(&student("S1"), &arts, &wed, &state, Strictness::Strict),
            Eligibility::Eligible
        );
        // Relaxed mode skips the rule
        assert_eq!(
            engine.check(&student("S1"), &stem3, &wed, &state, Strictness::Relaxed),
            Eligibility::Eligible
        );
    }

    #[test]
    fn test_schedule_full() {
        let engine = EligibilityEngine::new();
        let mut state = AssignmentState::new();
        let stem = course("C1", "STEM", 10);
        let arts = course("C2", "Arts", 10);
        let sport = course("C3", "Sports", 10);
        assign(&mut state, "S1", &stem, &block("mon_am", Weekday::Monday), 0);
        assign(&mut state, "S1", &arts, &block("tue_am", Weekday::Tuesday), 0);
        assign(&mut state, "S1", &sport, &block("wed_am", Weekday::Wednesday), 0);

        let v = engine.check(
            &student("S1"),
            &course("C4", "Media", 10),
            &block("thu_am", Weekday::Thursday),
            &state,
            Strictness::Strict,
        );
        assert_eq!(v, Eligibility::Ineligible(IneligibilityReason::ScheduleFull));
    }

    #[test]
    fn test_at_capacity() {
        let engine = EligibilityEngine::new();
        let mut state = AssignmentState::new();
        let tiny = course("C1", "STEM", 1);
        let b = block("mon_am", Weekday::Monday);
        assign(&mut state, "S1", &tiny, &b, 0);

        let v = engine.check(&student("S2"), &tiny, &b, &state, Strictness::Strict);
        assert_eq!(v, Eligibility::Ineligible(IneligibilityReason::AtCapacity));
    }

    #[test]
    fn test_verdict_is_pure() {
        let engine = EligibilityEngine::new();
        let state = AssignmentState::new();
        let s = student("S1");
        let c = course("C1", "STEM", 10);
        let b = block("mon_am", Weekday::Monday);

        let first = engine.check(&s, &c, &b, &state, Strictness::Strict);
        for _ in 0..10 {
            assert_eq!(engine.check(&s, &c, &b, &state, Strictness::Strict), first);
        }
    }

    #[test]
    fn test_distinct_categories_after() {
        assert_eq!(distinct_categories_after(["STEM"], ["STEM"]), 1);
        assert_eq!(distinct_categories_after(["STEM"], ["Arts"]), 2);
        assert_eq!(distinct_categories_after(["STEM", "Arts"], ["STEM"]), 2);
        assert_eq!(distinct_categories_after([], ["Arts", "STEM"]), 2);
        assert_eq!(distinct_categories_after([], []), 0);
    }

    #[test]
    fn test_assignability_queries() {
        assert!(Eligibility::Eligible.is_eligible());
        assert!(Eligibility::Eligible.is_assignable());
        let warn = Eligibility::EligibleWithWarning(IneligibilityReason::AtCapacity);
        assert!(!warn.is_eligible());
        assert!(warn.is_assignable());
        assert!(!Eligibility::Ineligible(IneligibilityReason::DayConflict).is_assignable());
        assert!(!Eligibility::Excluded(ExclusionReason::Placeholder).is_assignable());
    }
}
