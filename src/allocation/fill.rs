//! Phases 3 and 4: filling the remaining slots.
//!
//! Phase 3 places students who expressed no preferences at all, steering
//! them toward the courses with the most relative free capacity. Phase 4
//! returns to every partially assigned student and relaxes exactly one
//! rule — category diversity — trying their ranked wishes first and any
//! eligible course second. Every rejected candidate is logged with the
//! constraint that blocked it and surfaced as a diagnostic.

use tracing::debug;

use super::{AllocationConfig, AllocationProblem, AssignmentState, FillDiagnostic};
use crate::eligibility::{EligibilityEngine, Strictness};
use crate::models::{AchievedPriority, Assignment, Course, Student, TimeBlock};

/// Phase 3: students without any ranked preference.
///
/// Processed in order of (exclusion count desc, available-block count
/// asc): the students with the fewest scheduling options go first. Each
/// remaining slot takes the strictly eligible course with the highest
/// relative free capacity across the student's available blocks.
pub(crate) fn run_zero_preference(
    problem: &AllocationProblem,
    engine: &EligibilityEngine,
    config: &AllocationConfig,
    state: &mut AssignmentState,
) -> usize {
    let mut keyed: Vec<(usize, usize, &Student)> = problem
        .students()
        .iter()
        .filter(|s| !problem.has_ranked_preferences(&s.id))
        .filter(|s| state.slot_count(&s.id) < config.slots_per_student)
        .map(|s| {
            (
                s.excluded_blocks.len(),
                problem.available_block_count(s, state),
                s,
            )
        })
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.id.cmp(&b.2.id)));

    let mut placed = 0usize;
    for (_, _, student) in keyed {
        while state.slot_count(&student.id) < config.slots_per_student {
            let Some((course, block)) = most_open_course(problem, engine, state, student) else {
                break;
            };
            state.assign(
                Assignment::unpreferred(&student.id, &block.id, &course.id),
                course,
                block,
            );
            placed += 1;
        }
    }
    placed
}

/// The strictly eligible course with the highest relative free capacity
/// across the student's available blocks.
fn most_open_course<'a>(
    problem: &'a AllocationProblem,
    engine: &EligibilityEngine,
    state: &AssignmentState,
    student: &Student,
) -> Option<(&'a Course, &'a TimeBlock)> {
    let mut best: Option<(f64, &Course, &TimeBlock)> = None;

    for block in problem.available_blocks(student, state) {
        for course_id in problem.schedule().courses_in(&block.id) {
            let Some(course) = problem.course(course_id) else {
                continue;
            };
            if !engine
                .check(student, course, block, state, Strictness::Strict)
                .is_eligible()
            {
                continue;
            }
            let free = course.max_capacity.saturating_sub(state.occupancy(&course.id));
            let relative = free as f64 / course.max_capacity.max(1) as f64;
            if best.is_none_or(|(r, _, _)| relative > r) {
                best = Some((relative, course, block));
            }
        }
    }

    best.map(|(_, course, block)| (course, block))
}

/// Phase 4: relaxed fill for every partially assigned student. Only the
/// category-diversity rule is relaxed. Students without preferences are
/// covered too; for them the ranked scan is empty and the any-course
/// fallback applies directly.
pub(crate) fn run_relaxed(
    problem: &AllocationProblem,
    engine: &EligibilityEngine,
    config: &AllocationConfig,
    state: &mut AssignmentState,
    diagnostics: &mut Vec<FillDiagnostic>,
) -> usize {
    let mut placed = 0usize;

    for student in problem.students() {
        while state.slot_count(&student.id) < config.slots_per_student {
            let Some((course, block, priority)) =
                relaxed_candidate(problem, engine, state, student, diagnostics)
            else {
                break;
            };
            state.assign(
                Assignment::new(&student.id, &block.id, &course.id, priority),
                course,
                block,
            );
            placed += 1;
        }
    }
    placed
}

/// One relaxed placement: ranked preferences first (course location via
/// the authoritative mapping), then any eligible course in any remaining
/// block. Rejections are logged and collected per course.
fn relaxed_candidate<'a>(
    problem: &'a AllocationProblem,
    engine: &EligibilityEngine,
    state: &AssignmentState,
    student: &Student,
    diagnostics: &mut Vec<FillDiagnostic>,
) -> Option<(&'a Course, &'a TimeBlock, AchievedPriority)> {
    for pref in problem.preferences_for(&student.id) {
        let Some(course_id) = pref.course_id.as_deref() else {
            continue;
        };
        if state
            .assignments_for(&student.id)
            .any(|a| a.course_id == course_id)
        {
            continue;
        }
        let Some(block) = problem
            .schedule()
            .block_of(course_id)
            .and_then(|b| problem.block(b))
        else {
            continue;
        };
        let Some(course) = problem.course(course_id) else {
            continue;
        };

        let verdict = engine.check(student, course, block, state, Strictness::Relaxed);
        if verdict.is_eligible() {
            return Some((course, block, AchievedPriority::Rank(pref.rank)));
        }
        reject(student, course, block, verdict, diagnostics);
    }

    for block in problem.available_blocks(student, state) {
        for course_id in problem.schedule().courses_in(&block.id) {
            let Some(course) = problem.course(course_id) else {
                continue;
            };
            let verdict = engine.check(student, course, block, state, Strictness::Relaxed);
            if verdict.is_eligible() {
                let priority = problem.achieved_priority(&student.id, course_id);
                return Some((course, block, priority));
            }
            reject(student, course, block, verdict, diagnostics);
        }
    }

    None
}

fn reject(
    student: &Student,
    course: &Course,
    block: &TimeBlock,
    verdict: crate::eligibility::Eligibility,
    diagnostics: &mut Vec<FillDiagnostic>,
) {
    debug!(
        student = %student.id,
        course = %course.id,
        block = %block.id,
        ?verdict,
        "relaxed fill candidate rejected"
    );
    diagnostics.push(FillDiagnostic {
        student_id: student.id.clone(),
        block_id: block.id.clone(),
        course_id: course.id.clone(),
        verdict,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::{Eligibility, IneligibilityReason};
    use crate::models::{Course, CourseSchedule, Gender, Preference, Student, TimeBlock, Weekday};

    fn block(id: &str, weekday: Weekday) -> TimeBlock {
        TimeBlock::new(id, weekday, 480, 570)
    }

    fn course(id: &str, category: &str, max: u32) -> Course {
        Course::new(id).with_category(category).with_capacity(0, max)
    }

    #[test]
    fn test_zero_preference_prefers_most_open_course() {
        // Two courses in one block: A nearly full (1/10 free), B empty
        let problem = AllocationProblem::new(
            vec![
                Student::new("Z", 8, Gender::Female),
                Student::new("F1", 8, Gender::Male),
            ],
            vec![block("b1", Weekday::Monday)],
            vec![course("A", "STEM", 2), course("B", "Arts", 10)],
            CourseSchedule::new()
                .with_assignment("A", "b1")
                .with_assignment("B", "b1"),
            vec![],
            vec![],
        );
        let engine = EligibilityEngine::new();
        let config = AllocationConfig::default();
        let mut state = AssignmentState::new();
        state.assign(
            Assignment::unpreferred("F1", "b1", "A"),
            problem.course("A").unwrap(),
            problem.block("b1").unwrap(),
        );

        run_zero_preference(&problem, &engine, &config, &mut state);

        // Z goes to B: 10/10 free beats A's 1/2
        let a = state.assignment_at("Z", "b1").unwrap();
        assert_eq!(a.course_id, "B");
        assert_eq!(a.priority, AchievedPriority::NoPreference);
    }

    #[test]
    fn test_zero_preference_fills_multiple_slots() {
        let problem = AllocationProblem::new(
            vec![Student::new("Z", 8, Gender::Female)],
            vec![
                block("b1", Weekday::Monday),
                block("b2", Weekday::Tuesday),
                block("b3", Weekday::Wednesday),
            ],
            vec![
                course("A", "STEM", 10),
                course("B", "Arts", 10),
                course("C", "Sports", 10),
            ],
            CourseSchedule::new()
                .with_assignment("A", "b1")
                .with_assignment("B", "b2")
                .with_assignment("C", "b3"),
            vec![],
            vec![],
        );
        let engine = EligibilityEngine::new();
        let config = AllocationConfig::default();
        let mut state = AssignmentState::new();

        let placed = run_zero_preference(&problem, &engine, &config, &mut state);

        assert_eq!(placed, 3);
        assert_eq!(state.slot_count("Z"), 3);
    }

    #[test]
    fn test_relaxed_fill_ignores_category_diversity() {
        // All three courses share one category; strict eligibility would
        // refuse the last slot, the relaxed phase fills it.
        let problem = AllocationProblem::new(
            vec![Student::new("S", 8, Gender::Female)],
            vec![
                block("b1", Weekday::Monday),
                block("b2", Weekday::Tuesday),
                block("b3", Weekday::Wednesday),
            ],
            vec![
                course("A", "STEM", 10),
                course("B", "STEM", 10),
                course("C", "STEM", 10),
            ],
            CourseSchedule::new()
                .with_assignment("A", "b1")
                .with_assignment("B", "b2")
                .with_assignment("C", "b3"),
            vec![
                Preference::ranked("S", "b1", "A", 0),
                Preference::ranked("S", "b2", "B", 1),
                Preference::ranked("S", "b3", "C", 2),
            ],
            vec![],
        );
        let engine = EligibilityEngine::new();
        let config = AllocationConfig::default();
        let mut state = AssignmentState::new();
        state.assign(
            Assignment::ranked("S", "b1", "A", 0),
            problem.course("A").unwrap(),
            problem.block("b1").unwrap(),
        );
        state.assign(
            Assignment::ranked("S", "b2", "B", 1),
            problem.course("B").unwrap(),
            problem.block("b2").unwrap(),
        );

        let mut diagnostics = Vec::new();
        let placed = run_relaxed(&problem, &engine, &config, &mut state, &mut diagnostics);

        assert_eq!(placed, 1);
        let a = state.assignment_at("S", "b3").unwrap();
        assert_eq!(a.course_id, "C");
        assert_eq!(a.priority, AchievedPriority::Rank(2));
    }

    #[test]
    fn test_relaxed_fill_covers_students_without_preferences() {
        // All courses share one category: the strict fill stops at two
        // slots, the relaxed pass must still complete the schedule even
        // though the student expressed no preferences.
        let problem = AllocationProblem::new(
            vec![Student::new("Z", 8, Gender::Female)],
            vec![
                block("b1", Weekday::Monday),
                block("b2", Weekday::Tuesday),
                block("b3", Weekday::Wednesday),
            ],
            vec![
                course("A", "STEM", 10),
                course("B", "STEM", 10),
                course("C", "STEM", 10),
            ],
            CourseSchedule::new()
                .with_assignment("A", "b1")
                .with_assignment("B", "b2")
                .with_assignment("C", "b3"),
            vec![],
            vec![],
        );
        let engine = EligibilityEngine::new();
        let config = AllocationConfig::default();
        let mut state = AssignmentState::new();

        run_zero_preference(&problem, &engine, &config, &mut state);
        assert_eq!(state.slot_count("Z"), 2);

        let mut diagnostics = Vec::new();
        let placed = run_relaxed(&problem, &engine, &config, &mut state, &mut diagnostics);

        assert_eq!(placed, 1);
        assert_eq!(state.slot_count("Z"), 3);
        assert!(state
            .assignments_for("Z")
            .all(|a| a.priority == AchievedPriority::NoPreference));
    }

    #[test]
    fn test_relaxed_fill_falls_back_to_any_course() {
        // The only preferred course is full; another course in a free
        // block is still open.
        let problem = AllocationProblem::new(
            vec![
                Student::new("S", 8, Gender::Female),
                Student::new("T", 8, Gender::Male),
            ],
            vec![block("b1", Weekday::Monday), block("b2", Weekday::Tuesday)],
            vec![course("A", "STEM", 1), course("B", "Arts", 10)],
            CourseSchedule::new()
                .with_assignment("A", "b1")
                .with_assignment("B", "b2"),
            vec![Preference::ranked("S", "b1", "A", 0)],
            vec![],
        );
        let engine = EligibilityEngine::new();
        let config = AllocationConfig::default();
        let mut state = AssignmentState::new();
        state.assign(
            Assignment::unpreferred("T", "b1", "A"),
            problem.course("A").unwrap(),
            problem.block("b1").unwrap(),
        );

        let mut diagnostics = Vec::new();
        run_relaxed(&problem, &engine, &config, &mut state, &mut diagnostics);

        let a = state.assignment_at("S", "b2").unwrap();
        assert_eq!(a.course_id, "B");
        assert_eq!(a.priority, AchievedPriority::NoPreference);

        // The full preferred course left a capacity diagnostic
        assert!(diagnostics.iter().any(|d| {
            d.student_id == "S"
                && d.course_id == "A"
                && d.verdict == Eligibility::Ineligible(IneligibilityReason::AtCapacity)
        }));
    }

    #[test]
    fn test_relaxed_fill_reports_partial_when_nothing_fits() {
        // Single block, single full course: the student stays partial
        // and the rejection reason is preserved.
        let problem = AllocationProblem::new(
            vec![
                Student::new("S", 8, Gender::Female),
                Student::new("T", 8, Gender::Male),
            ],
            vec![block("b1", Weekday::Monday)],
            vec![course("A", "STEM", 1)],
            CourseSchedule::new().with_assignment("A", "b1"),
            vec![Preference::ranked("S", "b1", "A", 0)],
            vec![],
        );
        let engine = EligibilityEngine::new();
        let config = AllocationConfig::default();
        let mut state = AssignmentState::new();
        state.assign(
            Assignment::unpreferred("T", "b1", "A"),
            problem.course("A").unwrap(),
            problem.block("b1").unwrap(),
        );

        let mut diagnostics = Vec::new();
        let placed = run_relaxed(&problem, &engine, &config, &mut state, &mut diagnostics);

        assert_eq!(placed, 0);
        assert_eq!(state.slot_count("S"), 0);
        assert!(!diagnostics.is_empty());
    }
}
