//! Phase 1: fairness-ordered greedy assignment.
//!
//! Repeated passes over students with ranked preferences and open slots.
//! Each pass commits at most one assignment per student — the best
//! candidate across all available blocks — so capacity contention is
//! resolved rank by rank rather than student by student. The pass order
//! puts the most constrained and worst served students first.

use tracing::debug;

use super::{AllocationConfig, AllocationProblem, AssignmentState};
use crate::eligibility::{EligibilityEngine, Strictness};
use crate::models::{Assignment, Course, Student, TimeBlock};

/// Phase 1 counters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GreedyReport {
    pub passes: usize,
    pub committed: usize,
}

/// Runs the greedy phase. Stops when a full pass commits nothing or the
/// pass cap is reached.
pub(crate) fn run(
    problem: &AllocationProblem,
    engine: &EligibilityEngine,
    config: &AllocationConfig,
    state: &mut AssignmentState,
) -> GreedyReport {
    let mut passes = 0usize;
    let mut committed = 0usize;

    for _ in 0..config.max_greedy_passes {
        passes += 1;
        let order = pass_order(problem, config, state);
        let mut committed_this_pass = 0usize;

        for student in order {
            if state.slot_count(&student.id) >= config.slots_per_student {
                continue;
            }
            if let Some((course, block, rank)) = best_candidate(problem, engine, state, student) {
                state.assign(
                    Assignment::ranked(&student.id, &block.id, &course.id, rank),
                    course,
                    block,
                );
                committed_this_pass += 1;
            }
        }

        debug!(pass = passes, committed = committed_this_pass, "greedy pass");
        committed += committed_this_pass;
        if committed_this_pass == 0 {
            break;
        }
    }

    GreedyReport { passes, committed }
}

/// Students with ranked preferences and open slots, sorted by
/// (remaining slots asc, available-block count asc, fairness desc):
/// most-constrained-first, worst-served-first. Student ID breaks the
/// final tie deterministically.
fn pass_order<'a>(
    problem: &'a AllocationProblem,
    config: &AllocationConfig,
    state: &AssignmentState,
) -> Vec<&'a Student> {
    let mut keyed: Vec<(usize, usize, f64, &Student)> = problem
        .students()
        .iter()
        .filter(|s| state.slot_count(&s.id) < config.slots_per_student)
        .filter(|s| problem.has_ranked_preferences(&s.id))
        .map(|s| {
            let remaining = config.slots_per_student - state.slot_count(&s.id);
            let available = problem.available_block_count(s, state);
            let fairness = state.fairness_score(&s.id, config.no_preference_penalty);
            (remaining, available, fairness, s)
        })
        .collect();

    keyed.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.cmp(&b.1))
            .then(b.2.total_cmp(&a.2))
            .then(a.3.id.cmp(&b.3.id))
    });

    keyed.into_iter().map(|(_, _, _, s)| s).collect()
}

/// The best candidate across all available blocks.
///
/// Per block (schedule order), the first preference whose course is
/// located there — via the authoritative mapping — and passes strict
/// eligibility becomes the block's candidate; the lowest rank across
/// blocks wins, and a rank-0 hit returns immediately.
fn best_candidate<'a>(
    problem: &'a AllocationProblem,
    engine: &EligibilityEngine,
    state: &AssignmentState,
    student: &Student,
) -> Option<(&'a Course, &'a TimeBlock, u32)> {
    let mut best: Option<(&Course, &TimeBlock, u32)> = None;

    for block in problem.available_blocks(student, state) {
        for pref in problem.preferences_for(&student.id) {
            let Some(course_id) = pref.course_id.as_deref() else {
                continue;
            };
            if problem.schedule().block_of(course_id) != Some(block.id.as_str()) {
                continue;
            }
            let Some(course) = problem.course(course_id) else {
                continue;
            };
            if !engine
                .check(student, course, block, state, Strictness::Strict)
                .is_eligible()
            {
                continue;
            }

            if pref.rank == 0 {
                return Some((course, block, 0));
            }
            if best.is_none_or(|(_, _, r)| pref.rank < r) {
                best = Some((course, block, pref.rank));
            }
            // First passing course decides this block
            break;
        }
    }

    best
}
