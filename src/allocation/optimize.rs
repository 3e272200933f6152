//! Phase 2: randomized swap local search.
//!
//! Hill-climbing beyond the greedy optimum: repeatedly pick two fully
//! assigned students sharing a block with different courses, tentatively
//! swap their courses, and keep the swap only when both placements still
//! pass strict eligibility and the sum of both fairness scores strictly
//! decreases. Rejected swaps are reverted silently; no hard constraint
//! is ever violated.

use rand::Rng;
use tracing::debug;

use super::{AllocationConfig, AllocationProblem, AssignmentState};
use crate::eligibility::{EligibilityEngine, Strictness};
use crate::models::{Assignment, TimeBlock};

/// Phase 2 counters.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct OptimizeReport {
    pub attempts: usize,
    pub accepted: usize,
}

/// Runs the swap local search with the injected random source.
pub(crate) fn run<R: Rng>(
    problem: &AllocationProblem,
    engine: &EligibilityEngine,
    config: &AllocationConfig,
    state: &mut AssignmentState,
    rng: &mut R,
) -> OptimizeReport {
    let blocks = problem.blocks();
    if blocks.is_empty() {
        return OptimizeReport::default();
    }

    let mut report = OptimizeReport::default();

    for _ in 0..config.max_swap_attempts {
        report.attempts += 1;

        let block = &blocks[rng.random_range(0..blocks.len())];

        // Swap partners: non-preset assignments of fully assigned students
        let candidates: Vec<(String, String)> = state
            .assignments_in_block(&block.id)
            .iter()
            .filter(|a| !a.priority.is_preset())
            .filter(|a| state.slot_count(&a.student_id) == config.slots_per_student)
            .map(|a| (a.student_id.clone(), a.course_id.clone()))
            .collect();
        if candidates.len() < 2 {
            continue;
        }

        let i = rng.random_range(0..candidates.len());
        let j = rng.random_range(0..candidates.len());
        if i == j || candidates[i].1 == candidates[j].1 {
            continue;
        }

        if try_swap(problem, engine, config, state, block, &candidates[i].0, &candidates[j].0) {
            report.accepted += 1;
            debug!(
                block = %block.id,
                a = %candidates[i].0,
                b = %candidates[j].0,
                "swap accepted"
            );
        }
    }

    report
}

/// Tentatively swaps the two students' courses in `block`.
///
/// Returns `true` when the swap was kept. On any failed check the state
/// is restored to exactly its prior contents.
fn try_swap(
    problem: &AllocationProblem,
    engine: &EligibilityEngine,
    config: &AllocationConfig,
    state: &mut AssignmentState,
    block: &TimeBlock,
    student_a: &str,
    student_b: &str,
) -> bool {
    let (Some(a), Some(b)) = (problem.student(student_a), problem.student(student_b)) else {
        return false;
    };

    let penalty = config.no_preference_penalty;
    let before =
        state.fairness_score(student_a, penalty) + state.fairness_score(student_b, penalty);

    let Some(a_old) = state.unassign(student_a, &block.id) else {
        return false;
    };
    let Some(b_old) = state.unassign(student_b, &block.id) else {
        restore(problem, state, block, &a_old);
        return false;
    };

    let (Some(course_a), Some(course_b)) = (
        problem.course(&a_old.course_id),
        problem.course(&b_old.course_id),
    ) else {
        restore(problem, state, block, &a_old);
        restore(problem, state, block, &b_old);
        return false;
    };

    // A takes B's course
    if !engine
        .check(a, course_b, block, state, Strictness::Strict)
        .is_eligible()
    {
        restore(problem, state, block, &a_old);
        restore(problem, state, block, &b_old);
        return false;
    }
    let priority_a = problem.achieved_priority(student_a, &course_b.id);
    state.assign(
        Assignment::new(student_a, &block.id, &course_b.id, priority_a),
        course_b,
        block,
    );

    // B takes A's course
    if !engine
        .check(b, course_a, block, state, Strictness::Strict)
        .is_eligible()
    {
        state.unassign(student_a, &block.id);
        restore(problem, state, block, &a_old);
        restore(problem, state, block, &b_old);
        return false;
    }
    let priority_b = problem.achieved_priority(student_b, &course_a.id);
    state.assign(
        Assignment::new(student_b, &block.id, &course_a.id, priority_b),
        course_a,
        block,
    );

    let after =
        state.fairness_score(student_a, penalty) + state.fairness_score(student_b, penalty);
    if after < before - 1e-9 {
        return true;
    }

    // No strict improvement: revert
    state.unassign(student_a, &block.id);
    state.unassign(student_b, &block.id);
    restore(problem, state, block, &a_old);
    restore(problem, state, block, &b_old);
    false
}

fn restore(
    problem: &AllocationProblem,
    state: &mut AssignmentState,
    block: &TimeBlock,
    assignment: &Assignment,
) {
    if let Some(course) = problem.course(&assignment.course_id) {
        state.assign(assignment.clone(), course, block);
    }
}
