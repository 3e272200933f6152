//! Run statistics.
//!
//! Summarizes a finished allocation: fill-state counts, the distribution
//! of achieved priorities, and population fairness figures. Computed once
//! from the final state; nothing here feeds back into the algorithms.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::allocation::{AllocationProblem, AssignmentState};
use crate::models::AchievedPriority;

/// Statistics over one allocation run.
///
/// The priority histogram is keyed by 1-based priority: a student who
/// received their top-ranked wish counts under key 1. Preset assignments
/// and placements without a matching preference are not part of the
/// histogram; the latter enter the fairness figures through the
/// configured penalty instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationStats {
    /// Students holding all of their slots.
    pub fully_assigned: usize,
    /// Students holding some, but not all, slots.
    pub partially_assigned: usize,
    /// Students holding no assignment at all.
    pub unassigned: usize,
    /// 1-based priority → number of assignments achieved at it.
    pub priority_histogram: BTreeMap<u32, usize>,
    /// Mean 1-based priority across histogram entries. 0.0 if empty.
    pub mean_priority: f64,
    /// Mean fairness score across fully assigned students.
    pub fairness_mean: f64,
    /// Population standard deviation of the same scores.
    pub fairness_std_dev: f64,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl AllocationStats {
    /// Computes the statistics for a finished state.
    pub fn calculate(
        state: &AssignmentState,
        problem: &AllocationProblem,
        slots_per_student: usize,
        no_preference_penalty: f64,
        duration: Duration,
    ) -> Self {
        let mut fully_assigned = 0usize;
        let mut partially_assigned = 0usize;
        let mut unassigned = 0usize;
        let mut fairness_scores = Vec::new();

        for student in problem.students() {
            let count = state.slot_count(&student.id);
            if count >= slots_per_student {
                fully_assigned += 1;
                fairness_scores.push(state.fairness_score(&student.id, no_preference_penalty));
            } else if count > 0 {
                partially_assigned += 1;
            } else {
                unassigned += 1;
            }
        }

        let mut priority_histogram: BTreeMap<u32, usize> = BTreeMap::new();
        for student in problem.students() {
            for assignment in state.assignments_for(&student.id) {
                if let AchievedPriority::Rank(rank) = assignment.priority {
                    *priority_histogram.entry(rank + 1).or_insert(0) += 1;
                }
            }
        }

        let histogram_total: usize = priority_histogram.values().sum();
        let mean_priority = if histogram_total == 0 {
            0.0
        } else {
            let weighted: f64 = priority_histogram
                .iter()
                .map(|(&priority, &count)| priority as f64 * count as f64)
                .sum();
            weighted / histogram_total as f64
        };

        let (fairness_mean, fairness_std_dev) = mean_and_std_dev(&fairness_scores);

        Self {
            fully_assigned,
            partially_assigned,
            unassigned,
            priority_histogram,
            mean_priority,
            fairness_mean,
            fairness_std_dev,
            duration,
        }
    }
}

/// Mean and population standard deviation. Empty input yields (0.0, 0.0).
fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Assignment, Course, CourseSchedule, Gender, Preference, Student, TimeBlock, Weekday,
    };

    fn sample_problem() -> AllocationProblem {
        let students = vec![
            Student::new("S1", 8, Gender::Female),
            Student::new("S2", 8, Gender::Male),
            Student::new("S3", 8, Gender::Diverse),
        ];
        let blocks = vec![
            TimeBlock::new("mon", Weekday::Monday, 480, 570),
            TimeBlock::new("tue", Weekday::Tuesday, 480, 570),
        ];
        let courses = vec![
            Course::new("A").with_category("STEM").with_capacity(0, 10),
            Course::new("B").with_category("Arts").with_capacity(0, 10),
        ];
        let schedule = CourseSchedule::new()
            .with_assignment("A", "mon")
            .with_assignment("B", "tue");
        let preferences = vec![
            Preference::ranked("S1", "mon", "A", 0),
            Preference::ranked("S1", "tue", "B", 2),
        ];
        AllocationProblem::new(students, blocks, courses, schedule, preferences, vec![])
    }

    #[test]
    fn test_fill_state_counts() {
        let problem = sample_problem();
        let mut state = AssignmentState::new();
        // S1 full (2 slots), S2 partial (1 slot), S3 unassigned
        state.assign(
            Assignment::ranked("S1", "mon", "A", 0),
            problem.course("A").unwrap(),
            problem.block("mon").unwrap(),
        );
        state.assign(
            Assignment::ranked("S1", "tue", "B", 2),
            problem.course("B").unwrap(),
            problem.block("tue").unwrap(),
        );
        state.assign(
            Assignment::unpreferred("S2", "mon", "A"),
            problem.course("A").unwrap(),
            problem.block("mon").unwrap(),
        );

        let stats = AllocationStats::calculate(&state, &problem, 2, 10.0, Duration::ZERO);

        assert_eq!(stats.fully_assigned, 1);
        assert_eq!(stats.partially_assigned, 1);
        assert_eq!(stats.unassigned, 1);
    }

    #[test]
    fn test_histogram_is_one_based_and_skips_presets() {
        let problem = sample_problem();
        let mut state = AssignmentState::new();
        state.assign(
            Assignment::ranked("S1", "mon", "A", 0),
            problem.course("A").unwrap(),
            problem.block("mon").unwrap(),
        );
        state.assign(
            Assignment::ranked("S1", "tue", "B", 2),
            problem.course("B").unwrap(),
            problem.block("tue").unwrap(),
        );
        state.assign(
            Assignment::preset("S2", "mon", "A"),
            problem.course("A").unwrap(),
            problem.block("mon").unwrap(),
        );
        state.assign(
            Assignment::unpreferred("S3", "mon", "A"),
            problem.course("A").unwrap(),
            problem.block("mon").unwrap(),
        );

        let stats = AllocationStats::calculate(&state, &problem, 2, 10.0, Duration::ZERO);

        // Rank 0 → key 1, rank 2 → key 3; preset and unpreferred absent
        assert_eq!(stats.priority_histogram.get(&1), Some(&1));
        assert_eq!(stats.priority_histogram.get(&3), Some(&1));
        assert_eq!(stats.priority_histogram.values().sum::<usize>(), 2);
        assert!((stats.mean_priority - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_fairness_covers_fully_assigned_only() {
        let problem = sample_problem();
        let mut state = AssignmentState::new();
        // S1 full with ranks 0 and 2 → score 1.0
        state.assign(
            Assignment::ranked("S1", "mon", "A", 0),
            problem.course("A").unwrap(),
            problem.block("mon").unwrap(),
        );
        state.assign(
            Assignment::ranked("S1", "tue", "B", 2),
            problem.course("B").unwrap(),
            problem.block("tue").unwrap(),
        );
        // S2 partial with the penalty score; must not enter the figures
        state.assign(
            Assignment::unpreferred("S2", "mon", "A"),
            problem.course("A").unwrap(),
            problem.block("mon").unwrap(),
        );

        let stats = AllocationStats::calculate(&state, &problem, 2, 10.0, Duration::ZERO);

        assert!((stats.fairness_mean - 1.0).abs() < 1e-10);
        assert!((stats.fairness_std_dev - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_state() {
        let problem = sample_problem();
        let state = AssignmentState::new();
        let stats = AllocationStats::calculate(&state, &problem, 2, 10.0, Duration::ZERO);

        assert_eq!(stats.unassigned, 3);
        assert!(stats.priority_histogram.is_empty());
        assert_eq!(stats.mean_priority, 0.0);
        assert_eq!(stats.fairness_mean, 0.0);
    }

    #[test]
    fn test_std_dev_population() {
        let (mean, std) = mean_and_std_dev(&[1.0, 3.0]);
        assert!((mean - 2.0).abs() < 1e-10);
        assert!((std - 1.0).abs() < 1e-10);
    }
}
