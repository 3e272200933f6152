//! Four-phase batch allocation.
//!
//! Fills each student's weekly slots in phases:
//!
//! 0. Seed preset assignments (immutable, counted toward all footprints).
//! 1. Fairness-ordered greedy assignment over ranked preferences.
//! 2. Randomized swap local search (hill-climbing on fairness sums).
//! 3. Capacity-driven fill for students without preferences.
//! 4. Relaxed fill for partially assigned students (category rule off).
//!
//! The run is single-threaded and bounded by fixed iteration caps, so it
//! always terminates. Infeasibility is reported, never raised: the
//! outcome carries partial/unassigned counts and per-rejection
//! diagnostics for the caller to act on.

mod fill;
mod greedy;
mod optimize;
mod problem;
mod state;

pub use problem::AllocationProblem;
pub use state::AssignmentState;

use std::collections::HashMap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::eligibility::{Eligibility, EligibilityEngine};
use crate::models::{Assignment, FillState};
use crate::stats::AllocationStats;

/// Configuration for an allocation run.
///
/// # Examples
///
/// ```
/// use elective_alloc::allocation::AllocationConfig;
///
/// let config = AllocationConfig::default()
///     .with_max_greedy_passes(50)
///     .with_max_swap_attempts(1000)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone)]
pub struct AllocationConfig {
    /// Maximum outer passes of the greedy phase.
    pub max_greedy_passes: usize,
    /// Maximum randomized swap attempts in the local-search phase.
    pub max_swap_attempts: usize,
    /// Target assignments per student.
    pub slots_per_student: usize,
    /// Minimum distinct categories across a full schedule.
    pub min_categories: usize,
    /// Fairness rank charged for a placement without a matching
    /// preference. Must dominate any realistic rank.
    pub no_preference_penalty: f64,
    /// Random seed for reproducibility. `None` = entropy-seeded.
    pub seed: Option<u64>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_greedy_passes: 50,
            max_swap_attempts: 1000,
            slots_per_student: 3,
            min_categories: 2,
            no_preference_penalty: 10.0,
            seed: None,
        }
    }
}

impl AllocationConfig {
    pub fn with_max_greedy_passes(mut self, n: usize) -> Self {
        self.max_greedy_passes = n;
        self
    }

    pub fn with_max_swap_attempts(mut self, n: usize) -> Self {
        self.max_swap_attempts = n;
        self
    }

    pub fn with_slots_per_student(mut self, n: usize) -> Self {
        self.slots_per_student = n;
        self
    }

    pub fn with_min_categories(mut self, n: usize) -> Self {
        self.min_categories = n;
        self
    }

    pub fn with_no_preference_penalty(mut self, penalty: f64) -> Self {
        self.no_preference_penalty = penalty;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.slots_per_student == 0 {
            return Err("slots_per_student must be positive".into());
        }
        if self.min_categories == 0 {
            return Err("min_categories must be positive".into());
        }
        if self.no_preference_penalty < 0.0 {
            return Err("no_preference_penalty must be non-negative".into());
        }
        Ok(())
    }
}

/// A candidate rejected during the relaxed fill phase, with the
/// constraint that blocked it.
#[derive(Debug, Clone, PartialEq)]
pub struct FillDiagnostic {
    pub student_id: String,
    pub block_id: String,
    pub course_id: String,
    pub verdict: Eligibility,
}

/// The result of one allocation run.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// All committed assignments, presets included.
    pub assignments: Vec<Assignment>,
    /// Per-student fill state.
    pub fill_states: HashMap<String, FillState>,
    /// Rejected candidates from the relaxed fill phase.
    pub diagnostics: Vec<FillDiagnostic>,
    /// Run statistics.
    pub stats: AllocationStats,
    /// Greedy passes executed.
    pub greedy_passes: usize,
    /// Assignments committed by the greedy phase.
    pub greedy_committed: usize,
    /// Swap attempts made by the local-search phase.
    pub swap_attempts: usize,
    /// Swaps accepted by the local-search phase.
    pub swaps_accepted: usize,
}

/// The four-phase batch allocator.
///
/// One [`run`](Allocator::run) exclusively owns one [`AssignmentState`];
/// no state is shared across runs. The caller must guarantee a single
/// active run per scheduling period.
#[derive(Debug, Clone, Default)]
pub struct Allocator {
    config: AllocationConfig,
}

impl Allocator {
    /// Creates an allocator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator with the given configuration.
    pub fn with_config(config: AllocationConfig) -> Self {
        Self { config }
    }

    /// Runs the full allocation.
    pub fn run(&self, problem: &AllocationProblem) -> AllocationOutcome {
        self.config.validate().expect("invalid AllocationConfig");
        let start = Instant::now();

        let engine =
            EligibilityEngine::with_limits(self.config.slots_per_student, self.config.min_categories);
        let mut state = AssignmentState::new();

        // Phase 0: seed presets
        let mut presets_seeded = 0usize;
        for preset in problem.presets() {
            match (
                problem.course(&preset.course_id),
                problem.block(&preset.block_id),
            ) {
                (Some(course), Some(block)) => {
                    state.assign(
                        Assignment::preset(&preset.student_id, &preset.block_id, &preset.course_id),
                        course,
                        block,
                    );
                    presets_seeded += 1;
                }
                _ => warn!(
                    student = %preset.student_id,
                    course = %preset.course_id,
                    block = %preset.block_id,
                    "preset references unknown course or block, skipped"
                ),
            }
        }
        debug!(presets_seeded, "phase 0 complete");

        // Phase 1: fairness-ordered greedy
        let greedy = greedy::run(problem, &engine, &self.config, &mut state);
        debug!(
            passes = greedy.passes,
            committed = greedy.committed,
            "phase 1 complete"
        );

        // Phase 2: randomized swap local search
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let optimize = optimize::run(problem, &engine, &self.config, &mut state, &mut rng);
        debug!(
            attempts = optimize.attempts,
            accepted = optimize.accepted,
            "phase 2 complete"
        );

        // Phase 3: students without preferences
        let zero_placed = fill::run_zero_preference(problem, &engine, &self.config, &mut state);
        debug!(placed = zero_placed, "phase 3 complete");

        // Phase 4: relaxed fill for partially assigned students
        let mut diagnostics = Vec::new();
        let relaxed_placed =
            fill::run_relaxed(problem, &engine, &self.config, &mut state, &mut diagnostics);
        debug!(
            placed = relaxed_placed,
            rejected = diagnostics.len(),
            "phase 4 complete"
        );

        let fill_states: HashMap<String, FillState> = problem
            .students()
            .iter()
            .map(|s| {
                (
                    s.id.clone(),
                    FillState::from_count(state.slot_count(&s.id), self.config.slots_per_student),
                )
            })
            .collect();

        let stats = AllocationStats::calculate(
            &state,
            problem,
            self.config.slots_per_student,
            self.config.no_preference_penalty,
            start.elapsed(),
        );

        AllocationOutcome {
            assignments: state.all_assignments(),
            fill_states,
            diagnostics,
            stats,
            greedy_passes: greedy.passes,
            greedy_committed: greedy.committed,
            swap_attempts: optimize.attempts,
            swaps_accepted: optimize.accepted,
        }
    }
}
