//! Multi-round exchange resolution.
//!
//! After the initial allocation, students may offer one of their
//! assignments up for a more desired course. Resolution is batched:
//! requests are ordered worst-served-first and processed in repeated
//! passes, so an exchange that frees a seat can unblock another request
//! in a later pass. Every executed exchange is recorded as an event;
//! requests that stay pending after the final pass are closed as
//! unfulfillable with exactly one notification event each.
//!
//! The resolver has no internal locking; callers serialize runs per
//! scheduling period.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::allocation::{AllocationProblem, AssignmentState};
use crate::eligibility::{Eligibility, EligibilityEngine, IneligibilityReason, Strictness};
use crate::models::{
    AchievedPriority, Assignment, ExchangeEvent, ExchangeRequest, ExchangeStatus,
};

/// Configuration for one resolution run.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Maximum full passes over the pending requests.
    pub max_rounds: usize,
    /// Target assignments per student.
    pub slots_per_student: usize,
    /// Minimum distinct categories across a full schedule.
    pub min_categories: usize,
    /// Fairness rank charged for a placement without a matching
    /// preference.
    pub no_preference_penalty: f64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            slots_per_student: 3,
            min_categories: 2,
            no_preference_penalty: 10.0,
        }
    }
}

impl ExchangeConfig {
    pub fn with_max_rounds(mut self, n: usize) -> Self {
        self.max_rounds = n;
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

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_rounds == 0 {
            return Err("max_rounds must be positive".into());
        }
        if self.slots_per_student == 0 {
            return Err("slots_per_student must be positive".into());
        }
        Ok(())
    }
}

/// A request rejected at the boundary, before any pass runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeInputError {
    #[error("request {0} is not pending")]
    NotPending(String),
    #[error("duplicate request id {0}")]
    DuplicateRequestId(String),
    #[error("request {request_id}: student {student_id} holds no matching assignment in block {block_id}")]
    UnknownOfferedAssignment {
        request_id: String,
        student_id: String,
        block_id: String,
    },
    #[error("request {0} offers a preset assignment, which is never altered")]
    PresetOffered(String),
    #[error("student {student_id} holds no assignment in block {block_id}")]
    AssignmentNotHeld {
        student_id: String,
        block_id: String,
    },
    #[error("student {student_id}'s assignment in block {block_id} is preset and cannot be offered")]
    PresetHeld {
        student_id: String,
        block_id: String,
    },
}

/// The result of one resolution run.
#[derive(Debug, Clone)]
pub struct ExchangeSummary {
    /// Requests processed.
    pub total: usize,
    /// Requests fulfilled.
    pub fulfilled: usize,
    /// Requests closed as unfulfillable.
    pub unfulfillable: usize,
    /// Passes that fulfilled at least one request.
    pub rounds: usize,
    /// Audit events in execution order, notifications last.
    pub events: Vec<ExchangeEvent>,
    /// All requests with their final status.
    pub requests: Vec<ExchangeRequest>,
}

/// A course the student could request in exchange for an offered
/// assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeOption {
    pub course_id: String,
    pub block_id: String,
    /// `Eligible`, or `EligibleWithWarning(AtCapacity)` for a course
    /// currently full.
    pub verdict: Eligibility,
}

/// The batch exchange resolver.
#[derive(Debug, Clone, Default)]
pub struct ExchangeResolver {
    config: ExchangeConfig,
}

impl ExchangeResolver {
    /// Creates a resolver with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with the given configuration.
    pub fn with_config(config: ExchangeConfig) -> Self {
        Self { config }
    }

    /// Resolves a batch of pending requests against the current
    /// assignments.
    ///
    /// Requests are ordered by the requester's fairness score,
    /// descending, so the worst-served students exchange first. Each
    /// pass scans the still-pending requests; per request the desired
    /// courses are tried in priority order under a hypothetical state
    /// with the offered assignment removed. Passes repeat until one
    /// fulfills nothing or the round cap is reached.
    pub fn resolve(
        &self,
        problem: &AllocationProblem,
        current: &[Assignment],
        requests: Vec<ExchangeRequest>,
    ) -> Result<ExchangeSummary, ExchangeInputError> {
        self.config.validate().expect("invalid ExchangeConfig");

        let mut requests = requests;
        self.check_boundary(current, &requests)?;

        let mut state = build_state(problem, current);
        let engine = EligibilityEngine::with_limits(
            self.config.slots_per_student,
            self.config.min_categories,
        );

        // Worst-served first; request ID breaks ties deterministically
        let mut order: Vec<usize> = (0..requests.len()).collect();
        let scores: Vec<f64> = requests
            .iter()
            .map(|r| state.fairness_score(&r.student_id, self.config.no_preference_penalty))
            .collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .total_cmp(&scores[a])
                .then(requests[a].id.cmp(&requests[b].id))
        });

        let mut events = Vec::new();
        let mut fulfilled = 0usize;
        let mut rounds = 0usize;

        for round in 1..=self.config.max_rounds {
            let mut fulfilled_this_round = 0usize;

            for &idx in &order {
                if !requests[idx].is_pending() {
                    continue;
                }
                if let Some(event) =
                    self.try_fulfill(problem, &engine, &mut state, &requests[idx], round)
                {
                    requests[idx].status = ExchangeStatus::Fulfilled;
                    events.push(event);
                    fulfilled += 1;
                    fulfilled_this_round += 1;
                }
            }

            debug!(round, fulfilled = fulfilled_this_round, "exchange pass");
            if fulfilled_this_round == 0 {
                break;
            }
            rounds = round;
        }

        let mut unfulfillable = 0usize;
        for request in requests.iter_mut().filter(|r| r.is_pending()) {
            let reason = String::from("no desired course was eligible in any resolution pass");
            request.status = ExchangeStatus::Unfulfillable;
            request.failure_reason = Some(reason.clone());
            events.push(ExchangeEvent::Unfulfillable {
                request_id: request.id.clone(),
                student_id: request.student_id.clone(),
                reason,
            });
            unfulfillable += 1;
        }

        Ok(ExchangeSummary {
            total: requests.len(),
            fulfilled,
            unfulfillable,
            rounds,
            events,
            requests,
        })
    }

    /// Builds the option list for composing a request against `offered`.
    ///
    /// Options are evaluated under a hypothetical state with the offered
    /// assignment removed. Structurally excluded courses are hidden; a
    /// course at capacity stays visible with a warning verdict, since a
    /// later exchange may free a seat.
    pub fn options(
        &self,
        problem: &AllocationProblem,
        current: &[Assignment],
        offered: &Assignment,
    ) -> Result<Vec<ExchangeOption>, ExchangeInputError> {
        if offered.priority.is_preset() {
            return Err(ExchangeInputError::PresetHeld {
                student_id: offered.student_id.clone(),
                block_id: offered.block_id.clone(),
            });
        }
        let mut state = build_state(problem, current);
        if state.unassign(&offered.student_id, &offered.block_id).is_none() {
            return Err(ExchangeInputError::AssignmentNotHeld {
                student_id: offered.student_id.clone(),
                block_id: offered.block_id.clone(),
            });
        }
        let Some(student) = problem.student(&offered.student_id) else {
            return Ok(Vec::new());
        };
        let engine = EligibilityEngine::with_limits(
            self.config.slots_per_student,
            self.config.min_categories,
        );

        let mut options = Vec::new();
        for block in problem.blocks() {
            for course_id in problem.schedule().courses_in(&block.id) {
                if course_id == &offered.course_id {
                    continue;
                }
                let Some(course) = problem.course(course_id) else {
                    continue;
                };
                let verdict =
                    match engine.check(student, course, block, &state, Strictness::Strict) {
                        Eligibility::Ineligible(IneligibilityReason::AtCapacity) => {
                            Eligibility::EligibleWithWarning(IneligibilityReason::AtCapacity)
                        }
                        other => other,
                    };
                if verdict.is_assignable() {
                    options.push(ExchangeOption {
                        course_id: course_id.clone(),
                        block_id: block.id.clone(),
                        verdict,
                    });
                }
            }
        }
        Ok(options)
    }

    fn check_boundary(
        &self,
        current: &[Assignment],
        requests: &[ExchangeRequest],
    ) -> Result<(), ExchangeInputError> {
        let mut seen = HashSet::new();
        for request in requests {
            if !request.is_pending() {
                return Err(ExchangeInputError::NotPending(request.id.clone()));
            }
            if !seen.insert(request.id.as_str()) {
                return Err(ExchangeInputError::DuplicateRequestId(request.id.clone()));
            }
            if request.offered.priority.is_preset() {
                return Err(ExchangeInputError::PresetOffered(request.id.clone()));
            }
            let held = current.iter().any(|a| {
                a.student_id == request.offered.student_id
                    && a.block_id == request.offered.block_id
                    && a.course_id == request.offered.course_id
            });
            if !held {
                return Err(ExchangeInputError::UnknownOfferedAssignment {
                    request_id: request.id.clone(),
                    student_id: request.offered.student_id.clone(),
                    block_id: request.offered.block_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Attempts one request: first eligible desired course wins.
    ///
    /// On success the offered assignment stays removed and the acquired
    /// one is committed; on failure the offered assignment is restored
    /// untouched.
    fn try_fulfill(
        &self,
        problem: &AllocationProblem,
        engine: &EligibilityEngine,
        state: &mut AssignmentState,
        request: &ExchangeRequest,
        round: usize,
    ) -> Option<ExchangeEvent> {
        let student = problem.student(&request.student_id)?;
        let offered = state.unassign(&request.student_id, &request.offered.block_id)?;

        for (desired_rank, course_id) in request.desired.iter().enumerate() {
            if course_id == &offered.course_id {
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
            if !engine
                .check(student, course, block, state, Strictness::Strict)
                .is_eligible()
            {
                continue;
            }

            state.assign(
                Assignment::new(
                    &request.student_id,
                    &block.id,
                    course_id,
                    AchievedPriority::Rank(desired_rank as u32),
                ),
                course,
                block,
            );
            debug!(
                request = %request.id,
                student = %request.student_id,
                released = %offered.course_id,
                acquired = %course_id,
                round,
                "exchange executed"
            );
            return Some(ExchangeEvent::Executed {
                request_id: request.id.clone(),
                student_id: request.student_id.clone(),
                released_course: offered.course_id.clone(),
                acquired_course: course_id.clone(),
                block_id: block.id.clone(),
                round,
            });
        }

        // Nothing fit: put the offered assignment back
        if let (Some(course), Some(block)) = (
            problem.course(&offered.course_id),
            problem.block(&offered.block_id),
        ) {
            state.assign(offered, course, block);
        }
        None
    }
}

/// Seeds a working state from the current assignment list. Assignments
/// referencing unknown courses or blocks are skipped with a warning.
fn build_state(problem: &AllocationProblem, current: &[Assignment]) -> AssignmentState {
    let mut state = AssignmentState::new();
    for assignment in current {
        match (
            problem.course(&assignment.course_id),
            problem.block(&assignment.block_id),
        ) {
            (Some(course), Some(block)) => state.assign(assignment.clone(), course, block),
            _ => warn!(
                student = %assignment.student_id,
                course = %assignment.course_id,
                block = %assignment.block_id,
                "assignment references unknown course or block, skipped"
            ),
        }
    }
    state
}
