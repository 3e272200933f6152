//! Allocation domain models.
//!
//! Core data types for the elective allocation problem and its
//! solutions: who can be placed ([`Student`]), where ([`TimeBlock`],
//! [`Course`], [`CourseSchedule`]), what they want ([`Preference`]),
//! what is fixed up front ([`PresetAssignment`]), what comes out
//! ([`Assignment`]), and the post-allocation exchange lifecycle
//! ([`ExchangeRequest`]).

mod assignment;
mod block;
mod course;
mod exchange;
mod preference;
mod student;

pub use assignment::{AchievedPriority, Assignment, FillState};
pub use block::{TimeBlock, Weekday};
pub use course::{Course, CourseSchedule};
pub use exchange::{ExchangeEvent, ExchangeRequest, ExchangeStatus};
pub use preference::{Preference, PresetAssignment};
pub use student::{Gender, Student};
