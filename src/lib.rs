//! Elective course allocation engine.
//!
//! Assigns students to elective courses in fixed weekly time blocks and
//! resolves post-allocation exchange requests. Preferences are ranked
//! per block; the engine fills each student's weekly slots while
//! honoring capacities, per-student block exclusions, grade and gender
//! restrictions, one-assignment-per-weekday, and category diversity.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Student`, `TimeBlock`, `Course`,
//!   `CourseSchedule`, `Preference`, `PresetAssignment`, `Assignment`,
//!   `ExchangeRequest`
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling
//!   references, preset conflicts)
//! - **`eligibility`**: The pure verdict function behind every placement
//! - **`allocation`**: The four-phase batch allocator
//! - **`exchange`**: Multi-round exchange resolution and option lists
//! - **`stats`**: Run statistics
//!
//! # Example
//!
//! ```
//! use elective_alloc::allocation::{AllocationConfig, AllocationProblem, Allocator};
//! use elective_alloc::models::{
//!     Course, CourseSchedule, Gender, Preference, Student, TimeBlock, Weekday,
//! };
//!
//! let problem = AllocationProblem::new(
//!     vec![Student::new("S1", 8, Gender::Female)],
//!     vec![TimeBlock::new("mon_am", Weekday::Monday, 480, 570)],
//!     vec![Course::new("robotics").with_category("STEM").with_capacity(5, 20)],
//!     CourseSchedule::new().with_assignment("robotics", "mon_am"),
//!     vec![Preference::ranked("S1", "mon_am", "robotics", 0)],
//!     vec![],
//! );
//!
//! let outcome = Allocator::with_config(AllocationConfig::default().with_seed(42))
//!     .run(&problem);
//! assert_eq!(outcome.assignments.len(), 1);
//! ```

pub mod allocation;
pub mod eligibility;
pub mod exchange;
pub mod models;
pub mod stats;
pub mod validation;
