//! Time block model.
//!
//! A time block is a fixed weekly timeslot (weekday + start/end time)
//! occupied by exactly one course per student. Blocks have a natural
//! schedule order: (weekday, start time).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Day of the week.
///
/// Derives `Ord` in declaration order (Monday first), which drives the
/// natural ordering of [`TimeBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// A fixed weekly timeslot.
///
/// Times are minutes since midnight. The natural order is
/// (weekday, start time), with end time and ID as deterministic
/// tie-breakers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    /// Unique block identifier.
    pub id: String,
    /// Day of the week this block occupies.
    pub weekday: Weekday,
    /// Start time (minutes since midnight).
    pub start_min: u16,
    /// End time (minutes since midnight).
    pub end_min: u16,
}

impl TimeBlock {
    /// Creates a new time block.
    pub fn new(id: impl Into<String>, weekday: Weekday, start_min: u16, end_min: u16) -> Self {
        Self {
            id: id.into(),
            weekday,
            start_min,
            end_min,
        }
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_min(&self) -> u16 {
        self.end_min.saturating_sub(self.start_min)
    }
}

impl Ord for TimeBlock {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.weekday, self.start_min, self.end_min, &self.id).cmp(&(
            other.weekday,
            other.start_min,
            other.end_min,
            &other.id,
        ))
    }
}

impl PartialOrd for TimeBlock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
