//! Student model.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Student gender, used for course gender restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
    Diverse,
}

/// A student to be allocated.
///
/// The excluded-block set is a hard forbiddance: the student can never
/// receive an assignment in an excluded block, in any phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Unique student identifier.
    pub id: String,
    /// Grade level (for course grade restrictions).
    pub grade: u8,
    /// Gender (for course gender restrictions).
    pub gender: Gender,
    /// Blocks this student may never be assigned to.
    pub excluded_blocks: HashSet<String>,
}

impl Student {
    /// Creates a new student.
    pub fn new(id: impl Into<String>, grade: u8, gender: Gender) -> Self {
        Self {
            id: id.into(),
            grade,
            gender,
            excluded_blocks: HashSet::new(),
        }
    }

    /// Adds a block to the exclusion set.
    pub fn with_excluded_block(mut self, block_id: impl Into<String>) -> Self {
        self.excluded_blocks.insert(block_id.into());
        self
    }

    /// Whether the given block is excluded for this student.
    #[inline]
    pub fn is_block_excluded(&self, block_id: &str) -> bool {
        self.excluded_blocks.contains(block_id)
    }
}
