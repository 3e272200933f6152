//! Exchange request model and resolution events.

use serde::{Deserialize, Serialize};

use super::Assignment;

/// Lifecycle state of an exchange request.
///
/// Created by a student action as `Pending`; terminated only by
/// resolution (`Fulfilled` / `Unfulfillable`), withdrawal, or expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeStatus {
    Pending,
    Fulfilled,
    Unfulfillable,
    Withdrawn,
    Expired,
}

/// A request to trade an existing assignment for a more desired course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRequest {
    /// Unique request identifier.
    pub id: String,
    /// Requesting student.
    pub student_id: String,
    /// The assignment the student offers up.
    pub offered: Assignment,
    /// Desired course IDs in priority order (first = most desired).
    pub desired: Vec<String>,
    /// Lifecycle state.
    pub status: ExchangeStatus,
    /// Why the request ended `Unfulfillable`, if it did.
    pub failure_reason: Option<String>,
}

impl ExchangeRequest {
    /// Creates a new pending request.
    pub fn new(
        id: impl Into<String>,
        student_id: impl Into<String>,
        offered: Assignment,
        desired: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            student_id: student_id.into(),
            offered,
            desired,
            status: ExchangeStatus::Pending,
            failure_reason: None,
        }
    }

    /// Whether the request is still awaiting resolution.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == ExchangeStatus::Pending
    }
}

/// An event emitted during exchange resolution.
///
/// `Executed` is the audit trail of a performed exchange; `Unfulfillable`
/// is the notification raised for a request that could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeEvent {
    /// An exchange was performed.
    Executed {
        request_id: String,
        student_id: String,
        released_course: String,
        acquired_course: String,
        block_id: String,
        round: usize,
    },
    /// A request was closed as unfulfillable.
    Unfulfillable {
        request_id: String,
        student_id: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_is_pending() {
        let offered = Assignment::ranked("S1", "mon_am", "C1", 1);
        let req = ExchangeRequest::new("R1", "S1", offered, vec!["C2".into(), "C3".into()]);
        assert!(req.is_pending());
        assert_eq!(req.status, ExchangeStatus::Pending);
        assert_eq!(req.failure_reason, None);
        assert_eq!(req.desired.len(), 2);
    }

    #[test]
    fn test_non_pending_states() {
        let offered = Assignment::ranked("S1", "mon_am", "C1", 1);
        let mut req = ExchangeRequest::new("R1", "S1", offered, vec![]);
        req.status = ExchangeStatus::Withdrawn;
        assert!(!req.is_pending());
    }
}
