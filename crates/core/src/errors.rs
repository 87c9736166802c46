use thiserror::Error;

use crate::domain::slot::SlotStatus;

/// Violations of the schedule's own rules. Routine business outcomes — a slot
/// already taken, a day with no capacity — are ordinary return values, never
/// errors; see the booking and availability modules.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid slot transition from {from:?} to {to:?}")]
    InvalidSlotTransition { from: SlotStatus, to: SlotStatus },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}
