use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dates;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecialistId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub i64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for SpecialistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Free,
    Booked,
    Closed,
}

impl SlotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Booked => "booked",
            Self::Closed => "closed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Self::Free),
            "booked" => Some(Self::Booked),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// One 30-minute unit of a specialist's calendar.
///
/// `date` is the canonical `YYYY-MM-DD` form and `time` a `HH:MM` wall-clock
/// start. `client_id` is set if and only if the slot is booked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub specialist_id: SpecialistId,
    pub date: String,
    pub time: String,
    pub status: SlotStatus,
    pub client_id: Option<ClientId>,
}

impl Slot {
    pub fn can_transition_to(&self, next: SlotStatus) -> bool {
        matches!(
            (self.status, next),
            (SlotStatus::Free, SlotStatus::Booked)
                | (SlotStatus::Booked, SlotStatus::Free)
                | (SlotStatus::Free, SlotStatus::Closed)
                | (SlotStatus::Closed, SlotStatus::Free)
        )
    }

    pub fn book(&mut self, client: ClientId) -> Result<(), DomainError> {
        if !self.can_transition_to(SlotStatus::Booked) {
            return Err(DomainError::InvalidSlotTransition {
                from: self.status,
                to: SlotStatus::Booked,
            });
        }
        self.status = SlotStatus::Booked;
        self.client_id = Some(client);
        Ok(())
    }

    pub fn release(&mut self) -> Result<(), DomainError> {
        if self.status != SlotStatus::Booked {
            return Err(DomainError::InvalidSlotTransition {
                from: self.status,
                to: SlotStatus::Free,
            });
        }
        self.status = SlotStatus::Free;
        self.client_id = None;
        Ok(())
    }

    /// Start time as minutes since midnight. `None` when the stored time
    /// string is malformed.
    pub fn start_minutes(&self) -> Option<u32> {
        dates::time_to_minutes(&self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientId, Slot, SlotId, SlotStatus, SpecialistId};

    fn slot(status: SlotStatus) -> Slot {
        Slot {
            id: SlotId(7),
            specialist_id: SpecialistId(1),
            date: "2026-09-07".to_string(),
            time: "10:00".to_string(),
            status,
            client_id: None,
        }
    }

    #[test]
    fn booking_a_free_slot_sets_client() {
        let mut s = slot(SlotStatus::Free);
        s.book(ClientId(5)).expect("free -> booked");
        assert_eq!(s.status, SlotStatus::Booked);
        assert_eq!(s.client_id, Some(ClientId(5)));
    }

    #[test]
    fn booking_a_closed_slot_is_rejected() {
        let mut s = slot(SlotStatus::Closed);
        let error = s.book(ClientId(5)).expect_err("closed slot must not book");
        assert!(matches!(error, crate::errors::DomainError::InvalidSlotTransition { .. }));
        assert_eq!(s.client_id, None);
    }

    #[test]
    fn releasing_a_booked_slot_clears_client() {
        let mut s = slot(SlotStatus::Free);
        s.book(ClientId(5)).expect("book");
        s.release().expect("booked -> free");
        assert_eq!(s.status, SlotStatus::Free);
        assert_eq!(s.client_id, None);
    }

    #[test]
    fn releasing_a_free_slot_is_rejected() {
        let mut s = slot(SlotStatus::Free);
        assert!(s.release().is_err());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [SlotStatus::Free, SlotStatus::Booked, SlotStatus::Closed] {
            assert_eq!(SlotStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SlotStatus::parse("unknown"), None);
    }

    #[test]
    fn start_minutes_parses_wall_clock() {
        assert_eq!(slot(SlotStatus::Free).start_minutes(), Some(600));
    }
}
