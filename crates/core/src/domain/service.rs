use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::slot::SpecialistId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub i64);

/// An offering a client can book: how long it takes and what it costs.
/// Duration drives how many contiguous 30-minute slots a booking consumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub specialist_id: SpecialistId,
    pub name: String,
    pub duration_minutes: u32,
    pub cost: Decimal,
}

impl Service {
    pub fn slots_needed(&self) -> usize {
        crate::availability::slots_needed(self.duration_minutes)
    }
}
