//! Month-level availability views.
//!
//! Two audiences: clients get a yes/no map of days that can still host their
//! service, specialists get a coarse status per working day. Both walk the
//! same slot rows and reuse the availability module's contiguity scan.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::availability::has_contiguous_capacity;
use crate::dates::{self, format_date, month_bounds};
use crate::domain::slot::{Slot, SlotStatus, SpecialistId};
use crate::store::{SlotStore, StoreError};

/// Coarse state of one scheduled day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayStatus {
    /// Every slot is taken.
    Busy,
    /// Every slot is still free.
    Open,
    /// Some taken, some free.
    Mixed,
    /// Nothing bookable on the day.
    Closed,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Busy => "busy",
            DayStatus::Open => "open",
            DayStatus::Mixed => "mixed",
            DayStatus::Closed => "closed",
        }
    }
}

/// Whether each date of the month can host a `duration_minutes` service.
///
/// Every calendar date of the month appears in the map. Dates strictly
/// before `today` are always false, whatever the rows say.
pub async fn month_availability(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    year: i32,
    month: u32,
    duration_minutes: u32,
    today: NaiveDate,
) -> Result<BTreeMap<String, bool>, StoreError> {
    let Some((first, last)) = month_bounds(year, month) else {
        return Ok(BTreeMap::new());
    };

    let by_date = slots_by_date(store, specialist).await?;
    let mut map = BTreeMap::new();
    let mut day = first;
    while day <= last {
        let date = format_date(day);
        let available = day >= today
            && by_date.get(&date).map_or(false, |slots| {
                let free: Vec<Slot> =
                    slots.iter().filter(|s| s.status == SlotStatus::Free).cloned().collect();
                has_contiguous_capacity(&free, duration_minutes)
            });
        map.insert(date, available);
        day += Duration::days(1);
    }
    Ok(map)
}

/// Per-day status of every date in the month that has slot rows at all.
///
/// A Booked row with no client on record is counted as closed: those rows
/// are administrative blocks left by day closures, not reservations.
pub async fn month_overview(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    year: i32,
    month: u32,
) -> Result<BTreeMap<String, DayStatus>, StoreError> {
    let Some((first, last)) = month_bounds(year, month) else {
        return Ok(BTreeMap::new());
    };
    let first = format_date(first);
    let last = format_date(last);

    let mut map = BTreeMap::new();
    for (date, slots) in slots_by_date(store, specialist).await? {
        if date < first || date > last {
            continue;
        }
        map.insert(date, classify_day(&slots));
    }
    Ok(map)
}

fn classify_day(slots: &[Slot]) -> DayStatus {
    let mut free = 0usize;
    let mut booked = 0usize;
    for slot in slots {
        match slot.status {
            SlotStatus::Free => free += 1,
            SlotStatus::Booked if slot.client_id.is_some() => booked += 1,
            // Booked with no client, or Closed: not bookable, not a client.
            _ => {}
        }
    }
    match (free, booked) {
        (0, 0) => DayStatus::Closed,
        (0, _) => DayStatus::Busy,
        (_, 0) => DayStatus::Open,
        _ => DayStatus::Mixed,
    }
}

async fn slots_by_date(
    store: &dyn SlotStore,
    specialist: SpecialistId,
) -> Result<BTreeMap<String, Vec<Slot>>, StoreError> {
    let mut by_date: BTreeMap<String, Vec<Slot>> = BTreeMap::new();
    for slot in store.list_slots(specialist).await? {
        by_date.entry(dates::normalize(&slot.date)).or_default().push(slot);
    }
    Ok(by_date)
}
