//! Free-slot discovery and contiguity checks.
//!
//! The schedule is a fixed 30-minute grid, so a service that runs longer than
//! one slot needs a run of adjacent Free slots. Both the yes/no capacity
//! check and the concrete window listing share one contiguity scan — the two
//! must never disagree on what fits.

use crate::dates::{self, minutes_to_time};
use crate::domain::slot::{Slot, SlotId, SlotStatus, SpecialistId};
use crate::store::{SlotStore, StoreError};

/// Number of grid slots a service occupies. Always at least one; partial
/// slots round up.
pub fn slots_needed(duration_minutes: u32) -> usize {
    (duration_minutes.div_ceil(30)).max(1) as usize
}

/// A concrete bookable window: `slot_ids` in chronological order, end time
/// exclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotWindow {
    pub start_time: String,
    pub end_time: String,
    pub slot_ids: Vec<SlotId>,
}

/// All windows of `duration_minutes` that fit inside `free`, sorted by start.
/// Slots on distinct dates never chain; dates are normalized before the
/// comparison so rows stored in mixed formats still chain.
pub fn windows_for(free: &[Slot], duration_minutes: u32) -> Vec<SlotWindow> {
    let needed = slots_needed(duration_minutes);
    let mut timed: Vec<(&Slot, String, u32)> = free
        .iter()
        .filter_map(|slot| {
            slot.start_minutes().map(|m| (slot, dates::normalize(&slot.date), m))
        })
        .collect();
    timed.sort_by(|a, b| (a.1.as_str(), a.2).cmp(&(b.1.as_str(), b.2)));

    let mut windows = Vec::new();
    if timed.len() < needed {
        return windows;
    }
    for window in timed.windows(needed) {
        let contiguous =
            window.windows(2).all(|pair| pair[0].1 == pair[1].1 && pair[1].2 == pair[0].2 + 30);
        if contiguous {
            let start = window[0].2;
            windows.push(SlotWindow {
                start_time: minutes_to_time(start),
                end_time: minutes_to_time(start + duration_minutes.max(30)),
                slot_ids: window.iter().map(|(slot, _, _)| slot.id).collect(),
            });
        }
    }
    windows
}

/// Whether any run of adjacent free slots can host the service.
pub fn has_contiguous_capacity(free: &[Slot], duration_minutes: u32) -> bool {
    !windows_for(free, duration_minutes).is_empty()
}

/// The specialist's Free slots, optionally restricted to one date. Dates are
/// normalized on both sides of the comparison.
pub async fn free_slots(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    date: Option<&str>,
) -> Result<Vec<Slot>, StoreError> {
    let wanted = date.map(dates::normalize);
    let mut free: Vec<Slot> = store
        .list_slots(specialist)
        .await?
        .into_iter()
        .filter(|slot| {
            slot.status == SlotStatus::Free
                && wanted.as_deref().map_or(true, |w| dates::normalize(&slot.date) == w)
        })
        .collect();
    free.sort_by(|a, b| {
        (dates::normalize(&a.date), a.start_minutes())
            .cmp(&(dates::normalize(&b.date), b.start_minutes()))
    });
    Ok(free)
}

/// Every window on `date` where the service fits.
pub async fn candidate_windows(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    date: &str,
    duration_minutes: u32,
) -> Result<Vec<SlotWindow>, StoreError> {
    let free = free_slots(store, specialist, Some(date)).await?;
    Ok(windows_for(&free, duration_minutes))
}
