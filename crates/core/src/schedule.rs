//! Schedule generation and maintenance.
//!
//! Generation is split into a pure planning pass over a work template and a
//! store pass that appends the planned rows as Free. Generation is not
//! idempotent: running it twice over the same range duplicates rows, so the
//! callers that regenerate (month refresh, special hours) clear first.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info};

use crate::dates::{self, format_date, month_bounds, time_to_minutes};
use crate::domain::slot::{Slot, SlotStatus, SpecialistId};
use crate::domain::specialist::WorkTemplate;
use crate::store::{SlotStore, StoreError};

/// A slot the generator intends to create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedSlot {
    pub date: String,
    pub time: String,
}

/// Plans slots for every working day in `[from, to]`.
///
/// Starts walk from the template start at a cadence of 30 minutes plus the
/// break; the last start still satisfies `start + 30 <= end`. Malformed
/// template times plan nothing.
pub fn plan_days(template: &WorkTemplate, from: NaiveDate, to: NaiveDate) -> Vec<PlannedSlot> {
    let (Some(start), Some(end)) =
        (time_to_minutes(&template.start), time_to_minutes(&template.end))
    else {
        return Vec::new();
    };

    let mut planned = Vec::new();
    let mut day = from;
    while day <= to {
        if template.works_on(day.weekday()) {
            plan_one_day(&mut planned, day, start, end, 30 + template.break_minutes);
        }
        day += Duration::days(1);
    }
    planned
}

fn plan_one_day(planned: &mut Vec<PlannedSlot>, day: NaiveDate, start: u32, end: u32, step: u32) {
    let date = format_date(day);
    let mut cursor = start;
    while cursor + 30 <= end {
        planned.push(PlannedSlot { date: date.clone(), time: dates::minutes_to_time(cursor) });
        cursor += step;
    }
}

/// Appends every planned slot in the range as Free. Returns how many rows
/// were created.
pub async fn generate_range(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    template: &WorkTemplate,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<usize, StoreError> {
    let planned = plan_days(template, from, to);
    for slot in &planned {
        store.append_slot(specialist, &slot.date, &slot.time).await?;
    }
    info!(
        specialist = specialist.0,
        from = %format_date(from),
        to = %format_date(to),
        created = planned.len(),
        "generated schedule range"
    );
    Ok(planned.len())
}

/// Generates a full calendar month. Out-of-range months create nothing.
pub async fn generate_month(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    template: &WorkTemplate,
    year: i32,
    month: u32,
) -> Result<usize, StoreError> {
    match month_bounds(year, month) {
        Some((first, last)) => generate_range(store, specialist, template, first, last).await,
        None => Ok(0),
    }
}

/// Generates the 30-day window starting at `today`.
pub async fn generate_rolling_month(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    template: &WorkTemplate,
    today: NaiveDate,
) -> Result<usize, StoreError> {
    generate_range(store, specialist, template, today, today + Duration::days(29)).await
}

/// Deletes every slot of the specialist dated inside `[from, to]`,
/// regardless of status. Booked slots in the range must be cancelled by the
/// caller beforehand; this is the low-level primitive.
pub async fn clear_range(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<usize, StoreError> {
    let mut removed = 0;
    for slot in store.list_slots(specialist).await? {
        let Some(date) = parse_normalized(&slot.date) else { continue };
        if from <= date && date <= to {
            store.delete_slot(slot.id).await?;
            removed += 1;
        }
    }
    debug!(specialist = specialist.0, removed, "cleared schedule range");
    Ok(removed)
}

pub async fn clear_month(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    year: i32,
    month: u32,
) -> Result<usize, StoreError> {
    match month_bounds(year, month) {
        Some((first, last)) => clear_range(store, specialist, first, last).await,
        None => Ok(0),
    }
}

/// Booked slots dated inside the month, chronological. Used to sequence
/// cancellations ahead of a destructive regeneration.
pub async fn booked_slots_in_month(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    year: i32,
    month: u32,
) -> Result<Vec<Slot>, StoreError> {
    let Some((first, last)) = month_bounds(year, month) else {
        return Ok(Vec::new());
    };
    let mut booked: Vec<Slot> = store
        .list_slots(specialist)
        .await?
        .into_iter()
        .filter(|slot| {
            slot.status == SlotStatus::Booked
                && parse_normalized(&slot.date).map_or(false, |d| first <= d && d <= last)
        })
        .collect();
    booked.sort_by(|a, b| (a.date.as_str(), a.start_minutes()).cmp(&(b.date.as_str(), b.start_minutes())));
    Ok(booked)
}

/// Marks every non-Closed slot on the date as Closed and clears its client.
/// Returns false when the date had nothing to close.
pub async fn close_day(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    date: &str,
) -> Result<bool, StoreError> {
    let wanted = dates::normalize(date);
    let mut changed = false;
    for slot in store.list_slots(specialist).await? {
        if dates::normalize(&slot.date) == wanted && slot.status != SlotStatus::Closed {
            store.update_slot_status(slot.id, SlotStatus::Closed, None).await?;
            changed = true;
        }
    }
    info!(specialist = specialist.0, date = %wanted, changed, "closed day");
    Ok(changed)
}

/// Replaces each date's slots with a fresh Free grid running `start..end` at
/// a plain 30-minute cadence (no break). Existing rows on the date are
/// removed first so the one-row-per-time invariant holds. Returns how many
/// slots were created.
pub async fn apply_special_hours(
    store: &dyn SlotStore,
    specialist: SpecialistId,
    day_dates: &[String],
    start: &str,
    end: &str,
) -> Result<usize, StoreError> {
    let (Some(start), Some(end)) = (time_to_minutes(start), time_to_minutes(end)) else {
        return Ok(0);
    };

    let mut created = 0;
    for raw in day_dates {
        let date = dates::normalize(raw);
        for slot in store.list_slots(specialist).await? {
            if dates::normalize(&slot.date) == date {
                store.delete_slot(slot.id).await?;
            }
        }
        let mut cursor = start;
        while cursor + 30 <= end {
            store.append_slot(specialist, &date, &dates::minutes_to_time(cursor)).await?;
            cursor += 30;
            created += 1;
        }
        info!(specialist = specialist.0, date = %date, "applied special hours");
    }
    Ok(created)
}

fn parse_normalized(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&dates::normalize(raw), "%Y-%m-%d").ok()
}
