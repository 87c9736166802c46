//! Booking transitions and the compensating sagas around them.
//!
//! The store is the only serialization point: each slot write re-verifies
//! the current status, so a read-then-write race loses cleanly instead of
//! double-booking. Conflicts are values, not errors; only store failures
//! propagate.

use tracing::{info, warn};

use crate::domain::appointment::{group_appointments, Appointment};
use crate::domain::slot::{ClientId, SlotId, SlotStatus};
use crate::store::{SlotStore, StoreError};

/// Result of a booking attempt. `Conflict` means at least one requested slot
/// was no longer Free at write time and every slot this attempt had already
/// taken was rolled back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(Appointment),
    Conflict,
}

impl BookingOutcome {
    pub fn is_booked(&self) -> bool {
        matches!(self, BookingOutcome::Booked(_))
    }
}

/// Books the slots for the client, all or nothing.
///
/// Slots are taken one at a time with a compare-and-set; the first refusal
/// rolls back the slots already taken and returns `Conflict`.
pub async fn book(
    store: &dyn SlotStore,
    slot_ids: &[SlotId],
    client: ClientId,
) -> Result<BookingOutcome, StoreError> {
    if slot_ids.is_empty() {
        return Ok(BookingOutcome::Conflict);
    }

    let mut taken: Vec<SlotId> = Vec::with_capacity(slot_ids.len());
    for &id in slot_ids {
        match store.try_book_slot(id, client).await {
            Ok(true) => taken.push(id),
            Ok(false) => {
                warn!(slot = id.0, client = client.0, "slot taken mid-booking, rolling back");
                release_taken(store, &taken).await;
                return Ok(BookingOutcome::Conflict);
            }
            Err(error) => {
                warn!(slot = id.0, client = client.0, "store fault mid-booking, rolling back");
                release_taken(store, &taken).await;
                return Err(error);
            }
        }
    }

    let mut slots = Vec::with_capacity(taken.len());
    for &id in &taken {
        match store.find_slot(id).await? {
            Some(slot) => slots.push(slot),
            None => return Err(StoreError::Backend(format!("booked slot {id} vanished"))),
        }
    }
    let mut grouped = group_appointments(slots);
    let appointment = grouped.pop().ok_or_else(|| {
        StoreError::Decode("booked slots did not form an appointment".to_string())
    })?;
    info!(
        client = client.0,
        date = %appointment.date,
        start = %appointment.start_time,
        slots = appointment.slot_ids.len(),
        "appointment booked"
    );
    Ok(BookingOutcome::Booked(appointment))
}

/// Best-effort rollback of a partial booking. Release failures are logged
/// and skipped so every held slot gets an attempt.
async fn release_taken(store: &dyn SlotStore, taken: &[SlotId]) {
    for &held in taken {
        if let Err(error) = store.try_release_slot(held).await {
            warn!(slot = held.0, %error, "rollback release failed");
        }
    }
}

/// Cancels the appointment anchored at `first_slot_id`: frees the contiguous
/// Booked run sharing the anchor's specialist, date and client. Returns
/// false when the anchor is not currently Booked.
pub async fn cancel(store: &dyn SlotStore, first_slot_id: SlotId) -> Result<bool, StoreError> {
    let Some(anchor) = store.find_slot(first_slot_id).await? else {
        return Ok(false);
    };
    if anchor.status != SlotStatus::Booked {
        return Ok(false);
    }
    let Some(client) = anchor.client_id else {
        return Ok(false);
    };

    let slots = store.list_client_slots(client).await?;
    let run = group_appointments(slots)
        .into_iter()
        .find(|appointment| appointment.slot_ids.contains(&first_slot_id));
    let Some(appointment) = run else {
        return Ok(false);
    };

    let mut any = false;
    for &id in &appointment.slot_ids {
        any |= store.try_release_slot(id).await?;
    }
    info!(
        client = client.0,
        date = %appointment.date,
        start = %appointment.start_time,
        "appointment cancelled"
    );
    Ok(any)
}

/// Moves an appointment: books the new slots first, then cancels the old
/// run. If the new booking conflicts, nothing changes. If the old
/// cancellation then fails, the new booking is compensated away and the
/// whole move reports `Conflict`.
pub async fn reschedule(
    store: &dyn SlotStore,
    old_first_slot_id: SlotId,
    new_slot_ids: &[SlotId],
    client: ClientId,
) -> Result<BookingOutcome, StoreError> {
    let outcome = book(store, new_slot_ids, client).await?;
    let BookingOutcome::Booked(appointment) = outcome else {
        return Ok(BookingOutcome::Conflict);
    };

    match cancel(store, old_first_slot_id).await {
        Ok(true) => Ok(BookingOutcome::Booked(appointment)),
        Ok(false) => {
            warn!(
                old_anchor = old_first_slot_id.0,
                "old appointment not cancellable, compensating new booking"
            );
            cancel(store, appointment.anchor()).await?;
            Ok(BookingOutcome::Conflict)
        }
        Err(error) => {
            warn!(
                old_anchor = old_first_slot_id.0,
                "store fault cancelling old appointment, compensating new booking"
            );
            if let Err(compensation) = cancel(store, appointment.anchor()).await {
                warn!(%compensation, "compensation of the new booking failed");
            }
            Err(error)
        }
    }
}

/// Administrative Free → Closed. Refused (false) unless the slot is Free.
pub async fn close(store: &dyn SlotStore, slot_id: SlotId) -> Result<bool, StoreError> {
    let Some(slot) = store.find_slot(slot_id).await? else {
        return Ok(false);
    };
    if slot.status != SlotStatus::Free {
        return Ok(false);
    }
    store.update_slot_status(slot_id, SlotStatus::Closed, None).await?;
    Ok(true)
}

/// Administrative Closed → Free. A Booked slot stays untouched.
pub async fn open(store: &dyn SlotStore, slot_id: SlotId) -> Result<bool, StoreError> {
    let Some(slot) = store.find_slot(slot_id).await? else {
        return Ok(false);
    };
    if slot.status != SlotStatus::Closed {
        return Ok(false);
    }
    store.update_slot_status(slot_id, SlotStatus::Free, None).await?;
    Ok(true)
}
