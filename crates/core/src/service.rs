//! The scheduling facade the conversational surfaces call into.
//!
//! Callers speak in dates, wall-clock times and durations; this layer
//! resolves them to concrete slot ids and drives the engines. It owns no
//! state beyond the shared store handle.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::availability::{self, SlotWindow};
use crate::booking::{self, BookingOutcome};
use crate::calendar;
use crate::dates;
use crate::domain::appointment::{group_appointments, Appointment};
use crate::domain::slot::{ClientId, SlotId, SpecialistId};
use crate::domain::specialist::WorkTemplate;
use crate::schedule;
use crate::store::{SlotStore, StoreError};

/// Outcome of a reservation attempt. `appointment` is present exactly when
/// `success` is true.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservationResult {
    pub success: bool,
    pub appointment: Option<Appointment>,
}

impl ReservationResult {
    fn conflict() -> Self {
        Self { success: false, appointment: None }
    }

    fn booked(appointment: Appointment) -> Self {
        Self { success: true, appointment: Some(appointment) }
    }
}

#[derive(Clone)]
pub struct SchedulingService {
    store: Arc<dyn SlotStore>,
}

impl SchedulingService {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn SlotStore {
        self.store.as_ref()
    }

    /// Dates in the month that can still host a service of this duration,
    /// ascending. Dates before `today` never qualify.
    pub async fn query_available_dates(
        &self,
        specialist: SpecialistId,
        year: i32,
        month: u32,
        duration_minutes: u32,
        today: NaiveDate,
    ) -> Result<Vec<String>, StoreError> {
        let map = calendar::month_availability(
            self.store(),
            specialist,
            year,
            month,
            duration_minutes,
            today,
        )
        .await?;
        Ok(map.into_iter().filter_map(|(date, ok)| ok.then_some(date)).collect())
    }

    /// Every start the service fits at on the date, chronological.
    pub async fn query_available_start_times(
        &self,
        specialist: SpecialistId,
        date: &str,
        duration_minutes: u32,
    ) -> Result<Vec<SlotWindow>, StoreError> {
        availability::candidate_windows(self.store(), specialist, date, duration_minutes).await
    }

    /// Books the window starting at `time` on `date`. Fails softly when the
    /// start is not offered or another writer takes a slot first.
    pub async fn reserve(
        &self,
        specialist: SpecialistId,
        date: &str,
        time: &str,
        duration_minutes: u32,
        client: ClientId,
    ) -> Result<ReservationResult, StoreError> {
        let Some(window) = self.resolve_window(specialist, date, time, duration_minutes).await?
        else {
            debug!(date = %dates::normalize(date), time, "requested start is not offered");
            return Ok(ReservationResult::conflict());
        };
        match booking::book(self.store(), &window.slot_ids, client).await? {
            BookingOutcome::Booked(appointment) => Ok(ReservationResult::booked(appointment)),
            BookingOutcome::Conflict => Ok(ReservationResult::conflict()),
        }
    }

    /// Cancels the appointment anchored at the slot id. False when there is
    /// nothing to cancel.
    pub async fn release(&self, first_slot_id: SlotId) -> Result<bool, StoreError> {
        booking::cancel(self.store(), first_slot_id).await
    }

    /// Moves an appointment to a new window; the original survives any
    /// failure to take the new one.
    pub async fn move_appointment(
        &self,
        old_first_slot_id: SlotId,
        specialist: SpecialistId,
        new_date: &str,
        new_time: &str,
        duration_minutes: u32,
        client: ClientId,
    ) -> Result<ReservationResult, StoreError> {
        let Some(window) =
            self.resolve_window(specialist, new_date, new_time, duration_minutes).await?
        else {
            return Ok(ReservationResult::conflict());
        };
        match booking::reschedule(self.store(), old_first_slot_id, &window.slot_ids, client).await?
        {
            BookingOutcome::Booked(appointment) => Ok(ReservationResult::booked(appointment)),
            BookingOutcome::Conflict => Ok(ReservationResult::conflict()),
        }
    }

    /// The client's current appointments, grouped from their booked slots.
    pub async fn client_appointments(
        &self,
        client: ClientId,
    ) -> Result<Vec<Appointment>, StoreError> {
        let slots = self.store().list_client_slots(client).await?;
        Ok(group_appointments(slots))
    }

    /// Duration of the appointment anchored at the slot id, when one exists.
    pub async fn appointment_duration(
        &self,
        first_slot_id: SlotId,
    ) -> Result<Option<u32>, StoreError> {
        let Some(anchor) = self.store().find_slot(first_slot_id).await? else {
            return Ok(None);
        };
        let Some(client) = anchor.client_id else {
            return Ok(None);
        };
        let appointments = self.client_appointments(client).await?;
        Ok(appointments
            .into_iter()
            .find(|a| a.slot_ids.contains(&first_slot_id))
            .map(|a| a.duration_minutes))
    }

    pub async fn generate_schedule(
        &self,
        specialist: SpecialistId,
        template: &WorkTemplate,
        year: i32,
        month: u32,
    ) -> Result<usize, StoreError> {
        schedule::generate_month(self.store(), specialist, template, year, month).await
    }

    pub async fn clear_schedule(
        &self,
        specialist: SpecialistId,
        year: i32,
        month: u32,
    ) -> Result<usize, StoreError> {
        schedule::clear_month(self.store(), specialist, year, month).await
    }

    pub async fn block_day(
        &self,
        specialist: SpecialistId,
        date: &str,
    ) -> Result<bool, StoreError> {
        schedule::close_day(self.store(), specialist, date).await
    }

    pub async fn block_slot(&self, slot_id: SlotId) -> Result<bool, StoreError> {
        booking::close(self.store(), slot_id).await
    }

    pub async fn unblock_slot(&self, slot_id: SlotId) -> Result<bool, StoreError> {
        booking::open(self.store(), slot_id).await
    }

    async fn resolve_window(
        &self,
        specialist: SpecialistId,
        date: &str,
        time: &str,
        duration_minutes: u32,
    ) -> Result<Option<SlotWindow>, StoreError> {
        let wanted = dates::time_to_minutes(time);
        if wanted.is_none() {
            return Ok(None);
        }
        let windows =
            availability::candidate_windows(self.store(), specialist, date, duration_minutes)
                .await?;
        Ok(windows
            .into_iter()
            .find(|window| dates::time_to_minutes(&window.start_time) == wanted))
    }
}
