use serde::{Deserialize, Serialize};

use crate::domain::slot::{ClientId, Slot, SlotId, SpecialistId};

/// A client's reservation: one or more contiguous booked slots.
///
/// The store has no appointment rows; this aggregate is derived at booking
/// time (or regrouped from booked slots) and the first slot's id doubles as
/// the opaque handle callers pass back to cancel or move it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub slot_ids: Vec<SlotId>,
    pub specialist_id: SpecialistId,
    pub client_id: ClientId,
    pub date: String,
    pub start_time: String,
    pub duration_minutes: u32,
}

impl Appointment {
    pub fn anchor(&self) -> SlotId {
        self.slot_ids[0]
    }
}

/// Groups a client's booked slots into appointments: per (specialist, date),
/// sorted by time, split wherever the 30-minute chain breaks. Dates are
/// normalized before comparing, so mixed storage formats still form one run.
/// Duration is `last_start - first_start + 30`, the grid being fixed.
pub fn group_appointments(slots: Vec<Slot>) -> Vec<Appointment> {
    let mut dated: Vec<(Slot, String)> = slots
        .into_iter()
        .filter(|slot| slot.client_id.is_some() && slot.start_minutes().is_some())
        .map(|slot| {
            let date = crate::dates::normalize(&slot.date);
            (slot, date)
        })
        .collect();
    dated.sort_by(|a, b| {
        (a.0.specialist_id.0, a.1.as_str(), a.0.start_minutes())
            .cmp(&(b.0.specialist_id.0, b.1.as_str(), b.0.start_minutes()))
    });

    let mut appointments = Vec::new();
    let mut run: Vec<&(Slot, String)> = Vec::new();
    for entry in &dated {
        let (slot, date) = entry;
        let chained = run.last().is_some_and(|(prev, prev_date)| {
            prev.specialist_id == slot.specialist_id
                && prev_date == date
                && prev.client_id == slot.client_id
                && prev.start_minutes().zip(slot.start_minutes()).is_some_and(|(a, b)| b == a + 30)
        });
        if !chained {
            if let Some(appointment) = close_run(&run) {
                appointments.push(appointment);
            }
            run.clear();
        }
        run.push(entry);
    }
    if let Some(appointment) = close_run(&run) {
        appointments.push(appointment);
    }
    appointments
}

fn close_run(run: &[&(Slot, String)]) -> Option<Appointment> {
    let (first, date) = run.first()?;
    let (last, _) = run.last()?;
    let duration = last.start_minutes()? - first.start_minutes()? + 30;
    Some(Appointment {
        slot_ids: run.iter().map(|(slot, _)| slot.id).collect(),
        specialist_id: first.specialist_id,
        client_id: first.client_id?,
        date: date.clone(),
        start_time: first.time.clone(),
        duration_minutes: duration,
    })
}

#[cfg(test)]
mod tests {
    use super::group_appointments;
    use crate::domain::slot::{ClientId, Slot, SlotId, SlotStatus, SpecialistId};

    fn booked(id: i64, date: &str, time: &str) -> Slot {
        Slot {
            id: SlotId(id),
            specialist_id: SpecialistId(1),
            date: date.to_string(),
            time: time.to_string(),
            status: SlotStatus::Booked,
            client_id: Some(ClientId(42)),
        }
    }

    #[test]
    fn contiguous_slots_form_one_appointment() {
        let appointments = group_appointments(vec![
            booked(2, "2026-09-07", "10:30"),
            booked(1, "2026-09-07", "10:00"),
            booked(3, "2026-09-07", "11:00"),
        ]);
        assert_eq!(appointments.len(), 1);
        let appointment = &appointments[0];
        assert_eq!(appointment.slot_ids, vec![SlotId(1), SlotId(2), SlotId(3)]);
        assert_eq!(appointment.start_time, "10:00");
        assert_eq!(appointment.duration_minutes, 90);
        assert_eq!(appointment.anchor(), SlotId(1));
    }

    #[test]
    fn a_gap_splits_the_run() {
        let appointments = group_appointments(vec![
            booked(1, "2026-09-07", "10:00"),
            booked(2, "2026-09-07", "11:00"),
        ]);
        assert_eq!(appointments.len(), 2);
        assert_eq!(appointments[0].duration_minutes, 30);
        assert_eq!(appointments[1].start_time, "11:00");
    }

    #[test]
    fn mixed_date_formats_group_into_one_run() {
        let appointments = group_appointments(vec![
            booked(1, "2026-09-07", "10:00"),
            booked(2, "07.09.2026", "10:30"),
        ]);
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].date, "2026-09-07");
        assert_eq!(appointments[0].duration_minutes, 60);
    }

    #[test]
    fn different_dates_never_merge() {
        let appointments = group_appointments(vec![
            booked(1, "2026-09-07", "10:00"),
            booked(2, "2026-09-08", "10:30"),
        ]);
        assert_eq!(appointments.len(), 2);
    }

    #[test]
    fn unbooked_rows_are_ignored() {
        let mut stray = booked(9, "2026-09-07", "12:00");
        stray.client_id = None;
        assert!(group_appointments(vec![stray]).is_empty());
    }
}
