use serde_json::json;

use slotbot_core::domain::appointment::Appointment;
use slotbot_core::domain::slot::{ClientId, SlotId, SpecialistId};

use crate::commands::{scheduling_service, with_pool, CommandResult};
use crate::{CancelArgs, ListArgs, MoveArgs, ReserveArgs};

fn appointment_json(appointment: &Appointment) -> serde_json::Value {
    json!({
        "anchor": appointment.anchor(),
        "specialist": appointment.specialist_id,
        "client": appointment.client_id,
        "date": appointment.date,
        "start": appointment.start_time,
        "duration_minutes": appointment.duration_minutes,
        "slot_ids": appointment.slot_ids,
    })
}

pub fn reserve(args: ReserveArgs) -> CommandResult {
    with_pool("booking.reserve", |pool, _config| async move {
        let service = scheduling_service(&pool);
        let result = service
            .reserve(
                SpecialistId(args.specialist),
                &args.date,
                &args.time,
                args.duration,
                ClientId(args.client),
            )
            .await?;
        match result.appointment {
            Some(appointment) => Ok(CommandResult::success_with_data(
                "booking.reserve",
                format!("booked {} {}", appointment.date, appointment.start_time),
                Some(appointment_json(&appointment)),
            )),
            None => Ok(CommandResult::failure(
                "booking.reserve",
                "conflict",
                format!("{} {} is not available for {} minutes", args.date, args.time, args.duration),
                1,
            )),
        }
    })
}

pub fn cancel(args: CancelArgs) -> CommandResult {
    with_pool("booking.cancel", |pool, _config| async move {
        let service = scheduling_service(&pool);
        if service.release(SlotId(args.slot)).await? {
            Ok(CommandResult::success("booking.cancel", format!("cancelled appointment {}", args.slot)))
        } else {
            Ok(CommandResult::failure(
                "booking.cancel",
                "not_booked",
                format!("slot {} does not anchor a booked appointment", args.slot),
                1,
            ))
        }
    })
}

pub fn move_appointment(args: MoveArgs) -> CommandResult {
    with_pool("booking.move", |pool, _config| async move {
        let service = scheduling_service(&pool);
        let result = service
            .move_appointment(
                SlotId(args.slot),
                SpecialistId(args.specialist),
                &args.date,
                &args.time,
                args.duration,
                ClientId(args.client),
            )
            .await?;
        match result.appointment {
            Some(appointment) => Ok(CommandResult::success_with_data(
                "booking.move",
                format!("moved to {} {}", appointment.date, appointment.start_time),
                Some(appointment_json(&appointment)),
            )),
            None => Ok(CommandResult::failure(
                "booking.move",
                "conflict",
                format!("{} {} is not available; original appointment kept", args.date, args.time),
                1,
            )),
        }
    })
}

pub fn list(args: ListArgs) -> CommandResult {
    with_pool("booking.list", |pool, _config| async move {
        let service = scheduling_service(&pool);
        let appointments = service.client_appointments(ClientId(args.client)).await?;
        let items: Vec<_> = appointments.iter().map(appointment_json).collect();
        Ok(CommandResult::success_with_data(
            "booking.list",
            format!("{} appointment(s)", items.len()),
            Some(json!({ "appointments": items })),
        ))
    })
}
