use serde_json::json;

use slotbot_core::booking;
use slotbot_core::domain::slot::{SlotId, SpecialistId};
use slotbot_core::domain::specialist::{parse_weekdays, WorkTemplate};
use slotbot_core::schedule;
use slotbot_core::store::SlotStore;
use slotbot_db::SqlSlotStore;

use crate::commands::{scheduling_service, with_pool, CommandResult};
use crate::{ClearArgs, CloseDayArgs, GenerateArgs, SlotArgs, SpecialArgs};

pub fn generate(args: GenerateArgs) -> CommandResult {
    with_pool("schedule.generate", |pool, config| async move {
        let store = SqlSlotStore::new(pool);
        let specialist = SpecialistId(args.specialist);

        let days = match parse_weekdays(&args.days) {
            Ok(days) if !days.is_empty() => days,
            Ok(_) => {
                return Ok(CommandResult::failure(
                    "schedule.generate",
                    "invalid_args",
                    "--days must name at least one weekday",
                    2,
                ));
            }
            Err(error) => {
                return Ok(CommandResult::failure(
                    "schedule.generate",
                    "invalid_args",
                    error.to_string(),
                    2,
                ));
            }
        };

        let template = match WorkTemplate::new(
            days,
            args.start.unwrap_or(config.schedule.default_day_start),
            args.end.unwrap_or(config.schedule.default_day_end),
            args.break_minutes.unwrap_or(config.schedule.default_break_minutes),
        ) {
            Ok(template) => template,
            Err(error) => {
                return Ok(CommandResult::failure(
                    "schedule.generate",
                    "invalid_args",
                    error.to_string(),
                    2,
                ));
            }
        };

        let cancelled = match clear_guard(
            "schedule.generate",
            &store,
            specialist,
            args.year,
            args.month,
            args.force,
        )
        .await?
        {
            ClearOutcome::Cancelled(cancelled) => cancelled,
            ClearOutcome::Refused(result) => return Ok(result),
        };

        let removed = schedule::clear_month(&store, specialist, args.year, args.month).await?;
        let created =
            schedule::generate_month(&store, specialist, &template, args.year, args.month).await?;

        Ok(CommandResult::success_with_data(
            "schedule.generate",
            format!("regenerated {}-{:02}", args.year, args.month),
            Some(json!({ "created": created, "removed": removed, "cancelled": cancelled })),
        ))
    })
}

pub fn clear(args: ClearArgs) -> CommandResult {
    with_pool("schedule.clear", |pool, _config| async move {
        let store = SqlSlotStore::new(pool);
        let specialist = SpecialistId(args.specialist);

        let cancelled = match clear_guard(
            "schedule.clear",
            &store,
            specialist,
            args.year,
            args.month,
            args.force,
        )
        .await?
        {
            ClearOutcome::Cancelled(cancelled) => cancelled,
            ClearOutcome::Refused(result) => return Ok(result),
        };

        let removed = schedule::clear_month(&store, specialist, args.year, args.month).await?;
        Ok(CommandResult::success_with_data(
            "schedule.clear",
            format!("cleared {}-{:02}", args.year, args.month),
            Some(json!({ "removed": removed, "cancelled": cancelled })),
        ))
    })
}

pub fn close_day(args: CloseDayArgs) -> CommandResult {
    with_pool("schedule.close-day", |pool, _config| async move {
        let store = SqlSlotStore::new(pool);
        let changed =
            schedule::close_day(&store, SpecialistId(args.specialist), &args.date).await?;
        if changed {
            Ok(CommandResult::success("schedule.close-day", format!("closed {}", args.date)))
        } else {
            Ok(CommandResult::failure(
                "schedule.close-day",
                "nothing_to_close",
                format!("no open slots on {}", args.date),
                1,
            ))
        }
    })
}

pub fn special(args: SpecialArgs) -> CommandResult {
    with_pool("schedule.special", |pool, _config| async move {
        if args.dates.is_empty() {
            return Ok(CommandResult::failure(
                "schedule.special",
                "invalid_args",
                "--dates must name at least one date",
                2,
            ));
        }
        let store = SqlSlotStore::new(pool);
        let created = schedule::apply_special_hours(
            &store,
            SpecialistId(args.specialist),
            &args.dates,
            &args.start,
            &args.end,
        )
        .await?;
        Ok(CommandResult::success_with_data(
            "schedule.special",
            format!("replaced {} date(s)", args.dates.len()),
            Some(json!({ "created": created })),
        ))
    })
}

pub fn block_slot(args: SlotArgs) -> CommandResult {
    with_pool("schedule.block-slot", |pool, _config| async move {
        let service = scheduling_service(&pool);
        if service.block_slot(SlotId(args.slot)).await? {
            Ok(CommandResult::success("schedule.block-slot", format!("closed slot {}", args.slot)))
        } else {
            Ok(CommandResult::failure(
                "schedule.block-slot",
                "not_free",
                format!("slot {} is not free", args.slot),
                1,
            ))
        }
    })
}

pub fn unblock_slot(args: SlotArgs) -> CommandResult {
    with_pool("schedule.unblock-slot", |pool, _config| async move {
        let service = scheduling_service(&pool);
        if service.unblock_slot(SlotId(args.slot)).await? {
            Ok(CommandResult::success(
                "schedule.unblock-slot",
                format!("reopened slot {}", args.slot),
            ))
        } else {
            Ok(CommandResult::failure(
                "schedule.unblock-slot",
                "not_closed",
                format!("slot {} is not closed", args.slot),
                1,
            ))
        }
    })
}

enum ClearOutcome {
    Cancelled(usize),
    Refused(CommandResult),
}

/// Destructive month operations refuse while bookings remain, unless forced;
/// forcing cancels each booked appointment first.
async fn clear_guard(
    command: &'static str,
    store: &dyn SlotStore,
    specialist: SpecialistId,
    year: i32,
    month: u32,
    force: bool,
) -> Result<ClearOutcome, slotbot_core::store::StoreError> {
    let booked = schedule::booked_slots_in_month(store, specialist, year, month).await?;
    if booked.is_empty() {
        return Ok(ClearOutcome::Cancelled(0));
    }
    if !force {
        return Ok(ClearOutcome::Refused(CommandResult::failure(
            command,
            "booked_slots",
            format!(
                "{} booked slot(s) in the month; rerun with --force to cancel them",
                booked.len()
            ),
            7,
        )));
    }

    let mut cancelled = 0;
    for slot in booked {
        if booking::cancel(store, slot.id).await? {
            cancelled += 1;
        }
    }
    Ok(ClearOutcome::Cancelled(cancelled))
}
