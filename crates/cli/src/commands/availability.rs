use serde_json::json;

use slotbot_core::calendar;
use slotbot_core::domain::slot::SpecialistId;
use slotbot_db::SqlSlotStore;

use crate::commands::{scheduling_service, with_pool, CommandResult};
use crate::{DatesArgs, OverviewArgs, TimesArgs};

pub fn dates(args: DatesArgs) -> CommandResult {
    with_pool("availability.dates", |pool, _config| async move {
        let service = scheduling_service(&pool);
        let today = chrono::Local::now().date_naive();
        let dates = service
            .query_available_dates(
                SpecialistId(args.specialist),
                args.year,
                args.month,
                args.duration,
                today,
            )
            .await?;
        Ok(CommandResult::success_with_data(
            "availability.dates",
            format!("{} available date(s)", dates.len()),
            Some(json!({ "dates": dates })),
        ))
    })
}

pub fn times(args: TimesArgs) -> CommandResult {
    with_pool("availability.times", |pool, _config| async move {
        let service = scheduling_service(&pool);
        let windows = service
            .query_available_start_times(SpecialistId(args.specialist), &args.date, args.duration)
            .await?;
        let starts: Vec<_> = windows
            .iter()
            .map(|window| {
                json!({
                    "start": window.start_time,
                    "end": window.end_time,
                    "slot_ids": window.slot_ids,
                })
            })
            .collect();
        Ok(CommandResult::success_with_data(
            "availability.times",
            format!("{} window(s) on {}", starts.len(), args.date),
            Some(json!({ "windows": starts })),
        ))
    })
}

pub fn overview(args: OverviewArgs) -> CommandResult {
    with_pool("availability.overview", |pool, _config| async move {
        let store = SqlSlotStore::new(pool);
        let overview = calendar::month_overview(
            &store,
            SpecialistId(args.specialist),
            args.year,
            args.month,
        )
        .await?;
        let days: serde_json::Map<String, serde_json::Value> = overview
            .into_iter()
            .map(|(date, status)| (date, json!(status.as_str())))
            .collect();
        Ok(CommandResult::success_with_data(
            "availability.overview",
            format!("{} scheduled day(s)", days.len()),
            Some(json!({ "days": days })),
        ))
    })
}
