use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::json;

use slotbot_core::domain::service::{Service, ServiceId};
use slotbot_core::domain::slot::SpecialistId;
use slotbot_core::store::ServiceStore;
use slotbot_db::SqlServiceStore;

use crate::commands::{with_pool, CommandResult};
use crate::{AddServiceArgs, ListServicesArgs};

pub fn add(args: AddServiceArgs) -> CommandResult {
    with_pool("service.add", |pool, _config| async move {
        let cost = match Decimal::from_str(&args.cost) {
            Ok(cost) => cost,
            Err(_) => {
                return Ok(CommandResult::failure(
                    "service.add",
                    "invalid_args",
                    format!("--cost `{}` is not a decimal", args.cost),
                    2,
                ));
            }
        };

        let store = SqlServiceStore::new(pool);
        let id = store
            .add_service(Service {
                id: ServiceId(0),
                specialist_id: SpecialistId(args.specialist),
                name: args.name.clone(),
                duration_minutes: args.duration,
                cost,
            })
            .await?;
        Ok(CommandResult::success_with_data(
            "service.add",
            format!("added {}", args.name),
            Some(json!({ "id": id })),
        ))
    })
}

pub fn list(args: ListServicesArgs) -> CommandResult {
    with_pool("service.list", |pool, _config| async move {
        let store = SqlServiceStore::new(pool);
        let services = store.list_services(SpecialistId(args.specialist)).await?;
        let items: Vec<_> = services
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "name": s.name,
                    "duration_minutes": s.duration_minutes,
                    "slots_needed": s.slots_needed(),
                    "cost": s.cost.to_string(),
                })
            })
            .collect();
        Ok(CommandResult::success_with_data(
            "service.list",
            format!("{} service(s)", items.len()),
            Some(json!({ "services": items })),
        ))
    })
}
