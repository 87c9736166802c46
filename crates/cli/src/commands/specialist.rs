use serde_json::json;

use slotbot_core::domain::slot::SpecialistId;
use slotbot_core::domain::specialist::Specialist;
use slotbot_core::store::SpecialistStore;
use slotbot_db::SqlSpecialistStore;

use crate::commands::{with_pool, CommandResult};
use crate::AddSpecialistArgs;

pub fn add(args: AddSpecialistArgs) -> CommandResult {
    with_pool("specialist.add", |pool, _config| async move {
        let store = SqlSpecialistStore::new(pool);
        let id = store
            .add_specialist(Specialist {
                id: SpecialistId(0),
                name: args.name.clone(),
                specialization: args.specialization,
                timezone: args.timezone,
            })
            .await?;
        Ok(CommandResult::success_with_data(
            "specialist.add",
            format!("registered {}", args.name),
            Some(json!({ "id": id })),
        ))
    })
}

pub fn list() -> CommandResult {
    with_pool("specialist.list", |pool, _config| async move {
        let store = SqlSpecialistStore::new(pool);
        let specialists = store.list_specialists().await?;
        let items: Vec<_> = specialists
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "name": s.name,
                    "specialization": s.specialization,
                    "timezone": s.timezone,
                })
            })
            .collect();
        Ok(CommandResult::success_with_data(
            "specialist.list",
            format!("{} specialist(s)", items.len()),
            Some(json!({ "specialists": items })),
        ))
    })
}
