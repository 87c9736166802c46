use slotbot_db::migrations;

use crate::commands::{with_pool, CommandResult};

pub fn run() -> CommandResult {
    with_pool("migrate", |pool, _config| async move {
        match migrations::run_pending(&pool).await {
            Ok(()) => Ok(CommandResult::success("migrate", "applied pending migrations")),
            Err(error) => {
                Ok(CommandResult::failure("migrate", "migration", error.to_string(), 6))
            }
        }
    })
}
