pub mod availability;
pub mod booking;
pub mod migrate;
pub mod schedule;
pub mod service;
pub mod specialist;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use slotbot_core::config::{AppConfig, LoadOptions};
use slotbot_core::store::StoreError;
use slotbot_core::SchedulingService;
use slotbot_db::{connect, DbPool, SqlSlotStore};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Shared command scaffolding: load config, bring up a current-thread
/// runtime, connect, run the closure, close the pool. Store failures map to
/// the common `store` error class.
pub(crate) fn with_pool<F, Fut>(command: &'static str, f: F) -> CommandResult
where
    F: FnOnce(DbPool, AppConfig) -> Fut,
    Fut: Future<Output = Result<CommandResult, StoreError>>,
{
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    runtime.block_on(async {
        let pool = match connect(&config.database).await {
            Ok(pool) => pool,
            Err(error) => {
                return CommandResult::failure(
                    command,
                    "db_connectivity",
                    error.to_string(),
                    4,
                );
            }
        };

        let result = f(pool.clone(), config).await;
        pool.close().await;
        match result {
            Ok(result) => result,
            Err(error) => CommandResult::failure(command, "store", error.to_string(), 5),
        }
    })
}

pub(crate) fn scheduling_service(pool: &DbPool) -> SchedulingService {
    SchedulingService::new(Arc::new(SqlSlotStore::new(pool.clone())))
}
