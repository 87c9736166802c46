use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use slotbot_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// Opens the sqlite pool the configuration describes. Every new connection
/// gets the same pragmas: enforced foreign keys, WAL so readers do not block
/// the writer, and the configured busy timeout so contending writers queue
/// instead of failing immediately.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let busy_timeout_ms = config.busy_timeout_ms.max(1);
    SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query(&format!("PRAGMA busy_timeout = {busy_timeout_ms}"))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
}
