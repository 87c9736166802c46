use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use slotbot_core::config::DatabaseConfig;

    use super::run_pending;
    use crate::{connect, migrations::MIGRATOR};

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            timeout_secs: 30,
            busy_timeout_ms: 5_000,
        }
    }

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "specialist",
        "service",
        "schedule_slot",
        "idx_service_specialist_id",
        "idx_schedule_slot_specialist_day",
        "idx_schedule_slot_client_id",
        "idx_schedule_slot_status",
    ];

    #[tokio::test]
    async fn migrations_create_baseline_tables() {
        let pool = connect(&memory_config()).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        for table in ["specialist", "service", "schedule_slot"] {
            let count = sqlx::query(
                "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .expect("check table")
            .get::<i64, _>("count");
            assert_eq!(count, 1, "table {table} should exist");
        }
    }

    #[tokio::test]
    async fn slot_ids_autoincrement_and_never_recycle() {
        let pool = connect(&memory_config()).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        sqlx::query("INSERT INTO specialist (name) VALUES ('a')")
            .execute(&pool)
            .await
            .expect("insert specialist");
        let insert = "INSERT INTO schedule_slot (specialist_id, day, start_time) \
                      VALUES (1, '2026-09-07', '10:00')";
        let first =
            sqlx::query(insert).execute(&pool).await.expect("insert slot").last_insert_rowid();
        let second =
            sqlx::query(insert).execute(&pool).await.expect("insert slot").last_insert_rowid();
        sqlx::query("DELETE FROM schedule_slot WHERE id = ?")
            .bind(second)
            .execute(&pool)
            .await
            .expect("delete slot");
        let third =
            sqlx::query(insert).execute(&pool).await.expect("insert slot").last_insert_rowid();

        assert!(second > first);
        assert!(third > second, "AUTOINCREMENT must not recycle deleted ids");
    }

    #[tokio::test]
    async fn migrations_are_reversible() {
        let pool = connect(&memory_config()).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");

        let count = sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master \
             WHERE type = 'table' AND name = 'schedule_slot'",
        )
        .fetch_one(&pool)
        .await
        .expect("check schedule_slot removed")
        .get::<i64, _>("count");

        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn migrations_up_down_up_preserves_schema_signature() {
        let pool = connect(&memory_config()).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let initial_signature = managed_schema_signature(&pool).await;
        assert_eq!(
            initial_signature.len(),
            MANAGED_SCHEMA_OBJECTS.len(),
            "initial migration pass should create all managed schema objects",
        );

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");

        let after_down_signature = managed_schema_signature(&pool).await;
        assert!(
            after_down_signature.is_empty(),
            "managed schema objects should be removed after full undo",
        );

        run_pending(&pool).await.expect("re-run migrations");

        let after_second_up_signature = managed_schema_signature(&pool).await;
        assert_eq!(
            after_second_up_signature, initial_signature,
            "up/down/up should preserve migration-managed schema signature",
        );
    }

    async fn managed_schema_signature(pool: &sqlx::SqlitePool) -> Vec<(String, String, String)> {
        let mut signature: Vec<(String, String, String)> = sqlx::query(
            "SELECT type, name, IFNULL(sql, '') AS sql
             FROM sqlite_master
             WHERE type IN ('table', 'index')",
        )
        .fetch_all(pool)
        .await
        .expect("load schema objects")
        .into_iter()
        .filter_map(|row| {
            let name = row.get::<String, _>("name");
            if MANAGED_SCHEMA_OBJECTS.contains(&name.as_str()) {
                Some((row.get::<String, _>("type"), name, row.get::<String, _>("sql")))
            } else {
                None
            }
        })
        .collect();
        signature.sort();
        signature
    }
}
