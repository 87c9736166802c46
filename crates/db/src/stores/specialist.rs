use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use slotbot_core::domain::slot::SpecialistId;
use slotbot_core::domain::specialist::Specialist;
use slotbot_core::store::{SpecialistStore, StoreError};

use super::db_err;
use crate::DbPool;

pub struct SqlSpecialistStore {
    pool: DbPool,
}

impl SqlSpecialistStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_specialist(row: &SqliteRow) -> Result<Specialist, StoreError> {
    Ok(Specialist {
        id: SpecialistId(row.try_get("id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        specialization: row.try_get("specialization").map_err(db_err)?,
        timezone: row.try_get("timezone").map_err(db_err)?,
    })
}

#[async_trait::async_trait]
impl SpecialistStore for SqlSpecialistStore {
    async fn list_specialists(&self) -> Result<Vec<Specialist>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, specialization, timezone FROM specialist ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(decode_specialist).collect()
    }

    async fn find_specialist(&self, id: SpecialistId) -> Result<Option<Specialist>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, specialization, timezone FROM specialist WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(decode_specialist).transpose()
    }

    async fn add_specialist(&self, specialist: Specialist) -> Result<SpecialistId, StoreError> {
        let result = sqlx::query(
            "INSERT INTO specialist (name, specialization, timezone) VALUES (?, ?, ?)",
        )
        .bind(&specialist.name)
        .bind(&specialist.specialization)
        .bind(&specialist.timezone)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(SpecialistId(result.last_insert_rowid()))
    }
}
