use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use slotbot_core::domain::slot::{ClientId, Slot, SlotId, SlotStatus, SpecialistId};
use slotbot_core::store::{SlotStore, StoreError};

use super::db_err;
use crate::DbPool;

/// Slot rows backed by the `schedule_slot` table.
///
/// The conditional updates put the booking compare-and-set inside a single
/// `UPDATE ... WHERE status = ...` statement, so concurrent writers serialize
/// at the database and the loser sees zero affected rows.
pub struct SqlSlotStore {
    pool: DbPool,
}

impl SqlSlotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, specialist_id, day, start_time, status, client_id";

fn decode_slot(row: &SqliteRow) -> Result<Slot, StoreError> {
    let raw_status: String = row.try_get("status").map_err(db_err)?;
    let status = SlotStatus::parse(&raw_status)
        .ok_or_else(|| StoreError::Decode(format!("unknown slot status `{raw_status}`")))?;
    Ok(Slot {
        id: SlotId(row.try_get("id").map_err(db_err)?),
        specialist_id: SpecialistId(row.try_get("specialist_id").map_err(db_err)?),
        date: row.try_get("day").map_err(db_err)?,
        time: row.try_get("start_time").map_err(db_err)?,
        status,
        client_id: row.try_get::<Option<i64>, _>("client_id").map_err(db_err)?.map(ClientId),
    })
}

#[async_trait::async_trait]
impl SlotStore for SqlSlotStore {
    async fn list_slots(&self, specialist: SpecialistId) -> Result<Vec<Slot>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM schedule_slot WHERE specialist_id = ? ORDER BY id"
        ))
        .bind(specialist.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(decode_slot).collect()
    }

    async fn list_client_slots(&self, client: ClientId) -> Result<Vec<Slot>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM schedule_slot WHERE client_id = ? ORDER BY id"
        ))
        .bind(client.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(decode_slot).collect()
    }

    async fn find_slot(&self, id: SlotId) -> Result<Option<Slot>, StoreError> {
        let row =
            sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM schedule_slot WHERE id = ?"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.as_ref().map(decode_slot).transpose()
    }

    async fn append_slot(
        &self,
        specialist: SpecialistId,
        date: &str,
        time: &str,
    ) -> Result<SlotId, StoreError> {
        let result = sqlx::query(
            "INSERT INTO schedule_slot (specialist_id, day, start_time, status) \
             VALUES (?, ?, ?, 'free')",
        )
        .bind(specialist.0)
        .bind(date)
        .bind(time)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(SlotId(result.last_insert_rowid()))
    }

    async fn update_slot_status(
        &self,
        id: SlotId,
        status: SlotStatus,
        client: Option<ClientId>,
    ) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE schedule_slot SET status = ?, client_id = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(client.map(|c| c.0))
                .bind(id.0)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Backend(format!("slot {id} does not exist")));
        }
        Ok(())
    }

    async fn try_book_slot(&self, id: SlotId, client: ClientId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE schedule_slot SET status = 'booked', client_id = ? \
             WHERE id = ? AND status = 'free'",
        )
        .bind(client.0)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() == 1)
    }

    async fn try_release_slot(&self, id: SlotId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE schedule_slot SET status = 'free', client_id = NULL \
             WHERE id = ? AND status = 'booked'",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_slot(&self, id: SlotId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM schedule_slot WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
