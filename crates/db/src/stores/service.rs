use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use slotbot_core::domain::service::{Service, ServiceId};
use slotbot_core::domain::slot::SpecialistId;
use slotbot_core::store::{ServiceStore, StoreError};

use super::db_err;
use crate::DbPool;

/// Service catalog rows. Costs travel as canonical decimal strings; sqlite
/// has no decimal affinity worth trusting.
pub struct SqlServiceStore {
    pool: DbPool,
}

impl SqlServiceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_service(row: &SqliteRow) -> Result<Service, StoreError> {
    let raw_cost: String = row.try_get("cost").map_err(db_err)?;
    let cost = Decimal::from_str(&raw_cost)
        .map_err(|_| StoreError::Decode(format!("service cost `{raw_cost}` is not a decimal")))?;
    let duration: i64 = row.try_get("duration_minutes").map_err(db_err)?;
    Ok(Service {
        id: ServiceId(row.try_get("id").map_err(db_err)?),
        specialist_id: SpecialistId(row.try_get("specialist_id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        duration_minutes: u32::try_from(duration)
            .map_err(|_| StoreError::Decode(format!("negative service duration {duration}")))?,
        cost,
    })
}

#[async_trait::async_trait]
impl ServiceStore for SqlServiceStore {
    async fn list_services(&self, specialist: SpecialistId) -> Result<Vec<Service>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, specialist_id, name, duration_minutes, cost \
             FROM service WHERE specialist_id = ? ORDER BY id",
        )
        .bind(specialist.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(decode_service).collect()
    }

    async fn add_service(&self, service: Service) -> Result<ServiceId, StoreError> {
        let result = sqlx::query(
            "INSERT INTO service (specialist_id, name, duration_minutes, cost) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(service.specialist_id.0)
        .bind(&service.name)
        .bind(i64::from(service.duration_minutes))
        .bind(service.cost.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(ServiceId(result.last_insert_rowid()))
    }

    async fn find_service(
        &self,
        specialist: SpecialistId,
        name: &str,
    ) -> Result<Option<Service>, StoreError> {
        let row = sqlx::query(
            "SELECT id, specialist_id, name, duration_minutes, cost \
             FROM service WHERE specialist_id = ? AND name = ?",
        )
        .bind(specialist.0)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(decode_service).transpose()
    }
}
