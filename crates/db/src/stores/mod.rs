use slotbot_core::store::StoreError;

pub mod service;
pub mod slot;
pub mod specialist;

pub use service::SqlServiceStore;
pub use slot::SqlSlotStore;
pub use specialist::SqlSpecialistStore;

pub(crate) fn db_err(error: sqlx::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}
