pub mod connection;
pub mod migrations;
pub mod stores;

pub use connection::{connect, DbPool};
pub use stores::{SqlServiceStore, SqlSlotStore, SqlSpecialistStore};
