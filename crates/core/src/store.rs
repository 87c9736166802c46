//! The tabular persistence boundary.
//!
//! Engines depend only on these traits; the `slotbot-db` crate provides the
//! sqlite-backed implementations and the in-memory ones here back tests and
//! race simulation. The store assigns monotonically increasing row ids that
//! are never reused, even after deletes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::service::{Service, ServiceId};
use crate::domain::slot::{ClientId, Slot, SlotId, SlotStatus, SpecialistId};
use crate::domain::specialist::Specialist;

/// Transport-level store failure. Conflicts and absences are not errors —
/// they surface as `false`/`None` from the operations that can hit them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("row decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Every slot of the specialist, all statuses.
    async fn list_slots(&self, specialist: SpecialistId) -> Result<Vec<Slot>, StoreError>;

    /// Every slot currently booked by the client, across specialists.
    async fn list_client_slots(&self, client: ClientId) -> Result<Vec<Slot>, StoreError>;

    async fn find_slot(&self, id: SlotId) -> Result<Option<Slot>, StoreError>;

    /// Appends a Free slot and returns its id. Ids are strictly increasing
    /// and never reused.
    async fn append_slot(
        &self,
        specialist: SpecialistId,
        date: &str,
        time: &str,
    ) -> Result<SlotId, StoreError>;

    /// Unconditional single-row update. Either fully applies or errors.
    async fn update_slot_status(
        &self,
        id: SlotId,
        status: SlotStatus,
        client: Option<ClientId>,
    ) -> Result<(), StoreError>;

    /// Books the slot only if it is still Free at write time. Returns false
    /// when another writer got there first — the read-then-write race the
    /// booking engine must tolerate.
    async fn try_book_slot(&self, id: SlotId, client: ClientId) -> Result<bool, StoreError>;

    /// Frees the slot only if it is currently Booked.
    async fn try_release_slot(&self, id: SlotId) -> Result<bool, StoreError>;

    async fn delete_slot(&self, id: SlotId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ServiceStore: Send + Sync {
    async fn list_services(&self, specialist: SpecialistId) -> Result<Vec<Service>, StoreError>;
    async fn add_service(&self, service: Service) -> Result<ServiceId, StoreError>;
    async fn find_service(
        &self,
        specialist: SpecialistId,
        name: &str,
    ) -> Result<Option<Service>, StoreError>;
}

#[async_trait]
pub trait SpecialistStore: Send + Sync {
    async fn list_specialists(&self) -> Result<Vec<Specialist>, StoreError>;
    async fn find_specialist(&self, id: SpecialistId) -> Result<Option<Specialist>, StoreError>;
    async fn add_specialist(&self, specialist: Specialist) -> Result<SpecialistId, StoreError>;
}

pub struct InMemorySlotStore {
    slots: RwLock<HashMap<i64, Slot>>,
    next_id: AtomicI64,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self { slots: RwLock::new(HashMap::new()), next_id: AtomicI64::new(1) }
    }
}

impl Default for InMemorySlotStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("store table lock poisoned".to_string())
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn list_slots(&self, specialist: SpecialistId) -> Result<Vec<Slot>, StoreError> {
        let slots = self.slots.read().map_err(lock_poisoned)?;
        let mut rows: Vec<Slot> =
            slots.values().filter(|slot| slot.specialist_id == specialist).cloned().collect();
        rows.sort_by_key(|slot| slot.id);
        Ok(rows)
    }

    async fn list_client_slots(&self, client: ClientId) -> Result<Vec<Slot>, StoreError> {
        let slots = self.slots.read().map_err(lock_poisoned)?;
        let mut rows: Vec<Slot> =
            slots.values().filter(|slot| slot.client_id == Some(client)).cloned().collect();
        rows.sort_by_key(|slot| slot.id);
        Ok(rows)
    }

    async fn find_slot(&self, id: SlotId) -> Result<Option<Slot>, StoreError> {
        let slots = self.slots.read().map_err(lock_poisoned)?;
        Ok(slots.get(&id.0).cloned())
    }

    async fn append_slot(
        &self,
        specialist: SpecialistId,
        date: &str,
        time: &str,
    ) -> Result<SlotId, StoreError> {
        let id = SlotId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let slot = Slot {
            id,
            specialist_id: specialist,
            date: date.to_string(),
            time: time.to_string(),
            status: SlotStatus::Free,
            client_id: None,
        };
        let mut slots = self.slots.write().map_err(lock_poisoned)?;
        slots.insert(id.0, slot);
        Ok(id)
    }

    async fn update_slot_status(
        &self,
        id: SlotId,
        status: SlotStatus,
        client: Option<ClientId>,
    ) -> Result<(), StoreError> {
        let mut slots = self.slots.write().map_err(lock_poisoned)?;
        match slots.get_mut(&id.0) {
            Some(slot) => {
                slot.status = status;
                slot.client_id = client;
                Ok(())
            }
            None => Err(StoreError::Backend(format!("slot {id} does not exist"))),
        }
    }

    async fn try_book_slot(&self, id: SlotId, client: ClientId) -> Result<bool, StoreError> {
        let mut slots = self.slots.write().map_err(lock_poisoned)?;
        match slots.get_mut(&id.0) {
            Some(slot) => Ok(slot.book(client).is_ok()),
            None => Ok(false),
        }
    }

    async fn try_release_slot(&self, id: SlotId) -> Result<bool, StoreError> {
        let mut slots = self.slots.write().map_err(lock_poisoned)?;
        match slots.get_mut(&id.0) {
            Some(slot) => Ok(slot.release().is_ok()),
            None => Ok(false),
        }
    }

    async fn delete_slot(&self, id: SlotId) -> Result<(), StoreError> {
        let mut slots = self.slots.write().map_err(lock_poisoned)?;
        slots.remove(&id.0);
        Ok(())
    }
}

pub struct InMemoryServiceStore {
    services: RwLock<Vec<Service>>,
    next_id: AtomicI64,
}

impl InMemoryServiceStore {
    pub fn new() -> Self {
        Self { services: RwLock::new(Vec::new()), next_id: AtomicI64::new(1) }
    }
}

impl Default for InMemoryServiceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceStore for InMemoryServiceStore {
    async fn list_services(&self, specialist: SpecialistId) -> Result<Vec<Service>, StoreError> {
        let services = self.services.read().map_err(lock_poisoned)?;
        Ok(services.iter().filter(|s| s.specialist_id == specialist).cloned().collect())
    }

    async fn add_service(&self, mut service: Service) -> Result<ServiceId, StoreError> {
        let id = ServiceId(self.next_id.fetch_add(1, Ordering::SeqCst));
        service.id = id;
        let mut services = self.services.write().map_err(lock_poisoned)?;
        services.push(service);
        Ok(id)
    }

    async fn find_service(
        &self,
        specialist: SpecialistId,
        name: &str,
    ) -> Result<Option<Service>, StoreError> {
        let services = self.services.read().map_err(lock_poisoned)?;
        Ok(services
            .iter()
            .find(|s| s.specialist_id == specialist && s.name == name)
            .cloned())
    }
}

pub struct InMemorySpecialistStore {
    specialists: RwLock<Vec<Specialist>>,
    next_id: AtomicI64,
}

impl InMemorySpecialistStore {
    pub fn new() -> Self {
        Self { specialists: RwLock::new(Vec::new()), next_id: AtomicI64::new(1) }
    }
}

impl Default for InMemorySpecialistStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpecialistStore for InMemorySpecialistStore {
    async fn list_specialists(&self) -> Result<Vec<Specialist>, StoreError> {
        let specialists = self.specialists.read().map_err(lock_poisoned)?;
        Ok(specialists.clone())
    }

    async fn find_specialist(&self, id: SpecialistId) -> Result<Option<Specialist>, StoreError> {
        let specialists = self.specialists.read().map_err(lock_poisoned)?;
        Ok(specialists.iter().find(|s| s.id == id).cloned())
    }

    async fn add_specialist(&self, mut specialist: Specialist) -> Result<SpecialistId, StoreError> {
        let id = SpecialistId(self.next_id.fetch_add(1, Ordering::SeqCst));
        specialist.id = id;
        let mut specialists = self.specialists.write().map_err(lock_poisoned)?;
        specialists.push(specialist);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemorySlotStore, SlotStore};
    use crate::domain::slot::{ClientId, SlotStatus, SpecialistId};

    #[tokio::test]
    async fn ids_are_monotonic_and_never_reused() {
        let store = InMemorySlotStore::new();
        let first = store.append_slot(SpecialistId(1), "2026-09-07", "10:00").await.unwrap();
        let second = store.append_slot(SpecialistId(1), "2026-09-07", "10:30").await.unwrap();
        assert!(second > first);

        store.delete_slot(second).await.unwrap();
        let third = store.append_slot(SpecialistId(1), "2026-09-07", "11:00").await.unwrap();
        assert!(third > second);
    }

    #[tokio::test]
    async fn try_book_is_a_compare_and_set() {
        let store = InMemorySlotStore::new();
        let id = store.append_slot(SpecialistId(1), "2026-09-07", "10:00").await.unwrap();

        assert!(store.try_book_slot(id, ClientId(7)).await.unwrap());
        assert!(!store.try_book_slot(id, ClientId(8)).await.unwrap());

        let slot = store.find_slot(id).await.unwrap().unwrap();
        assert_eq!(slot.status, SlotStatus::Booked);
        assert_eq!(slot.client_id, Some(ClientId(7)));
    }

    #[tokio::test]
    async fn release_only_applies_to_booked_slots() {
        let store = InMemorySlotStore::new();
        let id = store.append_slot(SpecialistId(1), "2026-09-07", "10:00").await.unwrap();

        assert!(!store.try_release_slot(id).await.unwrap());
        store.try_book_slot(id, ClientId(7)).await.unwrap();
        assert!(store.try_release_slot(id).await.unwrap());
        assert_eq!(
            store.find_slot(id).await.unwrap().unwrap().status,
            SlotStatus::Free
        );
    }

    #[tokio::test]
    async fn listings_filter_by_owner() {
        let store = InMemorySlotStore::new();
        store.append_slot(SpecialistId(1), "2026-09-07", "10:00").await.unwrap();
        let other = store.append_slot(SpecialistId(2), "2026-09-07", "10:00").await.unwrap();
        store.try_book_slot(other, ClientId(9)).await.unwrap();

        assert_eq!(store.list_slots(SpecialistId(1)).await.unwrap().len(), 1);
        let client_rows = store.list_client_slots(ClientId(9)).await.unwrap();
        assert_eq!(client_rows.len(), 1);
        assert_eq!(client_rows[0].id, other);
    }
}
