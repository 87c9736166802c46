pub mod availability;
pub mod booking;
pub mod calendar;
pub mod config;
pub mod dates;
pub mod domain;
pub mod errors;
pub mod schedule;
pub mod service;
pub mod store;

pub use availability::{candidate_windows, has_contiguous_capacity, slots_needed, SlotWindow};
pub use booking::BookingOutcome;
pub use calendar::DayStatus;
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::appointment::{group_appointments, Appointment};
pub use domain::service::{Service, ServiceId};
pub use domain::slot::{ClientId, Slot, SlotId, SlotStatus, SpecialistId};
pub use domain::specialist::{Specialist, WorkTemplate};
pub use errors::DomainError;
pub use service::{ReservationResult, SchedulingService};
pub use store::{
    InMemoryServiceStore, InMemorySlotStore, InMemorySpecialistStore, ServiceStore, SlotStore,
    SpecialistStore, StoreError,
};
