pub mod appointment;
pub mod service;
pub mod slot;
pub mod specialist;
