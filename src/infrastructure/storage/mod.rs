//! Repository implementations

pub mod json;
mod memory;

pub use json::JsonRepositoryProvider;
pub use memory::{InMemoryRepositoryProvider, InMemoryReservationRepository, InMemoryUserRepository};
