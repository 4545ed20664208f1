//! Reservations module: submission, workflow decisions and dashboards

pub mod service;

pub use service::{ProducerRef, ReservationService};
