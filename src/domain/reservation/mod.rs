//! Reservation aggregate
//!
//! Contains the reservation request entity, the status workflow, the
//! dashboard filters and the repository interface.

pub mod filters;
pub mod model;
pub mod repository;
pub mod workflow;

pub use filters::{DashboardBucket, DashboardCounts};
pub use model::{
    NewReservation, RequesterContact, RequesterType, ReservationPatch, ReservationRequest,
    ReservationSchedule, ReservationStatus, ServiceType, StudioServices,
};
pub use repository::{ReservationMutation, ReservationRepository};
pub use workflow::{apply_status_change, ActingRole};
