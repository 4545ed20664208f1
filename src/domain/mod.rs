pub mod repositories;
pub mod reservation;
pub mod user;

// Re-export commonly used types
pub use repositories::{DomainResult, RepositoryProvider};
pub use reservation::{
    ActingRole, DashboardBucket, ReservationPatch, ReservationRepository, ReservationRequest,
    ReservationStatus, ServiceType,
};
pub use user::{AccountRole, Profile, UserPatch, UserRecord, UserRepository};

pub use crate::shared::DomainError;
