pub mod identity;
pub mod reservations;

// Re-export key types for convenience
pub use identity::{AccountStore, Authenticator, CredentialStore, UserService};
pub use reservations::{ProducerRef, ReservationService};
