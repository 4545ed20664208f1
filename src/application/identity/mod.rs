//! Identity module: accounts & authentication
//!
//! `UserService` covers account management and password changes;
//! `Authenticator` resolves credentials across the role collections.

pub mod credentials;
pub mod service;

pub use credentials::{AccountStore, Authenticator, CredentialStore};
pub use service::UserService;
