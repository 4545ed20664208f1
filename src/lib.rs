//! # Studio Booking
//!
//! Studio reservation requests with a role-gated approval workflow.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Reservation and user aggregates, the status workflow, dashboard filters and repository traits
//! - **application**: Reservation, user management and authentication services
//! - **infrastructure**: JSON-file and in-memory repositories, password hashing, session tokens
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: Error types, pagination and validation helpers
//! - **support**: Graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;
pub mod support;

pub use config::{default_config_path, AppConfig};

// Re-export storage providers
pub use infrastructure::{InMemoryRepositoryProvider, JsonRepositoryProvider};

// Re-export API router
pub use interfaces::http::{create_api_router, AppState};
