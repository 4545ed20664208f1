//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to the reservation and account collections
//! - `DomainResult`: standard result type for domain operations

use super::reservation::ReservationRepository;
use super::user::{AccountRole, UserRepository};
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the collection they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let all = repos.reservations().list_all().await?;
///     let admin = repos.users(AccountRole::Admin).find_by_username("admin").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn reservations(&self) -> &dyn ReservationRepository;
    /// Credential collection of one role
    fn users(&self, role: AccountRole) -> &dyn UserRepository;
}
