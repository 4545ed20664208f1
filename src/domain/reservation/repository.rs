//! Reservation repository interface

use async_trait::async_trait;

use super::model::{ReservationRequest, ReservationStatus};
use crate::domain::DomainResult;

/// Change applied to one record inside the store's write lock.
pub type ReservationMutation =
    Box<dyn FnOnce(&mut ReservationRequest) -> DomainResult<()> + Send>;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// All reservations, in storage order
    async fn list_all(&self) -> DomainResult<Vec<ReservationRequest>>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ReservationRequest>>;

    /// Persist a newly submitted reservation
    async fn insert(&self, reservation: ReservationRequest) -> DomainResult<()>;

    /// Read the current record, apply `mutation` and write it back as one
    /// step. Concurrent calls on the same id are serialized, and nothing is
    /// written when the mutation fails.
    async fn modify(
        &self,
        id: &str,
        mutation: ReservationMutation,
    ) -> DomainResult<ReservationRequest>;

    /// Delete by id; `NotFound` when absent
    async fn delete(&self, id: &str) -> DomainResult<()>;

    /// Delete every reservation in `status`, returning how many were removed
    async fn delete_all_with_status(&self, status: ReservationStatus) -> DomainResult<usize>;
}
