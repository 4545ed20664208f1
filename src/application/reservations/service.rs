//! Reservation service: application-layer orchestration
//!
//! HTTP handlers stay thin and delegate here. Every status change goes
//! through `ReservationRepository::modify`, so the workflow engine runs on
//! the freshly read record inside the store's write lock.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::reservation::{
    filters, workflow, ActingRole, DashboardBucket, DashboardCounts, NewReservation,
    RequesterType, ReservationPatch, ReservationRequest, ReservationStatus,
};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::PaginatedResult;

pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
}

/// The signed-in producer behind a submission or an ownership query.
#[derive(Debug, Clone, Copy)]
pub struct ProducerRef<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
}

fn newest_first(records: &mut [ReservationRequest]) {
    records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
}

impl ReservationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    // ── Submission ──────────────────────────────────────────────

    /// Accept a new request. `producer` is the signed-in producer; guests
    /// submit without one.
    pub async fn submit(
        &self,
        mut submission: NewReservation,
        producer: Option<ProducerRef<'_>>,
    ) -> DomainResult<ReservationRequest> {
        match producer {
            Some(p) => {
                submission.requester_type = RequesterType::Producer;
                submission.contact.producer_username = Some(p.username.to_string());
            }
            None if submission.requester_type == RequesterType::Producer => {
                return Err(DomainError::Forbidden(
                    "Producer requests require a producer session".into(),
                ));
            }
            None => {}
        }
        submission.validate()?;

        let mut reservation =
            ReservationRequest::submit(Uuid::new_v4().to_string(), submission, Utc::now());
        reservation.producer_id = producer.map(|p| p.user_id.to_string());
        self.repos.reservations().insert(reservation.clone()).await?;

        info!(
            reservation_id = %reservation.id,
            requester = ?reservation.requester_type,
            service_type = ?reservation.service_type(),
            "Reservation submitted"
        );
        Ok(reservation)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get(&self, id: &str) -> DomainResult<ReservationRequest> {
        self.repos
            .reservations()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", id))
    }

    /// Every reservation, newest first.
    pub async fn list(&self) -> DomainResult<Vec<ReservationRequest>> {
        let mut all = self.repos.reservations().list_all().await?;
        newest_first(&mut all);
        Ok(all)
    }

    /// A producer's own submissions, newest first.
    pub async fn list_own(
        &self,
        producer: ProducerRef<'_>,
    ) -> DomainResult<Vec<ReservationRequest>> {
        let mut own: Vec<_> = self
            .repos
            .reservations()
            .list_all()
            .await?
            .into_iter()
            .filter(|r| r.is_owned_by(producer.user_id, producer.username))
            .collect();
        newest_first(&mut own);
        Ok(own)
    }

    /// One page of a dashboard bucket as seen by `role`.
    pub async fn dashboard(
        &self,
        role: ActingRole,
        bucket: DashboardBucket,
        page: u32,
        limit: u32,
    ) -> DomainResult<PaginatedResult<ReservationRequest>> {
        let all = self.list().await?;
        let view: Vec<_> = filters::filter_bucket(&all, role, bucket)
            .into_iter()
            .cloned()
            .collect();
        Ok(PaginatedResult::from_vec(view, page, limit))
    }

    pub async fn counts(&self, role: ActingRole) -> DomainResult<DashboardCounts> {
        let all = self.repos.reservations().list_all().await?;
        Ok(filters::counts(&all, role))
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Apply a dashboard decision through the status workflow.
    pub async fn update_status(
        &self,
        id: &str,
        status: ReservationStatus,
        role: ActingRole,
    ) -> DomainResult<ReservationRequest> {
        let updated = self
            .repos
            .reservations()
            .modify(
                id,
                Box::new(move |r: &mut ReservationRequest| {
                    workflow::apply_status_change(r, status, role, Utc::now())
                }),
            )
            .await?;

        info!(
            reservation_id = %id,
            status = %updated.status,
            role = %role,
            "Reservation status updated"
        );
        Ok(updated)
    }

    /// Edit the booking details. Requests mid-handshake or cancelled are
    /// frozen, and the service type is fixed once anyone has signed off.
    pub async fn edit(
        &self,
        id: &str,
        patch: ReservationPatch,
        role: ActingRole,
    ) -> DomainResult<ReservationRequest> {
        if patch.is_empty() {
            return Err(DomainError::Validation("Nothing to update".into()));
        }

        let updated = self
            .repos
            .reservations()
            .modify(
                id,
                Box::new(move |r: &mut ReservationRequest| {
                    workflow::check_edit(r, &patch, role)?;
                    patch.apply(r)?;
                    r.updated_at = Some(Utc::now());
                    Ok(())
                }),
            )
            .await?;

        info!(reservation_id = %id, role = %role, "Reservation edited");
        Ok(updated)
    }

    /// Admin close-out of a confirmed request.
    pub async fn finalize(&self, id: &str) -> DomainResult<ReservationRequest> {
        let updated = self
            .repos
            .reservations()
            .modify(
                id,
                Box::new(|r: &mut ReservationRequest| workflow::finalize(r, Utc::now())),
            )
            .await?;

        info!(reservation_id = %id, "Reservation finalized");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        self.repos.reservations().delete(id).await?;
        info!(reservation_id = %id, "Reservation deleted");
        Ok(())
    }

    /// Purge the rejected bucket; returns how many were removed.
    pub async fn delete_all_rejected(&self) -> DomainResult<usize> {
        let removed = self
            .repos
            .reservations()
            .delete_all_with_status(ReservationStatus::Cancelled)
            .await?;
        info!(removed, "Rejected reservations deleted");
        Ok(removed)
    }
}
