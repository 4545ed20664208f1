//! Reservation DTOs
//!
//! Requests and reservations travel in their domain shape
//! (`NewReservation`, `ReservationPatch`, `ReservationRequest`).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ReservationStatus;

/// Workflow decision from a dashboard
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: ReservationStatus,
}

/// Result of purging the rejected bucket
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteRejectedResponse {
    pub removed: usize,
}
