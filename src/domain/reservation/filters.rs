//! Dashboard partitioning of the reservation list
//!
//! Each role's pending queue lists the requests still missing that role's
//! decision, including those the other role has already approved.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::{ReservationRequest, ReservationStatus};
use super::workflow::ActingRole;
use crate::shared::DomainError;

use ReservationStatus::*;

const ADMIN_PENDING: &[ReservationStatus] = &[New, Read, PakhshConfirmed];
const PAKHSH_PENDING: &[ReservationStatus] = &[New, Read, AdminConfirmed];
const FINALIZED: &[ReservationStatus] = &[Confirmed, Finalized];
const REJECTED: &[ReservationStatus] = &[Cancelled];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DashboardBucket {
    Pending,
    Finalized,
    Rejected,
}

impl FromStr for DashboardBucket {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "finalized" => Ok(Self::Finalized),
            "rejected" => Ok(Self::Rejected),
            other => Err(DomainError::Validation(format!(
                "Unknown dashboard bucket '{}'",
                other
            ))),
        }
    }
}

pub fn bucket_statuses(role: ActingRole, bucket: DashboardBucket) -> &'static [ReservationStatus] {
    match (bucket, role) {
        (DashboardBucket::Pending, ActingRole::Admin) => ADMIN_PENDING,
        (DashboardBucket::Pending, ActingRole::Pakhsh) => PAKHSH_PENDING,
        (DashboardBucket::Finalized, _) => FINALIZED,
        (DashboardBucket::Rejected, _) => REJECTED,
    }
}

/// Records of `bucket` as seen by `role`, in input order.
pub fn filter_bucket<'a>(
    records: &'a [ReservationRequest],
    role: ActingRole,
    bucket: DashboardBucket,
) -> Vec<&'a ReservationRequest> {
    let statuses = bucket_statuses(role, bucket);
    records
        .iter()
        .filter(|r| statuses.contains(&r.status))
        .collect()
}

pub fn admin_pending(records: &[ReservationRequest]) -> Vec<&ReservationRequest> {
    filter_bucket(records, ActingRole::Admin, DashboardBucket::Pending)
}

pub fn pakhsh_pending(records: &[ReservationRequest]) -> Vec<&ReservationRequest> {
    filter_bucket(records, ActingRole::Pakhsh, DashboardBucket::Pending)
}

pub fn finalized(records: &[ReservationRequest]) -> Vec<&ReservationRequest> {
    filter_bucket(records, ActingRole::Admin, DashboardBucket::Finalized)
}

pub fn rejected(records: &[ReservationRequest]) -> Vec<&ReservationRequest> {
    filter_bucket(records, ActingRole::Admin, DashboardBucket::Rejected)
}

/// Bucket sizes for one role's dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardCounts {
    pub pending: usize,
    pub finalized: usize,
    pub rejected: usize,
}

pub fn counts(records: &[ReservationRequest], role: ActingRole) -> DashboardCounts {
    DashboardCounts {
        pending: filter_bucket(records, role, DashboardBucket::Pending).len(),
        finalized: finalized(records).len(),
        rejected: rejected(records).len(),
    }
}
