//! Reservation status workflow
//!
//! Role-gated transitions plus the dual-confirmation ledger
//! (`admin_confirmed_at` / `pakhsh_confirmed_at`).
//!
//! The ledger is canonical for "who has approved": `status` records the most
//! recent workflow decision, while the timestamps accumulate and are never
//! cleared. Promotion to `confirmed` is checked against the ledger only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::{ReservationPatch, ReservationRequest, ReservationStatus};
use crate::shared::DomainError;

use ReservationStatus::*;

/// Role acting on a reservation from a dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActingRole {
    Admin,
    Pakhsh,
}

impl ActingRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Pakhsh => "pakhsh",
        }
    }
}

impl std::fmt::Display for ActingRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const FROM_NEW: &[ReservationStatus] = &[New];
const ADMIN_CONFIRM_FROM: &[ReservationStatus] = &[New, Read, PakhshConfirmed];
const ADMIN_CANCEL_FROM: &[ReservationStatus] = &[New, Read, AdminConfirmed, PakhshConfirmed];
const PAKHSH_CONFIRM_FROM: &[ReservationStatus] = &[New, Read, AdminConfirmed];
const PAKHSH_CANCEL_FROM: &[ReservationStatus] = &[New, Read, AdminConfirmed];

/// Statuses `role` may move a record out of when requesting `target`.
/// `None` means the role may never request `target`.
fn allowed_sources(role: ActingRole, target: ReservationStatus) -> Option<&'static [ReservationStatus]> {
    match (role, target) {
        (_, Read) => Some(FROM_NEW),
        (ActingRole::Admin, AdminConfirmed) => Some(ADMIN_CONFIRM_FROM),
        (ActingRole::Admin, Cancelled) => Some(ADMIN_CANCEL_FROM),
        (ActingRole::Pakhsh, PakhshConfirmed) => Some(PAKHSH_CONFIRM_FROM),
        (ActingRole::Pakhsh, Cancelled) => Some(PAKHSH_CANCEL_FROM),
        _ => None,
    }
}

/// Which confirmation is still missing before `confirmed` is allowed.
pub fn missing_confirmation(record: &ReservationRequest) -> Option<&'static str> {
    let admin = record.admin_confirmed_at.is_some();
    let pakhsh = !record.service_type().requires_pakhsh_confirmation()
        || record.pakhsh_confirmed_at.is_some();
    match (admin, pakhsh) {
        (true, true) => None,
        (false, true) => Some("admin"),
        (true, false) => Some("pakhsh"),
        (false, false) => Some("admin and pakhsh"),
    }
}

pub fn is_eligible_for_confirmation(record: &ReservationRequest) -> bool {
    missing_confirmation(record).is_none()
}

fn invalid(record: &ReservationRequest, to: ReservationStatus, role: &str) -> DomainError {
    DomainError::InvalidTransition {
        from: record.status.to_string(),
        to: to.to_string(),
        role: role.to_string(),
    }
}

/// Record the acting role's approval in the ledger. Existing timestamps are kept.
fn stamp(record: &mut ReservationRequest, status: ReservationStatus, now: DateTime<Utc>) {
    match status {
        AdminConfirmed => {
            record.admin_confirmed_at.get_or_insert(now);
        }
        PakhshConfirmed => {
            record.pakhsh_confirmed_at.get_or_insert(now);
        }
        _ => {}
    }
}

/// Apply `requested` to `record` on behalf of `role`.
///
/// Re-requesting the current status is a no-op. On error the record is left
/// exactly as it was.
pub fn apply_status_change(
    record: &mut ReservationRequest,
    requested: ReservationStatus,
    role: ActingRole,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    if record.status.is_terminal() {
        return if record.status == requested {
            Ok(())
        } else {
            Err(invalid(record, requested, role.as_str()))
        };
    }

    if requested == Confirmed {
        if let Some(missing) = missing_confirmation(record) {
            return Err(DomainError::ConfirmationIncomplete { missing });
        }
        if record.status != Confirmed {
            record.status = Confirmed;
            record.updated_at = Some(now);
        }
        return Ok(());
    }

    let sources =
        allowed_sources(role, requested).ok_or_else(|| invalid(record, requested, role.as_str()))?;

    if record.status == requested {
        stamp(record, requested, now);
        return Ok(());
    }
    if !sources.contains(&record.status) {
        return Err(invalid(record, requested, role.as_str()));
    }

    stamp(record, requested, now);
    record.status = requested;
    record.updated_at = Some(now);
    Ok(())
}

/// Administrative close-out of a fully confirmed request.
pub fn finalize(record: &mut ReservationRequest, now: DateTime<Utc>) -> Result<(), DomainError> {
    match record.status {
        Finalized => Ok(()),
        Confirmed => {
            record.status = Finalized;
            record.updated_at = Some(now);
            Ok(())
        }
        _ => Err(invalid(record, Finalized, ActingRole::Admin.as_str())),
    }
}

/// Statuses whose booking details may be edited. Requests in the middle of
/// the admin/pakhsh handshake are frozen until they settle.
const EDITABLE: &[ReservationStatus] = &[New, Read, Confirmed, Finalized];

/// The service type decides which confirmations are required, so it may
/// only change before anyone has signed off.
const SERVICE_TYPE_EDITABLE: &[ReservationStatus] = &[New, Read];

fn edit_refused(record: &ReservationRequest, to: &str, role: ActingRole) -> DomainError {
    DomainError::InvalidTransition {
        from: record.status.to_string(),
        to: to.to_string(),
        role: role.to_string(),
    }
}

/// Check that `patch` may be applied to `record` by `role`.
pub fn check_edit(
    record: &ReservationRequest,
    patch: &ReservationPatch,
    role: ActingRole,
) -> Result<(), DomainError> {
    if !EDITABLE.contains(&record.status) {
        return Err(edit_refused(record, "edited", role));
    }

    let changes_service_type = patch
        .studio_services
        .as_ref()
        .is_some_and(|s| s.service_type != record.service_type());
    if changes_service_type {
        let signed = record.admin_confirmed_at.is_some() || record.pakhsh_confirmed_at.is_some();
        if signed || !SERVICE_TYPE_EDITABLE.contains(&record.status) {
            return Err(edit_refused(record, "service type change", role));
        }
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────
