//! Studio reservation request entity

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::{parse_clock_time, require_field, require_present, DomainError};

/// Workflow status of a reservation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Submitted, unseen
    New,
    /// Seen by admin or pakhsh manager, no decision yet
    Read,
    /// Approved by the admin
    AdminConfirmed,
    /// Approved by the pakhsh manager
    PakhshConfirmed,
    /// Fully approved
    Confirmed,
    /// Rejected by either role
    Cancelled,
    /// Administratively closed after confirmation
    Finalized,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 7] = [
        Self::New,
        Self::Read,
        Self::AdminConfirmed,
        Self::PakhshConfirmed,
        Self::Confirmed,
        Self::Cancelled,
        Self::Finalized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Read => "read",
            Self::AdminConfirmed => "admin_confirmed",
            Self::PakhshConfirmed => "pakhsh_confirmed",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Finalized => "finalized",
        }
    }

    /// No workflow transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Finalized)
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("Unknown reservation status '{}'", s)))
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who submitted the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequesterType {
    Guest,
    Producer,
}

/// Studio service flavour; decides which confirmations are required
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    WithCrew,
    WithoutCrew,
}

impl ServiceType {
    /// `with_crew` bookings need the pakhsh manager's sign-off as well as the admin's.
    pub fn requires_pakhsh_confirmation(&self) -> bool {
        matches!(self, Self::WithCrew)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudioServices {
    pub service_type: ServiceType,
    pub number_of_days: u32,
    pub hours_per_day: u32,
}

/// Requested date and daily time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSchedule {
    #[schema(value_type = String, format = Date)]
    pub reservation_date: NaiveDate,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
}

impl ReservationSchedule {
    fn validate(&self) -> Result<(), DomainError> {
        let start = parse_clock_time("startTime", &self.start_time)?;
        let end = parse_clock_time("endTime", &self.end_time)?;
        if start >= end {
            return Err(DomainError::Validation(
                "endTime must be later than startTime".into(),
            ));
        }
        Ok(())
    }
}

/// Contact details of the person asking for the studio
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequesterContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_workplace: Option<String>,
}

impl RequesterContact {
    fn validate(&self, requester_type: RequesterType) -> Result<(), DomainError> {
        match requester_type {
            RequesterType::Guest => {
                require_present("guestName", self.guest_name.as_deref())?;
                require_present("guestPhone", self.guest_phone.as_deref())
            }
            RequesterType::Producer => {
                require_present("producerUsername", self.producer_username.as_deref())?;
                require_present("producerName", self.producer_name.as_deref())
            }
        }
    }
}

/// A studio-use request moving through the approval workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub id: String,
    pub program_name: String,
    pub requester_type: RequesterType,
    #[serde(flatten)]
    pub contact: RequesterContact,
    /// Account id of the submitting producer. Survives username changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_id: Option<String>,
    pub date_time: ReservationSchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition: Option<String>,
    pub studio_services: StudioServices,
    #[serde(default)]
    pub additional_services: Vec<String>,
    #[serde(default)]
    pub catering_services: Vec<String>,
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pakhsh_confirmed_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReservationRequest {
    /// Build a fresh `new` request from a validated submission.
    pub fn submit(id: impl Into<String>, request: NewReservation, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            program_name: request.program_name.trim().to_string(),
            requester_type: request.requester_type,
            contact: request.contact,
            producer_id: None,
            date_time: request.date_time,
            repetition: request.repetition,
            studio_services: request.studio_services,
            additional_services: request.additional_services,
            catering_services: request.catering_services,
            status: ReservationStatus::New,
            admin_confirmed_at: None,
            pakhsh_confirmed_at: None,
            submitted_at: now,
            updated_at: None,
        }
    }

    pub fn service_type(&self) -> ServiceType {
        self.studio_services.service_type
    }

    /// Records written before `producer_id` existed fall back to the
    /// username captured at submission.
    pub fn is_owned_by(&self, user_id: &str, username: &str) -> bool {
        if self.requester_type != RequesterType::Producer {
            return false;
        }
        match &self.producer_id {
            Some(id) => id == user_id,
            None => self.contact.producer_username.as_deref() == Some(username),
        }
    }
}

/// Submission payload for a new request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub program_name: String,
    pub requester_type: RequesterType,
    #[serde(flatten)]
    pub contact: RequesterContact,
    pub date_time: ReservationSchedule,
    #[serde(default)]
    pub repetition: Option<String>,
    pub studio_services: StudioServices,
    #[serde(default)]
    pub additional_services: Vec<String>,
    #[serde(default)]
    pub catering_services: Vec<String>,
}

impl NewReservation {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_field("programName", &self.program_name)?;
        self.contact.validate(self.requester_type)?;
        self.date_time.validate()?;
        validate_services(&self.studio_services)
    }
}

fn validate_services(services: &StudioServices) -> Result<(), DomainError> {
    if services.number_of_days == 0 {
        return Err(DomainError::Validation(
            "numberOfDays must be at least 1".into(),
        ));
    }
    if !(1..=24).contains(&services.hours_per_day) {
        return Err(DomainError::Validation(
            "hoursPerDay must be between 1 and 24".into(),
        ));
    }
    Ok(())
}

/// Direct edit of the booking payload; `None` leaves a field unchanged.
///
/// Status and confirmation timestamps only move through the workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPatch {
    pub program_name: Option<String>,
    pub contact: Option<RequesterContact>,
    pub date_time: Option<ReservationSchedule>,
    pub repetition: Option<String>,
    pub studio_services: Option<StudioServices>,
    pub additional_services: Option<Vec<String>>,
    pub catering_services: Option<Vec<String>>,
}

impl ReservationPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Validate the patch against the record and write it in place.
    pub fn apply(self, record: &mut ReservationRequest) -> Result<(), DomainError> {
        if let Some(name) = &self.program_name {
            require_field("programName", name)?;
        }
        if let Some(contact) = &self.contact {
            contact.validate(record.requester_type)?;
        }
        if let Some(schedule) = &self.date_time {
            schedule.validate()?;
        }
        if let Some(services) = &self.studio_services {
            validate_services(services)?;
        }

        if let Some(name) = self.program_name {
            record.program_name = name.trim().to_string();
        }
        if let Some(contact) = self.contact {
            record.contact = contact;
        }
        if let Some(schedule) = self.date_time {
            record.date_time = schedule;
        }
        if let Some(repetition) = self.repetition {
            record.repetition = Some(repetition);
        }
        if let Some(services) = self.studio_services {
            record.studio_services = services;
        }
        if let Some(extra) = self.additional_services {
            record.additional_services = extra;
        }
        if let Some(catering) = self.catering_services {
            record.catering_services = catering;
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn guest_submission(service_type: ServiceType) -> NewReservation {
        NewReservation {
            program_name: "Evening News".into(),
            requester_type: RequesterType::Guest,
            contact: RequesterContact {
                guest_name: Some("Sara".into()),
                guest_phone: Some("09120000000".into()),
                ..Default::default()
            },
            date_time: ReservationSchedule {
                reservation_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
                start_time: "10:00".into(),
                end_time: "13:30".into(),
            },
            repetition: None,
            studio_services: StudioServices {
                service_type,
                number_of_days: 1,
                hours_per_day: 3,
            },
            additional_services: vec!["teleprompter".into()],
            catering_services: vec![],
        }
    }

    pub(crate) fn sample_request(id: &str, service_type: ServiceType) -> ReservationRequest {
        ReservationRequest::submit(id, guest_submission(service_type), Utc::now())
    }

    #[test]
    fn submitted_request_starts_new_without_confirmations() {
        let r = sample_request("r-1", ServiceType::WithCrew);
        assert_eq!(r.status, ReservationStatus::New);
        assert!(r.admin_confirmed_at.is_none());
        assert!(r.pakhsh_confirmed_at.is_none());
        assert!(r.updated_at.is_none());
    }

    #[test]
    fn status_parses_wire_names() {
        assert_eq!(
            "pakhsh_confirmed".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::PakhshConfirmed
        );
        assert!("approved".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn only_cancelled_and_finalized_are_terminal() {
        let terminal: Vec<_> = ReservationStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![ReservationStatus::Cancelled, ReservationStatus::Finalized]
        );
    }

    #[test]
    fn guest_submission_requires_guest_contact() {
        let mut s = guest_submission(ServiceType::WithoutCrew);
        s.contact.guest_phone = None;
        assert!(matches!(s.validate(), Err(DomainError::Validation(m)) if m.contains("guestPhone")));
    }

    #[test]
    fn producer_submission_requires_producer_identity() {
        let mut s = guest_submission(ServiceType::WithoutCrew);
        s.requester_type = RequesterType::Producer;
        assert!(s.validate().is_err());

        s.contact.producer_username = Some("ali".into());
        s.contact.producer_name = Some("Ali".into());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn end_time_must_follow_start_time() {
        let mut s = guest_submission(ServiceType::WithCrew);
        s.date_time.end_time = "09:00".into();
        assert!(s.validate().is_err());
    }

    #[test]
    fn service_quantities_are_checked() {
        let mut s = guest_submission(ServiceType::WithCrew);
        s.studio_services.number_of_days = 0;
        assert!(s.validate().is_err());

        let mut s = guest_submission(ServiceType::WithCrew);
        s.studio_services.hours_per_day = 25;
        assert!(s.validate().is_err());
    }

    #[test]
    fn patch_updates_payload_only() {
        let mut r = sample_request("r-2", ServiceType::WithoutCrew);
        let patch = ReservationPatch {
            program_name: Some("Morning Show".into()),
            catering_services: Some(vec!["tea".into()]),
            ..Default::default()
        };
        patch.apply(&mut r).unwrap();
        assert_eq!(r.program_name, "Morning Show");
        assert_eq!(r.catering_services, vec!["tea".to_string()]);
        assert_eq!(r.additional_services, vec!["teleprompter".to_string()]);
        assert_eq!(r.status, ReservationStatus::New);
    }

    #[test]
    fn invalid_patch_leaves_record_untouched() {
        let mut r = sample_request("r-3", ServiceType::WithoutCrew);
        let before = r.clone();
        let patch = ReservationPatch {
            program_name: Some("Renamed".into()),
            date_time: Some(ReservationSchedule {
                reservation_date: before.date_time.reservation_date,
                start_time: "18:00".into(),
                end_time: "17:00".into(),
            }),
            ..Default::default()
        };
        assert!(patch.apply(&mut r).is_err());
        assert_eq!(r, before);
    }

    #[test]
    fn persisted_shape_uses_camel_case() {
        let r = sample_request("r-4", ServiceType::WithCrew);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "new");
        assert_eq!(json["studioServices"]["serviceType"], "with_crew");
        assert_eq!(json["guestName"], "Sara");
        assert!(json.get("adminConfirmedAt").is_none());

        let back: ReservationRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}
