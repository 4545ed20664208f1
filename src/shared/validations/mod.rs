use chrono::NaiveTime;

use super::types::DomainError;

pub fn validate_pagination(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).clamp(1, 100);
    (page, limit)
}

/// Reject blank required fields.
pub fn require_field(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Same as [`require_field`] for fields that may be absent altogether.
pub fn require_present(field: &'static str, value: Option<&str>) -> Result<(), DomainError> {
    require_field(field, value.unwrap_or_default())
}

/// Parse a 24h `HH:MM` wall-clock time.
pub fn parse_clock_time(field: &'static str, value: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| DomainError::Validation(format!("{} must be a HH:MM time", field)))
}
