use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::reservation::ActingRole;
use crate::shared::{require_field, DomainError};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Account role; each role has its own credential collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Admin,
    PakhshManager,
    Producer,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::PakhshManager => "pakhsh_manager",
            Self::Producer => "producer",
        }
    }

    /// Role used by the status workflow; producers take no workflow decisions.
    pub fn acting_role(&self) -> Option<ActingRole> {
        match self {
            Self::Admin => Some(ActingRole::Admin),
            Self::PakhshManager => Some(ActingRole::Pakhsh),
            Self::Producer => None,
        }
    }
}

impl FromStr for AccountRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "pakhsh_manager" => Ok(Self::PakhshManager),
            "producer" => Ok(Self::Producer),
            other => Err(DomainError::Validation(format!("Unknown role '{}'", other))),
        }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored account; the same shape for every role collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub workplace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, user: NewUser, password_hash: String) -> Self {
        Self {
            id: id.into(),
            username: user.username.trim().to_string(),
            password_hash,
            name: user.name.trim().to_string(),
            email: user.email.unwrap_or_default(),
            phone: user.phone.trim().to_string(),
            workplace: user.workplace.unwrap_or_default(),
            profile_picture_url: None,
        }
    }

    pub fn profile(&self, role: AccountRole) -> Profile {
        Profile {
            id: self.id.clone(),
            username: self.username.clone(),
            role,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            workplace: self.workplace.clone(),
            profile_picture_url: self.profile_picture_url.clone(),
        }
    }

    /// Merge a prepared update field by field.
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(username) = &update.username {
            self.username = username.clone();
        }
        if let Some(hash) = &update.password_hash {
            self.password_hash = hash.clone();
        }
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(phone) = &update.phone {
            self.phone = phone.clone();
        }
        if let Some(workplace) = &update.workplace {
            self.workplace = workplace.clone();
        }
    }
}

/// Public view of an account; never carries the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub role: AccountRole,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub workplace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password: String,
    pub phone: String,
    pub email: Option<String>,
    pub workplace: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_field("name", &self.name)?;
        require_field("username", &self.username)?;
        require_field("password", &self.password)?;
        require_field("phone", &self.phone)
    }
}

/// Partial account edit; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub workplace: Option<String>,
}

impl UserPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            require_field("name", name)?;
        }
        if let Some(username) = &self.username {
            require_field("username", username)?;
        }
        if let Some(password) = &self.password {
            require_field("password", password)?;
        }
        if let Some(phone) = &self.phone {
            require_field("phone", phone)?;
        }
        Ok(())
    }

    /// Storage-ready form, with the password already hashed.
    pub fn into_update(self, password_hash: Option<String>) -> UserUpdate {
        UserUpdate {
            username: self.username.map(|u| u.trim().to_string()),
            password_hash,
            name: self.name.map(|n| n.trim().to_string()),
            email: self.email,
            phone: self.phone.map(|p| p.trim().to_string()),
            workplace: self.workplace,
        }
    }
}

/// Update as handed to the repository
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub workplace: Option<String>,
}

pub fn validate_new_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "New password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn new_user(username: &str) -> NewUser {
        NewUser {
            name: "Reza".into(),
            username: username.into(),
            password: "secret123".into(),
            phone: "09121111111".into(),
            email: None,
            workplace: Some("Channel 3".into()),
        }
    }

    #[test]
    fn new_user_requires_phone() {
        let mut u = new_user("reza");
        assert!(u.validate().is_ok());
        u.phone = " ".into();
        assert!(matches!(u.validate(), Err(DomainError::Validation(m)) if m.contains("phone")));
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let record = UserRecord::new("u-1", new_user("reza"), "hash".into());
        assert_eq!(record.email, "");
        assert_eq!(record.workplace, "Channel 3");
    }

    #[test]
    fn patch_without_password_keeps_hash() {
        let mut record = UserRecord::new("u-1", new_user("reza"), "hash".into());
        let patch = UserPatch {
            name: Some("Reza K".into()),
            ..Default::default()
        };
        record.apply(&patch.into_update(None));
        assert_eq!(record.name, "Reza K");
        assert_eq!(record.password_hash, "hash");
        assert_eq!(record.username, "reza");
    }

    #[test]
    fn profile_omits_password_hash() {
        let record = UserRecord::new("u-1", new_user("reza"), "hash".into());
        let json = serde_json::to_value(record.profile(AccountRole::Producer)).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "producer");
    }

    #[test]
    fn stored_record_uses_camel_case() {
        let record = UserRecord::new("u-1", new_user("reza"), "hash".into());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["passwordHash"], "hash");
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_new_password("abc").is_err());
        assert!(validate_new_password("abcdef").is_ok());
    }

    #[test]
    fn only_staff_roles_act_on_the_workflow() {
        assert_eq!(AccountRole::Admin.acting_role(), Some(ActingRole::Admin));
        assert_eq!(AccountRole::PakhshManager.acting_role(), Some(ActingRole::Pakhsh));
        assert_eq!(AccountRole::Producer.acting_role(), None);
    }
}
