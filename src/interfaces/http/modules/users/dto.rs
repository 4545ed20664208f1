//! User DTOs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::NewUser;
use crate::domain::UserPatch;

/// Create producer / pakhsh manager request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 6, max = 128, message = "password must be 6–128 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    pub email: Option<String>,
    pub workplace: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            name: r.name,
            username: r.username,
            password: r.password,
            phone: r.phone,
            email: r.email,
            workplace: r.workplace,
        }
    }
}

/// Update request; omitted fields stay as they are
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    /// Leave out to keep the current password
    #[validate(length(min = 6, max = 128, message = "password must be 6–128 characters"))]
    pub password: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub workplace: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            name: r.name,
            username: r.username,
            password: r.password,
            phone: r.phone,
            email: r.email,
            workplace: r.workplace,
        }
    }
}
