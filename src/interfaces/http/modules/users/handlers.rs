//! User management API handlers
//!
//! Admin-only CRUD over the producer and pakhsh-manager collections.
//! Delegates to `UserService` from the application/identity layer.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{CreateUserRequest, UpdateUserRequest};
use crate::application::UserService;
use crate::domain::{AccountRole, DomainError, Profile};
use crate::interfaces::http::common::{api_error, ApiError, ApiResponse, ValidatedJson};

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService>,
}

/// Collection named by the `{role}` path segment
fn collection(segment: &str) -> Result<AccountRole, ApiError> {
    match segment {
        "producers" => Ok(AccountRole::Producer),
        "pakhsh-managers" => Ok(AccountRole::PakhshManager),
        other => Err(api_error(DomainError::NotFound {
            entity: "User collection",
            field: "name",
            value: other.to_string(),
        })),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{role}",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(("role" = String, Path, description = "producers or pakhsh-managers")),
    responses(
        (status = 200, description = "Accounts of the collection", body = ApiResponse<Vec<Profile>>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Unknown collection")
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Path(role): Path<String>,
) -> Result<Json<ApiResponse<Vec<Profile>>>, ApiError> {
    let role = collection(&role)?;
    let users = state.user_service.list(role).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(users)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{role}",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(("role" = String, Path, description = "producers or pakhsh-managers")),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<Profile>),
        (status = 409, description = "Username already taken"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    Path(role): Path<String>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Profile>>), ApiError> {
    let role = collection(&role)?;
    let profile = state
        .user_service
        .add(role, request.into())
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(profile))))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{role}/{id}",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(
        ("role" = String, Path, description = "producers or pakhsh-managers"),
        ("id" = String, Path, description = "Account ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<Profile>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Path((role, id)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let role = collection(&role)?;
    let profile = state
        .user_service
        .update(role, &id, request.into())
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{role}/{id}",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(
        ("role" = String, Path, description = "producers or pakhsh-managers"),
        ("id" = String, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Path((role, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let role = collection(&role)?;
    state
        .user_service
        .delete(role, &id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(())))
}
