//! Authentication API handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::header::{HeaderName, SET_COOKIE},
    Json,
};

use super::dto::{ChangePasswordRequest, LoginRequest, LoginResponse};
use crate::application::{Authenticator, UserService};
use crate::domain::Profile;
use crate::infrastructure::crypto::create_token;
use crate::interfaces::http::common::{api_error, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::{AuthState, Session};

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub authenticator: Arc<Authenticator>,
    pub user_service: Arc<UserService>,
    pub auth: AuthState,
}

type WithCookie<T> = ([(HeaderName, String); 1], Json<ApiResponse<T>>);

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid username or password"),
        (status = 422, description = "Missing field")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<WithCookie<LoginResponse>, ApiError> {
    let profile = state
        .authenticator
        .authenticate(&request.username, &request.password)
        .await
        .map_err(api_error)?;

    let jwt = &state.auth.jwt_config;
    let token = create_token(&profile.id, &profile.username, profile.role, jwt)
        .map_err(|e| api_error(e.into()))?;

    let cookie = state.auth.cookie.issue(&token);
    Ok((
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::success(LoginResponse {
            token,
            token_type: "Bearer".into(),
            expires_in: jwt.expires_in_secs(),
            user: profile,
        })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Session cookie cleared"))
)]
pub async fn logout(State(state): State<AuthHandlerState>) -> WithCookie<()> {
    (
        [(SET_COOKIE, state.auth.cookie.clear())],
        Json(ApiResponse::success(())),
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Signed-in account", body = ApiResponse<Profile>),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    session: Session,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let profile = state
        .user_service
        .profile(session.role, &session.user_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/change-password",
    tag = "Authentication",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password is wrong"),
        (status = 422, description = "New password too short")
    )
)]
pub async fn change_password(
    State(state): State<AuthHandlerState>,
    session: Session,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .user_service
        .change_password(
            session.role,
            &session.user_id,
            &request.current_password,
            &request.new_password,
        )
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(())))
}
