//! Reservation API handlers
//!
//! Submission is open to guests; workflow decisions take the acting role
//! from the session, never from the request body.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{DeleteRejectedResponse, UpdateStatusRequest};
use crate::application::{ProducerRef, ReservationService};
use crate::domain::reservation::{DashboardBucket, DashboardCounts, NewReservation, ReservationPatch};
use crate::domain::{AccountRole, ReservationRequest};
use crate::interfaces::http::common::{
    api_error, ApiError, ApiResponse, JsonBody, PaginatedResponse, PaginationParams,
};
use crate::interfaces::http::middleware::{MaybeSession, Session};
use crate::shared::validate_pagination;

/// Dashboard page size when the client does not ask for one
const DASHBOARD_PAGE_SIZE: u32 = 10;

fn producer_ref(session: &Session) -> ProducerRef<'_> {
    ProducerRef {
        user_id: &session.user_id,
        username: &session.username,
    }
}

#[derive(Clone)]
pub struct ReservationHandlerState {
    pub service: Arc<ReservationService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    request_body = NewReservation,
    responses(
        (status = 201, description = "Request submitted", body = ApiResponse<ReservationRequest>),
        (status = 400, description = "Missing or invalid field"),
        (status = 403, description = "Producer request without a producer session")
    )
)]
pub async fn submit_reservation(
    State(state): State<ReservationHandlerState>,
    MaybeSession(session): MaybeSession,
    JsonBody(request): JsonBody<NewReservation>,
) -> Result<(StatusCode, Json<ApiResponse<ReservationRequest>>), ApiError> {
    let producer = session
        .as_ref()
        .filter(|s| s.role == AccountRole::Producer)
        .map(producer_ref);

    let created = state
        .service
        .submit(request, producer)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/mine",
    tag = "Reservations",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "The producer's own requests", body = ApiResponse<Vec<ReservationRequest>>),
        (status = 403, description = "Not a producer")
    )
)]
pub async fn list_own_reservations(
    State(state): State<ReservationHandlerState>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<ReservationRequest>>>, ApiError> {
    let own = state
        .service
        .list_own(producer_ref(&session))
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(own)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "All requests, newest first", body = ApiResponse<Vec<ReservationRequest>>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_reservations(
    State(state): State<ReservationHandlerState>,
) -> Result<Json<ApiResponse<Vec<ReservationRequest>>>, ApiError> {
    let all = state.service.list().await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(all)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/summary",
    tag = "Reservations",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Bucket sizes for the caller's dashboard", body = ApiResponse<DashboardCounts>)
    )
)]
pub async fn dashboard_summary(
    State(state): State<ReservationHandlerState>,
    session: Session,
) -> Result<Json<ApiResponse<DashboardCounts>>, ApiError> {
    let role = session.acting_role().map_err(api_error)?;
    let counts = state.service.counts(role).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(counts)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/dashboard/{bucket}",
    tag = "Reservations",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(
        ("bucket" = DashboardBucket, Path, description = "pending, finalized or rejected"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "One page of the bucket", body = ApiResponse<PaginatedResponse<ReservationRequest>>),
        (status = 400, description = "Unknown bucket")
    )
)]
pub async fn dashboard(
    State(state): State<ReservationHandlerState>,
    session: Session,
    Path(bucket): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<ReservationRequest>>>, ApiError> {
    let role = session.acting_role().map_err(api_error)?;
    let bucket: DashboardBucket = bucket.parse().map_err(api_error)?;
    let (page, limit) = validate_pagination(params.page, params.limit, DASHBOARD_PAGE_SIZE);

    let result = state
        .service
        .dashboard(role, bucket, page, limit)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation details", body = ApiResponse<ReservationRequest>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_reservation(
    State(state): State<ReservationHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ReservationRequest>>, ApiError> {
    let reservation = state.service.get(&id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(reservation)))
}

#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    request_body = ReservationPatch,
    responses(
        (status = 200, description = "Reservation edited", body = ApiResponse<ReservationRequest>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Request is cancelled, mid-handshake, or already signed off for a service type change")
    )
)]
pub async fn edit_reservation(
    State(state): State<ReservationHandlerState>,
    session: Session,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<ReservationPatch>,
) -> Result<Json<ApiResponse<ReservationRequest>>, ApiError> {
    let role = session.acting_role().map_err(api_error)?;
    let updated = state
        .service
        .edit(&id, patch, role)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/status",
    tag = "Reservations",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status applied", body = ApiResponse<ReservationRequest>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Transition not allowed or confirmation incomplete")
    )
)]
pub async fn update_status(
    State(state): State<ReservationHandlerState>,
    session: Session,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<ReservationRequest>>, ApiError> {
    let role = session.acting_role().map_err(api_error)?;
    let updated = state
        .service
        .update_status(&id, request.status, role)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations/{id}/finalize",
    tag = "Reservations",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation finalized", body = ApiResponse<ReservationRequest>),
        (status = 409, description = "Only confirmed requests can be finalized")
    )
)]
pub async fn finalize_reservation(
    State(state): State<ReservationHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ReservationRequest>>, ApiError> {
    let updated = state.service.finalize(&id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(("id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_reservation(
    State(state): State<ReservationHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.service.delete(&id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reservations/rejected",
    tag = "Reservations",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Cancelled requests purged", body = ApiResponse<DeleteRejectedResponse>)
    )
)]
pub async fn delete_rejected(
    State(state): State<ReservationHandlerState>,
) -> Result<Json<ApiResponse<DeleteRejectedResponse>>, ApiError> {
    let removed = state.service.delete_all_rejected().await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(DeleteRejectedResponse { removed })))
}
