//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{Authenticator, ReservationService, UserService};
use crate::domain::reservation::{
    DashboardBucket, DashboardCounts, NewReservation, ReservationPatch, ReservationSchedule,
    RequesterType, StudioServices,
};
use crate::domain::{AccountRole, Profile, RepositoryProvider, ReservationRequest, ReservationStatus, ServiceType};
use crate::infrastructure::crypto::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, PaginatedResponse, PaginationParams};
use crate::interfaces::http::middleware::{
    optional_session_middleware, require_admin, require_producer, require_staff,
    session_middleware, AuthState, SessionCookie,
};

use super::modules::{auth, health, reservations, users};

/// Unified state for every route; each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub auth: AuthState,
    pub authenticator: Arc<Authenticator>,
    pub user_service: Arc<UserService>,
    pub reservation_service: Arc<ReservationService>,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        jwt_config: JwtConfig,
        cookie: SessionCookie,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            authenticator: Arc::new(Authenticator::standard(Arc::clone(&repos))),
            user_service: Arc::new(UserService::new(Arc::clone(&repos), bcrypt_cost)),
            reservation_service: Arc::new(ReservationService::new(Arc::clone(&repos))),
            auth: AuthState { jwt_config, cookie },
            started_at: Arc::new(Instant::now()),
            repos,
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        s.auth.clone()
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            repos: Arc::clone(&s.repos),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

impl FromRef<AppState> for auth::AuthHandlerState {
    fn from_ref(s: &AppState) -> Self {
        auth::AuthHandlerState {
            authenticator: Arc::clone(&s.authenticator),
            user_service: Arc::clone(&s.user_service),
            auth: s.auth.clone(),
        }
    }
}

impl FromRef<AppState> for reservations::ReservationHandlerState {
    fn from_ref(s: &AppState) -> Self {
        reservations::ReservationHandlerState {
            service: Arc::clone(&s.reservation_service),
        }
    }
}

impl FromRef<AppState> for users::UserHandlerState {
    fn from_ref(s: &AppState) -> Self {
        users::UserHandlerState {
            user_service: Arc::clone(&s.user_service),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token returned by /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::logout,
        auth::get_current_user,
        auth::change_password,
        // Reservations
        reservations::submit_reservation,
        reservations::list_own_reservations,
        reservations::list_reservations,
        reservations::dashboard_summary,
        reservations::dashboard,
        reservations::get_reservation,
        reservations::edit_reservation,
        reservations::update_status,
        reservations::finalize_reservation,
        reservations::delete_reservation,
        reservations::delete_rejected,
        // Users
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            PaginatedResponse<ReservationRequest>,
            PaginationParams,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::ChangePasswordRequest,
            Profile,
            AccountRole,
            // Reservations
            ReservationRequest,
            ReservationStatus,
            NewReservation,
            ReservationPatch,
            ReservationSchedule,
            RequesterType,
            StudioServices,
            ServiceType,
            DashboardBucket,
            DashboardCounts,
            reservations::UpdateStatusRequest,
            reservations::DeleteRejectedResponse,
            // Users
            users::CreateUserRequest,
            users::UpdateUserRequest,
            // Health
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Authentication", description = "Sign in and out, current profile, password change"),
        (name = "Reservations", description = "Studio reservation requests and the approval workflow"),
        (name = "Users", description = "Producer and pakhsh manager accounts (admin only)"),
    ),
    info(
        title = "Studio Booking API",
        version = "0.1.0",
        description = "Studio reservation requests with admin and pakhsh approval",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// OpenAPI document with the session cookie scheme named after the configured cookie.
pub fn api_doc(cookie_name: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if let Some(components) = doc.components.as_mut() {
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(cookie_name))),
        );
    }
    doc
}

/// Create the API router with all routes
pub fn create_api_router(state: AppState) -> Router {
    let auth_state = state.auth.clone();

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    // Auth routes (protected)
    let auth_protected_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .route("/change-password", put(auth::change_password))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            session_middleware,
        ));

    // Guests and producers submit; the session, if any, is attached but optional
    let submit_routes = Router::new()
        .route("/", post(reservations::submit_reservation))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            optional_session_middleware,
        ));

    let producer_routes = Router::new()
        .route("/mine", get(reservations::list_own_reservations))
        .layer(middleware::from_fn(require_producer))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            session_middleware,
        ));

    // Dashboards: admin and pakhsh managers
    let staff_routes = Router::new()
        .route("/", get(reservations::list_reservations))
        .route("/summary", get(reservations::dashboard_summary))
        .route("/dashboard/{bucket}", get(reservations::dashboard))
        .route(
            "/{id}",
            get(reservations::get_reservation)
                .put(reservations::edit_reservation)
                .delete(reservations::delete_reservation),
        )
        .route("/{id}/status", put(reservations::update_status))
        .layer(middleware::from_fn(require_staff))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            session_middleware,
        ));

    let admin_reservation_routes = Router::new()
        .route("/{id}/finalize", post(reservations::finalize_reservation))
        .route(
            "/rejected",
            axum::routing::delete(reservations::delete_rejected),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            session_middleware,
        ));

    let user_routes = Router::new()
        .route("/{role}", get(users::list_users).post(users::create_user))
        .route(
            "/{role}/{id}",
            put(users::update_user).delete(users::delete_user),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(auth_state.clone(), session_middleware));

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes =
        SwaggerUi::new("/docs").url("/api-doc/openapi.json", api_doc(&auth_state.cookie.name));

    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Auth
        .nest("/api/v1/auth", auth_routes.merge(auth_protected_routes))
        // Reservations
        .nest(
            "/api/v1/reservations",
            submit_routes
                .merge(producer_routes)
                .merge(staff_routes)
                .merge(admin_reservation_routes),
        )
        // Users
        .nest("/api/v1/users", user_routes)
        .with_state(state)
        // Swagger UI
        .merge(swagger_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::Service;

    use crate::domain::reservation::model::tests::guest_submission;
    use crate::domain::user::model::tests::new_user;
    use crate::infrastructure::crypto::password::MIN_COST;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    struct TestApp {
        router: Router,
    }

    impl TestApp {
        async fn new() -> Self {
            let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
            let state = AppState::new(
                repos,
                JwtConfig::new("test-secret", 1),
                SessionCookie {
                    name: "studio_session".into(),
                    secure: false,
                    max_age_secs: 3600,
                },
                MIN_COST,
            );

            let mut admin = new_user("admin");
            admin.password = "admin123".into();
            state.user_service.ensure_admin(admin).await.unwrap();
            state
                .user_service
                .add(AccountRole::PakhshManager, new_user("pakhsh"))
                .await
                .unwrap();
            state
                .user_service
                .add(AccountRole::Producer, new_user("producer"))
                .await
                .unwrap();

            Self {
                router: create_api_router(state),
            }
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let (status, _, body) = self.send_raw(method, uri, token, body).await;
            (status, body)
        }

        async fn send_raw(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, axum::http::HeaderMap, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            let req = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            self.call(req).await
        }

        async fn call(&self, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
            let mut svc = self.router.clone().into_service();
            let resp = svc.call(req).await.unwrap();
            let status = resp.status();
            let headers = resp.headers().clone();
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, headers, body)
        }

        async fn login(&self, username: &str, password: &str) -> String {
            let (status, body) = self
                .send(
                    Method::POST,
                    "/api/v1/auth/login",
                    None,
                    Some(json!({ "username": username, "password": password })),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "login failed: {}", body);
            body["data"]["token"].as_str().unwrap().to_string()
        }

        async fn submit(&self, service_type: ServiceType) -> String {
            let payload = serde_json::to_value(guest_submission(service_type)).unwrap();
            let (status, body) = self
                .send(Method::POST, "/api/v1/reservations", None, Some(payload))
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body["data"]["id"].as_str().unwrap().to_string()
        }

        async fn set_status(&self, token: &str, id: &str, status: &str) -> (StatusCode, Value) {
            self.send(
                Method::PUT,
                &format!("/api/v1/reservations/{}/status", id),
                Some(token),
                Some(json!({ "status": status })),
            )
            .await
        }
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = TestApp::new().await;
        let (status, body) = app.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn login_sets_session_cookie_usable_for_me() {
        let app = TestApp::new().await;
        let (status, headers, body) = app
            .send_raw(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": "pakhsh", "password": "secret123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["role"], "pakhsh_manager");

        let set_cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(set_cookie.contains("HttpOnly"));
        let pair = set_cookie.split(';').next().unwrap().to_string();

        let req = Request::builder()
            .uri("/api/v1/auth/me")
            .header(header::COOKIE, pair)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = app.call(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "pakhsh");
    }

    #[tokio::test]
    async fn wrong_password_is_401() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": "admin", "password": "nope" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn dashboards_require_a_staff_session() {
        let app = TestApp::new().await;
        let (status, _) = app
            .send(Method::GET, "/api/v1/reservations", None, None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let producer = app.login("producer", "secret123").await;
        let (status, _) = app
            .send(Method::GET, "/api/v1/reservations", Some(&producer), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let pakhsh = app.login("pakhsh", "secret123").await;
        let (status, _) = app
            .send(Method::GET, "/api/v1/reservations", Some(&pakhsh), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn user_management_is_admin_only() {
        let app = TestApp::new().await;
        let pakhsh = app.login("pakhsh", "secret123").await;
        let (status, _) = app
            .send(Method::GET, "/api/v1/users/producers", Some(&pakhsh), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = app.login("admin", "admin123").await;
        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/users/producers",
                Some(&admin),
                Some(json!({
                    "name": "Neda",
                    "username": "neda",
                    "password": "secret123",
                    "phone": "09123333333"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["data"].get("passwordHash").is_none());

        let (status, body) = app
            .send(Method::GET, "/api/v1/users/producers", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (status, _) = app
            .send(Method::GET, "/api/v1/users/admins", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn with_crew_request_needs_both_confirmations() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin123").await;
        let pakhsh = app.login("pakhsh", "secret123").await;
        let id = app.submit(ServiceType::WithCrew).await;

        let (status, _) = app.set_status(&admin, &id, "admin_confirmed").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app.set_status(&admin, &id, "confirmed").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("pakhsh"));

        let (status, body) = app.set_status(&pakhsh, &id, "pakhsh_confirmed").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["adminConfirmedAt"].is_string());
        assert!(body["data"]["pakhshConfirmedAt"].is_string());

        let (status, body) = app.set_status(&admin, &id, "confirmed").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "confirmed");

        let (status, body) = app
            .send(
                Method::GET,
                "/api/v1/reservations/dashboard/finalized",
                Some(&pakhsh),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
    }

    #[tokio::test]
    async fn pakhsh_cannot_finalize_or_purge() {
        let app = TestApp::new().await;
        let pakhsh = app.login("pakhsh", "secret123").await;
        let id = app.submit(ServiceType::WithoutCrew).await;

        let (status, _) = app
            .send(
                Method::POST,
                &format!("/api/v1/reservations/{}/finalize", id),
                Some(&pakhsh),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .send(Method::DELETE, "/api/v1/reservations/rejected", Some(&pakhsh), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn rejected_requests_can_be_purged_by_admin() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin123").await;
        let cancelled = app.submit(ServiceType::WithoutCrew).await;
        let kept = app.submit(ServiceType::WithoutCrew).await;

        let (status, _) = app.set_status(&admin, &cancelled, "cancelled").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .send(Method::DELETE, "/api/v1/reservations/rejected", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["removed"], 1);

        let (status, _) = app
            .send(
                Method::GET,
                &format!("/api/v1/reservations/{}", kept),
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn producer_submission_is_attributed_to_session() {
        let app = TestApp::new().await;
        let producer = app.login("producer", "secret123").await;

        let mut payload = serde_json::to_value(guest_submission(ServiceType::WithoutCrew)).unwrap();
        payload["requesterType"] = json!("producer");
        payload["producerName"] = json!("Reza");
        payload["producerUsername"] = json!("someone-else");
        let (status, body) = app
            .send(Method::POST, "/api/v1/reservations", Some(&producer), Some(payload))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["producerUsername"], "producer");

        let (status, body) = app
            .send(Method::GET, "/api/v1/reservations/mine", Some(&producer), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_dashboard_bucket_is_400() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin123").await;
        let (status, _) = app
            .send(
                Method::GET,
                "/api/v1/reservations/dashboard/archived",
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_status_is_rejected_in_envelope() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin123").await;
        let id = app.submit(ServiceType::WithoutCrew).await;

        let (status, body) = app.set_status(&admin, &id, "approved").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }

    #[tokio::test]
    async fn renamed_producer_keeps_own_requests() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin123").await;
        let producer = app.login("producer", "secret123").await;

        let mut payload = serde_json::to_value(guest_submission(ServiceType::WithoutCrew)).unwrap();
        payload["requesterType"] = json!("producer");
        payload["producerName"] = json!("Reza");
        let (status, _) = app
            .send(Method::POST, "/api/v1/reservations", Some(&producer), Some(payload))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = app
            .send(Method::GET, "/api/v1/users/producers", Some(&admin), None)
            .await;
        let producer_id = body["data"][0]["id"].as_str().unwrap().to_string();
        let (status, _) = app
            .send(
                Method::PUT,
                &format!("/api/v1/users/producers/{}", producer_id),
                Some(&admin),
                Some(json!({ "username": "reza" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let renamed = app.login("reza", "secret123").await;
        let (status, body) = app
            .send(Method::GET, "/api/v1/reservations/mine", Some(&renamed), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn request_mid_handshake_is_frozen() {
        let app = TestApp::new().await;
        let admin = app.login("admin", "admin123").await;
        let id = app.submit(ServiceType::WithCrew).await;

        let (status, _) = app.set_status(&admin, &id, "admin_confirmed").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .send(
                Method::PUT,
                &format!("/api/v1/reservations/{}", id),
                Some(&admin),
                Some(json!({ "programName": "Renamed" })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = app.set_status(&admin, &id, "confirmed").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("pakhsh"));
    }
}
