//! Session middleware for Axum
//!
//! The session token travels in an HttpOnly cookie (browser dashboards) or
//! an `Authorization: Bearer` header (API clients). Either way it is a
//! signed JWT; the verified claims become a [`Session`] in the request
//! extensions. Role gates run after the session middleware.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::common::ApiResponse;
use crate::domain::{AccountRole, ActingRole, DomainError};
use crate::infrastructure::crypto::{verify_token, JwtConfig, TokenClaims};

/// Session cookie attributes
#[derive(Clone, Debug)]
pub struct SessionCookie {
    pub name: String,
    pub secure: bool,
    pub max_age_secs: i64,
}

impl SessionCookie {
    fn attributes(&self, max_age: i64) -> String {
        let mut attrs = format!("Path=/; Max-Age={}; HttpOnly; SameSite=Lax", max_age);
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs
    }

    /// `Set-Cookie` value carrying a fresh session token
    pub fn issue(&self, token: &str) -> String {
        format!("{}={}; {}", self.name, token, self.attributes(self.max_age_secs))
    }

    /// `Set-Cookie` value that expires the session cookie
    pub fn clear(&self) -> String {
        format!("{}=; {}", self.name, self.attributes(0))
    }

    /// The session cookie's value from a `Cookie` request header
    pub fn extract<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|h| h.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
    }
}

/// Authentication state shared by the session middleware and auth handlers
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    pub cookie: SessionCookie,
}

/// The signed-in account for this request
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub role: AccountRole,
}

impl Session {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == AccountRole::Admin
    }

    /// Workflow role; producers have none.
    pub fn acting_role(&self) -> Result<ActingRole, DomainError> {
        self.role
            .acting_role()
            .ok_or_else(|| DomainError::Forbidden("Staff role required".into()))
    }
}

/// Session if the request carried a valid token, `None` for guests
pub struct MaybeSession(pub Option<Session>);

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not signed in"))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(parts.extensions.get::<Session>().cloned()))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
}

fn verified(token: &str, auth: &AuthState) -> Option<Session> {
    match verify_token(token, &auth.jwt_config) {
        Ok(claims) => Some(Session::from_claims(claims)),
        Err(e) => {
            debug!(error = %e, "Rejected session token");
            None
        }
    }
}

/// Verified session from the cookie or, if that is missing or stale, the
/// bearer header.
fn resolve_session(auth: &AuthState, headers: &HeaderMap) -> Option<Session> {
    auth.cookie
        .extract(headers)
        .and_then(|token| verified(token, auth))
        .or_else(|| bearer_token(headers).and_then(|token| verified(token, auth)))
}

/// Require a valid session
pub async fn session_middleware(
    State(auth): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match resolve_session(&auth, request.headers()) {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => reject(StatusCode::UNAUTHORIZED, "Missing or invalid session"),
    }
}

/// Attach the session when present; guests pass through
pub async fn optional_session_middleware(
    State(auth): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(session) = resolve_session(&auth, request.headers()) {
        request.extensions_mut().insert(session);
    }
    next.run(request).await
}

async fn require_role(
    request: Request<Body>,
    next: Next,
    allowed: fn(AccountRole) -> bool,
) -> Response {
    match request.extensions().get::<Session>() {
        Some(session) if allowed(session.role) => next.run(request).await,
        Some(_) => reject(StatusCode::FORBIDDEN, "Insufficient permissions"),
        None => reject(StatusCode::UNAUTHORIZED, "Not signed in"),
    }
}

pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    require_role(request, next, |role| role == AccountRole::Admin).await
}

/// Admin or pakhsh manager
pub async fn require_staff(request: Request<Body>, next: Next) -> Response {
    require_role(request, next, |role| role.acting_role().is_some()).await
}

pub async fn require_producer(request: Request<Body>, next: Next) -> Response {
    require_role(request, next, |role| role == AccountRole::Producer).await
}
