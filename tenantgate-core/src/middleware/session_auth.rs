//! Session and tenant gates
//!
//! `require_session` resolves the `X-Session-ID` header into a principal,
//! authorizes it for the tenant stated in `X-Client-Subdomain` and inserts
//! the resulting [`AuthContext`] into the request extensions. Handlers read
//! it back through the `AuthContext` extractor.
//!
//! `require_valid_session` stops after session validation and inserts a
//! [`SessionContext`] instead. It guards routes that act on the session
//! itself, such as logout.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::domain::{AuthContext, Principal, SessionContext};
use crate::error::{AppError, Result};
use crate::policy;
use crate::state::HasServices;
use crate::telemetry::metrics::record_gate_rejection;

pub const SESSION_HEADER: &str = "x-session-id";
pub const TENANT_HEADER: &str = "x-client-subdomain";

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn reject(gate: &'static str, error: AppError) -> AppError {
    warn!(gate = gate, error = %error, "Request rejected by gate");
    record_gate_rejection(gate);
    error
}

/// Session validation and tenant authorization gate
pub async fn require_session<S: HasServices>(
    State(state): State<S>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let headers = request.headers();
    let (session_id, stated_tenant) = match (
        header_value(headers, SESSION_HEADER),
        header_value(headers, TENANT_HEADER),
    ) {
        (Some(session_id), Some(tenant)) => (session_id.to_string(), tenant.to_string()),
        _ => {
            return Err(reject(
                "session",
                AppError::Unauthorized(
                    "X-Session-ID and X-Client-Subdomain headers are required".to_string(),
                ),
            ))
        }
    };

    let session = state
        .session_service()
        .validate(&session_id)
        .await
        .map_err(|e| reject("session", e))?;

    let tenant =
        policy::authorize(&session.claims, &stated_tenant).map_err(|e| reject("tenant", e))?;

    request.extensions_mut().insert(AuthContext {
        principal: Principal::from(session),
        session_id,
        tenant,
    });

    Ok(next.run(request).await)
}

/// Session validation gate without tenant authorization
pub async fn require_valid_session<S: HasServices>(
    State(state): State<S>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let session_id = header_value(request.headers(), SESSION_HEADER)
        .map(str::to_string)
        .ok_or_else(|| {
            reject(
                "session",
                AppError::Unauthorized("X-Session-ID header is required".to_string()),
            )
        })?;

    let session = state
        .session_service()
        .validate(&session_id)
        .await
        .map_err(|e| reject("session", e))?;

    request.extensions_mut().insert(SessionContext {
        principal: Principal::from(session),
        session_id,
    });

    Ok(next.run(request).await)
}

/// Re-check the tenant bound by `require_session` against the header.
pub async fn require_bound_tenant(request: Request<Body>, next: Next) -> Result<Response> {
    let auth = request
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| reject("bound_tenant", missing_context()))?;

    let header_tenant = header_value(request.headers(), TENANT_HEADER).unwrap_or_default();
    policy::verify_bound_tenant(&auth.tenant, header_tenant)
        .map_err(|e| reject("bound_tenant", e))?;

    Ok(next.run(request).await)
}

/// Admin-only gate
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response> {
    let auth = request
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| reject("admin_only", missing_context()))?;

    policy::require_admin(auth).map_err(|e| reject("admin_only", e))?;

    Ok(next.run(request).await)
}

fn missing_context() -> AppError {
    AppError::Unauthorized("Authentication required".to_string())
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(missing_context)
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(missing_context)
    }
}
