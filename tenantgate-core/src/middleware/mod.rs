//! HTTP middleware for Tenantgate Core
//!
//! The gate chain runs in a fixed order and short-circuits on the first
//! failure:
//! - `api_key`: shared-secret gate on every `/api/v1` route
//! - `session_auth`: session validation plus tenant authorization, then the
//!   bound-tenant re-check and admin-only gate where a route needs them.
//!   Logout passes through `require_valid_session`, the session check alone.
//!
//! Plus request observability (`metrics`) and log-safe request spans (`trace`).

pub mod api_key;
pub mod metrics;
pub mod session_auth;
pub mod trace;

pub use api_key::{require_api_key, SecretGate};
pub use metrics::ObservabilityLayer;
pub use session_auth::{
    require_admin, require_bound_tenant, require_session, require_valid_session,
};
pub use trace::SanitizedMakeSpan;
