//! Per-request tenant scope and authentication context

use super::session::Principal;

/// Tenant scope computed by the tenant authorization policy.
///
/// Exists only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTenantContext {
    /// Tenant the caller claimed to operate as
    pub stated_tenant: String,
    /// Tenant the request is actually authorized to act within
    pub effective_tenant: String,
    pub is_admin: bool,
}

/// Immutable authentication context built by the gate chain and handed to
/// every downstream handler.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    pub principal: Principal,
    /// Session the request was authenticated with (used by logout)
    pub session_id: String,
    pub tenant: RequestTenantContext,
}

/// Context of a validated session that has not been scoped to a tenant.
///
/// Built by the session-only gate for routes that act on the session itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub principal: Principal,
    pub session_id: String,
}

impl AuthContext {
    pub fn uid(&self) -> &str {
        &self.principal.uid
    }

    pub fn is_admin(&self) -> bool {
        self.tenant.is_admin
    }

    pub fn effective_tenant(&self) -> &str {
        &self.tenant.effective_tenant
    }
}
