//! Tenant authorization policy
//!
//! Pure decision functions: they never call a collaborator, so every gate
//! decision can be tested without I/O.

pub mod fields;
pub mod ownership;

pub use fields::{FieldPolicy, FieldRule};

use crate::domain::{AuthContext, ClaimSet, RequestTenantContext};
use crate::error::{AppError, Result};

/// Decide whether a principal holding `claims` may act as `stated_tenant`.
///
/// Admins may act as any tenant they state. Everybody else must hold the
/// stated tenant in their `subdomain` claim; an empty claim denies all.
pub fn authorize(claims: &ClaimSet, stated_tenant: &str) -> Result<RequestTenantContext> {
    if claims.is_admin() {
        return Ok(RequestTenantContext {
            stated_tenant: stated_tenant.to_string(),
            effective_tenant: stated_tenant.to_string(),
            is_admin: true,
        });
    }

    if claims.subdomain.is_empty() {
        return Err(AppError::Forbidden(
            "No tenant access granted to this principal".to_string(),
        ));
    }

    if !claims.has_tenant(stated_tenant) {
        return Err(AppError::Forbidden(format!(
            "Access to tenant '{}' is not allowed",
            stated_tenant
        )));
    }

    Ok(RequestTenantContext {
        stated_tenant: stated_tenant.to_string(),
        effective_tenant: stated_tenant.to_string(),
        is_admin: false,
    })
}

/// Re-check that the tenant bound to the request still matches the tenant
/// stated in the request header.
pub fn verify_bound_tenant(context: &RequestTenantContext, header_tenant: &str) -> Result<()> {
    if context.is_admin || context.effective_tenant == header_tenant {
        return Ok(());
    }

    Err(AppError::Forbidden(
        "Tenant header does not match the authorized tenant".to_string(),
    ))
}

pub fn require_admin(auth: &AuthContext) -> Result<()> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}
