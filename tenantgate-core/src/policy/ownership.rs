//! Document ownership rules

use crate::domain::{
    Document, QueryFilter, QueryOptions, RequestTenantContext, PROJECT_FIELD, TENANT_FIELD,
};
use crate::error::{AppError, Result};

/// Allow access to `document` only when the caller is admin or the document
/// is tagged with the caller's effective tenant.
///
/// Mismatches are reported as `Forbidden`, never masked as `NotFound`.
/// Untagged documents are treated as belonging to no tenant.
pub fn check_document_access(context: &RequestTenantContext, document: &Document) -> Result<()> {
    if context.is_admin || document.tenant() == Some(context.effective_tenant.as_str()) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "Document '{}' belongs to another tenant",
        document.id
    )))
}

/// Restrict a query to the caller's tenant. Admin queries are left as-is.
pub fn scope_query(context: &RequestTenantContext, options: &mut QueryOptions) {
    if !context.is_admin {
        options.filters.push(QueryFilter::eq(
            TENANT_FIELD,
            context.effective_tenant.clone(),
        ));
    }
}

/// Every query must be partitioned by project with an equality filter.
pub fn require_project_filter(options: &QueryOptions) -> Result<()> {
    if options.has_equality_filter(PROJECT_FIELD) {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "project_id filter is required".to_string(),
        ))
    }
}
