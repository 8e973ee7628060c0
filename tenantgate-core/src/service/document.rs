//! Tenant-scoped document operations
//!
//! Every document-store call made on behalf of a caller goes through this
//! service so that non-admins only ever see or mutate documents tagged with
//! their effective tenant.

use crate::documents::{DocumentStore, Fields};
use crate::domain::{Document, QueryOptions, RequestTenantContext, PROJECT_FIELD};
use crate::error::{AppError, Result};
use crate::policy::ownership::{check_document_access, require_project_filter, scope_query};
use crate::policy::FieldPolicy;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// A newly created document and the fields actually stored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedDocument {
    pub document_id: String,
    pub collection: String,
    pub data: Fields,
}

pub struct DocumentService<D: DocumentStore> {
    store: Arc<D>,
    field_policy: FieldPolicy,
}

impl<D: DocumentStore> DocumentService<D> {
    pub fn new(store: Arc<D>) -> Self {
        Self::with_field_policy(store, FieldPolicy::ownership())
    }

    pub fn with_field_policy(store: Arc<D>, field_policy: FieldPolicy) -> Self {
        Self {
            store,
            field_policy,
        }
    }

    pub async fn create(
        &self,
        tenant: &RequestTenantContext,
        collection: &str,
        mut fields: Fields,
    ) -> Result<CreatedDocument> {
        match fields.get(PROJECT_FIELD) {
            Some(Value::String(project_id)) if !project_id.is_empty() => {}
            _ => {
                return Err(AppError::BadRequest(
                    "project_id is required and must be a non-empty string".to_string(),
                ))
            }
        }

        self.field_policy.apply_create(&mut fields, tenant);

        let document_id = self.store.create_document(collection, &fields).await?;
        debug!(collection = %collection, document_id = %document_id, "Document created");

        Ok(CreatedDocument {
            document_id,
            collection: collection.to_string(),
            data: fields,
        })
    }

    pub async fn get(
        &self,
        tenant: &RequestTenantContext,
        collection: &str,
        id: &str,
    ) -> Result<Document> {
        let document = self.store.get_document(collection, id).await?;
        self.check_access(tenant, &document)?;
        Ok(document)
    }

    /// List a collection. Non-admins are restricted to their tenant.
    pub async fn list(
        &self,
        tenant: &RequestTenantContext,
        collection: &str,
    ) -> Result<Vec<Document>> {
        if tenant.is_admin {
            return self.store.list_documents(collection).await;
        }

        let mut options = QueryOptions::default();
        scope_query(tenant, &mut options);
        self.store.query_documents(collection, &options).await
    }

    pub async fn update(
        &self,
        tenant: &RequestTenantContext,
        collection: &str,
        id: &str,
        mut fields: Fields,
    ) -> Result<()> {
        let document = self.store.get_document(collection, id).await?;
        self.check_access(tenant, &document)?;

        let stripped = self.field_policy.apply_update(&mut fields, tenant);
        if !stripped.is_empty() {
            debug!(
                collection = %collection,
                document_id = %id,
                fields = ?stripped,
                "Removed protected fields from update payload"
            );
        }

        self.store.update_document(collection, id, &fields).await
    }

    pub async fn delete(
        &self,
        tenant: &RequestTenantContext,
        collection: &str,
        id: &str,
    ) -> Result<()> {
        let document = self.store.get_document(collection, id).await?;
        self.check_access(tenant, &document)?;
        self.store.delete_document(collection, id).await
    }

    /// Run a query, scoped to the caller's tenant unless they are admin.
    ///
    /// Every query, including an admin's, must carry a `project_id ==` filter.
    pub async fn query(
        &self,
        tenant: &RequestTenantContext,
        collection: &str,
        mut options: QueryOptions,
    ) -> Result<Vec<Document>> {
        scope_query(tenant, &mut options);
        require_project_filter(&options)?;
        self.store.query_documents(collection, &options).await
    }

    fn check_access(&self, tenant: &RequestTenantContext, document: &Document) -> Result<()> {
        check_document_access(tenant, document).inspect_err(|_| {
            warn!(
                collection = %document.collection,
                document_id = %document.id,
                tenant = %tenant.effective_tenant,
                "Cross-tenant document access denied"
            );
        })
    }
}
