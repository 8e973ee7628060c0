//! Document store integration

pub mod client;

pub use client::DocumentStoreClient;

use crate::domain::{Document, QueryOptions};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub type Fields = Map<String, Value>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a store-assigned id and return that id.
    async fn create_document(&self, collection: &str, fields: &Fields) -> Result<String>;
    async fn create_document_with_id(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<()>;
    async fn get_document(&self, collection: &str, id: &str) -> Result<Document>;
    /// Merge `fields` into an existing document. Missing documents yield `NotFound`.
    async fn update_document(&self, collection: &str, id: &str, fields: &Fields) -> Result<()>;
    async fn delete_document(&self, collection: &str, id: &str) -> Result<()>;
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>>;
    async fn query_documents(
        &self,
        collection: &str,
        options: &QueryOptions,
    ) -> Result<Vec<Document>>;

    /// Update the document, creating it under `id` only when it does not
    /// exist yet. Any other update failure is returned unchanged.
    async fn upsert_document(&self, collection: &str, id: &str, fields: &Fields) -> Result<()> {
        match self.update_document(collection, id, fields).await {
            Err(e) if e.is_not_found() => {
                self.create_document_with_id(collection, id, fields).await
            }
            other => other,
        }
    }
}
