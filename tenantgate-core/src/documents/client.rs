//! Document store REST client

use super::{DocumentStore, Fields};
use crate::config::DocumentStoreConfig;
use crate::domain::{Document, QueryOptions};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Document store REST client
#[derive(Clone)]
pub struct DocumentStoreClient {
    config: DocumentStoreConfig,
    http_client: Client,
}

#[derive(Deserialize)]
struct CreatedResponse {
    id: String,
}

#[derive(Deserialize)]
struct DocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

impl DocumentStoreClient {
    pub fn new(config: DocumentStoreConfig) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/collections/{}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(collection)
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/documents/{}",
            self.collection_url(collection),
            urlencoding::encode(id)
        )
    }

    async fn send(&self, builder: RequestBuilder, action: &str) -> Result<Response> {
        let builder = match &self.config.service_token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::DocumentStore(format!("Failed to {}: {}", action, e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(AppError::NotFound(format!(
                "Document not found while trying to {}",
                action
            ))),
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::BadRequest(format!(
                    "Document store rejected request to {}: {}",
                    action, body
                )))
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::DocumentStore(format!(
                    "Failed to {}: {} - {}",
                    action, status, body
                )))
            }
            _ => Ok(response),
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response, action: &str) -> Result<T> {
        response.json().await.map_err(|e| {
            AppError::DocumentStore(format!("Failed to parse response to {}: {}", action, e))
        })
    }
}

#[async_trait]
impl DocumentStore for DocumentStoreClient {
    async fn create_document(&self, collection: &str, fields: &Fields) -> Result<String> {
        let url = format!("{}/documents", self.collection_url(collection));
        let response = self
            .send(self.http_client.post(&url).json(fields), "create document")
            .await?;
        let created: CreatedResponse = Self::parse(response, "create document").await?;
        Ok(created.id)
    }

    async fn create_document_with_id(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<()> {
        let url = self.document_url(collection, id);
        self.send(
            self.http_client.put(&url).json(fields),
            "create document with id",
        )
        .await?;
        Ok(())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document> {
        let url = self.document_url(collection, id);
        let response = self
            .send(self.http_client.get(&url), "get document")
            .await?;
        let mut document: Document = Self::parse(response, "get document").await?;
        if document.collection.is_empty() {
            document.collection = collection.to_string();
        }
        Ok(document)
    }

    async fn update_document(&self, collection: &str, id: &str, fields: &Fields) -> Result<()> {
        let url = self.document_url(collection, id);
        self.send(self.http_client.patch(&url).json(fields), "update document")
            .await?;
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let url = self.document_url(collection, id);
        self.send(self.http_client.delete(&url), "delete document")
            .await?;
        Ok(())
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        let url = format!("{}/documents", self.collection_url(collection));
        let response = self
            .send(self.http_client.get(&url), "list documents")
            .await?;
        let body: DocumentsResponse = Self::parse(response, "list documents").await?;
        Ok(body.documents)
    }

    async fn query_documents(
        &self,
        collection: &str,
        options: &QueryOptions,
    ) -> Result<Vec<Document>> {
        let url = format!("{}/query", self.collection_url(collection));
        let response = self
            .send(self.http_client.post(&url).json(options), "query documents")
            .await?;
        let body: DocumentsResponse = Self::parse(response, "query documents").await?;
        Ok(body.documents)
    }
}
