//! Tenant-scoped document API handlers

use crate::api::{json_object, MessageResponse, SuccessResponse};
use crate::domain::{AuthContext, Document, QueryOptions};
use crate::error::Result;
use crate::state::HasServices;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentList {
    pub collection: String,
    pub documents: Vec<Document>,
    pub count: usize,
}

impl DocumentList {
    fn new(collection: String, documents: Vec<Document>) -> Self {
        Self {
            collection,
            count: documents.len(),
            documents,
        }
    }
}

/// POST /api/v1/collections/{collection}/documents
pub async fn create<S: HasServices>(
    State(state): State<S>,
    auth: AuthContext,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse> {
    let created = state
        .document_service()
        .create(&auth.tenant, &collection, json_object(body)?)
        .await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(created))))
}

/// GET /api/v1/collections/{collection}/documents
pub async fn list<S: HasServices>(
    State(state): State<S>,
    auth: AuthContext,
    Path(collection): Path<String>,
) -> Result<impl IntoResponse> {
    let documents = state
        .document_service()
        .list(&auth.tenant, &collection)
        .await?;
    Ok(Json(SuccessResponse::new(DocumentList::new(
        collection, documents,
    ))))
}

/// GET /api/v1/collections/{collection}/documents/{id}
pub async fn get<S: HasServices>(
    State(state): State<S>,
    auth: AuthContext,
    Path((collection, id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let document = state
        .document_service()
        .get(&auth.tenant, &collection, &id)
        .await?;
    Ok(Json(SuccessResponse::new(document)))
}

/// PUT /api/v1/collections/{collection}/documents/{id}
pub async fn update<S: HasServices>(
    State(state): State<S>,
    auth: AuthContext,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse> {
    state
        .document_service()
        .update(&auth.tenant, &collection, &id, json_object(body)?)
        .await?;
    Ok(Json(MessageResponse::new("Document updated successfully")))
}

/// DELETE /api/v1/collections/{collection}/documents/{id}
pub async fn delete<S: HasServices>(
    State(state): State<S>,
    auth: AuthContext,
    Path((collection, id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    state
        .document_service()
        .delete(&auth.tenant, &collection, &id)
        .await?;
    Ok(Json(MessageResponse::new("Document deleted successfully")))
}

/// POST /api/v1/collections/{collection}/query
pub async fn query<S: HasServices>(
    State(state): State<S>,
    auth: AuthContext,
    Path(collection): Path<String>,
    Json(options): Json<QueryOptions>,
) -> Result<impl IntoResponse> {
    let documents = state
        .document_service()
        .query(&auth.tenant, &collection, options)
        .await?;
    Ok(Json(SuccessResponse::new(DocumentList::new(
        collection, documents,
    ))))
}
