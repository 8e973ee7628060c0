//! Liveness endpoints

use crate::state::HasServices;
use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub project: String,
}

/// GET /
pub async fn root<S: HasServices>(State(state): State<S>) -> impl IntoResponse {
    Json(RootResponse {
        message: "Tenantgate API Server".to_string(),
        status: "running".to_string(),
        project: state.config().project_id.clone(),
    })
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
