//! Custom claims API handlers (admin only)

use crate::api::{json_object, SuccessResponse};
use crate::domain::{validate_reserved_claims, AuthContext, ClaimSet};
use crate::error::{AppError, Result};
use crate::service::ClaimsSyncOutcome;
use crate::state::HasServices;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimsResponse {
    pub uid: String,
    pub claims: Map<String, Value>,
    /// `false` when the mirror copy could not be written
    pub mirror_synced: bool,
}

impl ClaimsResponse {
    fn new(uid: String, outcome: ClaimsSyncOutcome) -> Self {
        Self {
            uid,
            claims: outcome.claims.to_map(),
            mirror_synced: outcome.mirror_synced,
        }
    }
}

/// POST /api/v1/users/{uid}/claims - replace all claims
pub async fn set_claims<S: HasServices>(
    State(state): State<S>,
    auth: AuthContext,
    Path(uid): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse> {
    let map = json_object(body)?;
    validate_reserved_claims(&map)
        .map_err(|e| AppError::BadRequest(format!("Invalid claims: {}", e)))?;
    let claims = ClaimSet::from_map(map);

    let outcome = state.claims_service().set_claims(&uid, claims).await?;
    info!(admin = %auth.uid(), uid = %uid, "Custom claims replaced");

    Ok(Json(SuccessResponse::new(ClaimsResponse::new(uid, outcome))))
}

/// PATCH /api/v1/users/{uid}/claims - merge into existing claims
pub async fn patch_claims<S: HasServices>(
    State(state): State<S>,
    auth: AuthContext,
    Path(uid): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse> {
    let patch = json_object(body)?;
    validate_reserved_claims(&patch)
        .map_err(|e| AppError::BadRequest(format!("Invalid claims: {}", e)))?;

    let outcome = state.claims_service().patch_claims(&uid, patch).await?;
    info!(admin = %auth.uid(), uid = %uid, "Custom claims merged");

    Ok(Json(SuccessResponse::new(ClaimsResponse::new(uid, outcome))))
}
