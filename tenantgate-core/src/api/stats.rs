//! Service statistics

use crate::api::SuccessResponse;
use crate::state::HasServices;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub project_id: String,
    /// `-1` when the identity provider could not be asked
    pub user_count: i64,
    pub server_time: String,
}

/// GET /api/v1/stats
pub async fn get_stats<S: HasServices>(State(state): State<S>) -> impl IntoResponse {
    let user_count = match state.user_service().count().await {
        Ok(count) => count,
        Err(e) => {
            warn!(error = %e, "Failed to get user count");
            -1
        }
    };

    Json(SuccessResponse::new(StatsResponse {
        project_id: state.config().project_id.clone(),
        user_count,
        server_time: Utc::now().to_rfc3339(),
    }))
}
