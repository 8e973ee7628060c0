//! OTP login and logout

use crate::api::{MessageResponse, SuccessResponse};
use crate::domain::{ClaimSet, SessionContext};
use crate::error::Result;
use crate::state::HasServices;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct OtpRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "otp is required"))]
    pub otp: String,
}

/// Fields of a successful login returned to the caller
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub session_id: String,
    pub custom_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub uid: String,
    pub claims: ClaimSet,
}

/// POST /api/v1/auth/otp
pub async fn request_otp<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<OtpRequest>,
) -> Result<impl IntoResponse> {
    input.validate()?;
    let message = state.session_service().request_otp(&input.email).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/v1/auth/login
pub async fn login<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    input.validate()?;
    let outcome = state
        .session_service()
        .login_with_otp(&input.email, &input.otp)
        .await?;
    info!(uid = %outcome.uid, "User logged in with OTP");

    Ok(Json(SuccessResponse::new(LoginResponse {
        message: outcome.message,
        session_id: outcome.session_id,
        custom_token: outcome.custom_token,
        expires_at: outcome.expires_at,
        uid: outcome.uid,
        claims: outcome.claims,
    })))
}

/// POST /api/v1/auth/logout
///
/// Needs a valid session only; the tenant header is not consulted.
pub async fn logout<S: HasServices>(
    State(state): State<S>,
    session: SessionContext,
) -> Result<impl IntoResponse> {
    state.session_service().logout(&session.session_id).await?;
    info!(uid = %session.principal.uid, "Session closed");
    Ok(Json(MessageResponse::new("Session closed")))
}
