//! Session and principal models

use super::claims::ClaimSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session as reported by the identity provider.
///
/// The gateway only reads sessions and asks the provider to invalidate
/// them; it never mutates these fields itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub uid: String,
    pub active: bool,
    #[serde(default)]
    pub claims: ClaimSet,
}

/// Authenticated principal, produced by session validation and owned by a
/// single request.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub uid: String,
    pub claims: ClaimSet,
}

impl From<Session> for Principal {
    fn from(session: Session) -> Self {
        Self {
            uid: session.uid,
            claims: session.claims,
        }
    }
}

/// Outcome of an OTP issuance request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtpRequestOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Outcome of an OTP login attempt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub custom_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub claims: ClaimSet,
}
