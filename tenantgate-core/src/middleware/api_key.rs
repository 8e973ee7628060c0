//! Shared-secret gate
//!
//! Every `/api/v1` request must present the process-wide secret in the
//! `X-API-KEY` header.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::state::HasServices;
use crate::telemetry::metrics::record_gate_rejection;

/// API key header name
pub const API_KEY_HEADER: &str = "x-api-key";

/// Verifies the caller-supplied secret.
///
/// Only the SHA-256 digest of the secret is kept. Presented values are
/// hashed and compared in constant time, so the comparison time does not
/// depend on how much of the secret a caller guessed right.
#[derive(Clone)]
pub struct SecretGate {
    secret_hash: [u8; 32],
}

impl SecretGate {
    /// Build the gate. An empty secret is a configuration error.
    pub fn new(secret: &str) -> anyhow::Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("shared secret must not be empty");
        }
        Ok(Self {
            secret_hash: hash_key(secret),
        })
    }

    pub fn verify(&self, presented: Option<&str>) -> Result<()> {
        let presented = match presented {
            Some(key) if !key.is_empty() => key,
            _ => return Err(AppError::Unauthorized("Missing API key".to_string())),
        };

        if constant_time_eq(&hash_key(presented), &self.secret_hash) {
            Ok(())
        } else {
            tracing::warn!(
                key_fingerprint = %fingerprint(presented),
                "Rejected request with invalid API key"
            );
            Err(AppError::Unauthorized("Invalid API key".to_string()))
        }
    }
}

fn hash_key(key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}

/// Short, non-reversible identifier of a presented key for logs.
fn fingerprint(key: &str) -> String {
    hex::encode(&hash_key(key)[..4])
}

/// Constant-time byte comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Secret gate middleware
pub async fn require_api_key<S: HasServices>(
    State(state): State<S>,
    request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = state.secret_gate().verify(presented) {
        record_gate_rejection("api_key");
        return Err(e);
    }

    Ok(next.run(request).await)
}
