//! Session validation and OTP login

use crate::domain::{LoginOutcome, Session};
use crate::error::{AppError, Result};
use crate::identity::IdentityProvider;
use std::sync::Arc;
use tracing::debug;

pub struct SessionService<I: IdentityProvider> {
    identity: Arc<I>,
}

impl<I: IdentityProvider> SessionService<I> {
    pub fn new(identity: Arc<I>) -> Self {
        Self { identity }
    }

    /// Resolve a session token into an active session.
    ///
    /// Unknown, inactive and unverifiable sessions all fail with
    /// `Unauthorized`; the provider's reason is only logged.
    pub async fn validate(&self, session_id: &str) -> Result<Session> {
        let session = self
            .identity
            .validate_session(session_id)
            .await
            .map_err(|e| {
                debug!(error = %e, "Session validation failed");
                AppError::Unauthorized("Invalid session".to_string())
            })?;

        if !session.active {
            debug!(uid = %session.uid, "Session is no longer active");
            return Err(AppError::Unauthorized("Session is not active".to_string()));
        }

        Ok(session)
    }

    /// Ask the identity provider to deactivate the session.
    pub async fn logout(&self, session_id: &str) -> Result<()> {
        self.identity.invalidate_session(session_id).await
    }

    pub async fn request_otp(&self, email: &str) -> Result<String> {
        let outcome = self.identity.request_otp(email).await?;
        if !outcome.success {
            return Err(AppError::NotFound(outcome.message));
        }
        Ok(outcome.message)
    }

    pub async fn login_with_otp(&self, email: &str, otp: &str) -> Result<LoginOutcome> {
        let outcome = self.identity.login_with_otp(email, otp).await?;
        if !outcome.success {
            return Err(AppError::Unauthorized(outcome.message));
        }
        Ok(outcome)
    }
}
