//! Identity provider integration
//!
//! The identity provider owns sessions, users and their custom claims.
//! The gateway reaches it only through the [`IdentityProvider`] trait.

pub mod client;

pub use client::IdentityProviderClient;

use crate::domain::{
    ClaimSet, LoginOutcome, NewUser, OtpRequestOutcome, Session, UpdateUserInput, User, UserPage,
};
use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve an opaque session token. Unknown sessions yield `NotFound`.
    async fn validate_session(&self, session_id: &str) -> Result<Session>;
    async fn invalidate_session(&self, session_id: &str) -> Result<()>;

    async fn get_claims(&self, uid: &str) -> Result<ClaimSet>;
    /// Replace the user's custom claims verbatim.
    async fn set_claims(&self, uid: &str, claims: &ClaimSet) -> Result<()>;

    async fn create_user(&self, user: &NewUser) -> Result<User>;
    async fn store_credentials(&self, uid: &str, password: &str) -> Result<()>;
    async fn get_user(&self, uid: &str) -> Result<User>;
    async fn get_user_by_email(&self, email: &str) -> Result<User>;
    async fn update_user(&self, uid: &str, input: &UpdateUserInput) -> Result<User>;
    async fn delete_user(&self, uid: &str) -> Result<()>;
    async fn list_users(&self, limit: u32, page_token: Option<String>) -> Result<UserPage>;
    async fn user_count(&self) -> Result<i64>;

    async fn request_otp(&self, email: &str) -> Result<OtpRequestOutcome>;
    async fn login_with_otp(&self, email: &str, otp: &str) -> Result<LoginOutcome>;
}
