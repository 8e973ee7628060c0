//! User management business logic

use crate::documents::{DocumentStore, Fields};
use crate::domain::{CreateUserInput, NewUser, UpdateUserInput, User, UserPage};
use crate::error::{AppError, Result};
use crate::identity::IdentityProvider;
use crate::telemetry::metrics::record_best_effort_failure;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Outcome of creating a user
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedUser {
    pub user: User,
    pub project_id: String,
    /// Id of the profile document, absent when its creation failed
    pub profile_id: Option<String>,
}

pub struct UserService<I: IdentityProvider, D: DocumentStore> {
    identity: Arc<I>,
    store: Arc<D>,
    profiles_collection: String,
}

impl<I: IdentityProvider, D: DocumentStore> UserService<I, D> {
    pub fn new(identity: Arc<I>, store: Arc<D>, profiles_collection: impl Into<String>) -> Self {
        Self {
            identity,
            store,
            profiles_collection: profiles_collection.into(),
        }
    }

    /// Create a user, store its password credential and create its profile.
    ///
    /// The first two steps are critical. The profile document is best-effort.
    pub async fn create(&self, input: CreateUserInput) -> Result<CreatedUser> {
        input.validate()?;

        let user = self
            .identity
            .create_user(&NewUser {
                email: input.email.clone(),
                password: input.password.clone(),
                display_name: input.display_name.clone(),
            })
            .await?;
        info!(uid = %user.uid, "User created at identity provider");

        if let Err(e) = self
            .identity
            .store_credentials(&user.uid, &input.password)
            .await
        {
            error!(uid = %user.uid, error = %e, "Failed to store credentials for new user");
            return Err(AppError::PartialFailure(format!(
                "User {} was created but storing credentials failed",
                user.uid
            )));
        }

        let profile_id = self.create_profile(&user, &input.project_id).await;

        Ok(CreatedUser {
            user,
            project_id: input.project_id,
            profile_id,
        })
    }

    async fn create_profile(&self, user: &User, project_id: &str) -> Option<String> {
        let fields: Fields = match json!({
            "user_id": user.uid,
            "email": user.email,
            "display_name": user.display_name.clone().unwrap_or_default(),
            "status": "active",
            "role": "user",
            "project_id": project_id,
        }) {
            Value::Object(map) => map,
            _ => return None,
        };

        match self
            .store
            .create_document(&self.profiles_collection, &fields)
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(uid = %user.uid, error = %e, "Failed to create profile for user");
                record_best_effort_failure("user_profile");
                None
            }
        }
    }

    /// List users. `limit` falls back to the default when missing or not
    /// positive and is capped at [`MAX_PAGE_SIZE`].
    pub async fn list(&self, limit: Option<i64>, page_token: Option<String>) -> Result<UserPage> {
        let limit = clamp_page_size(limit);
        let page_token = page_token.filter(|t| !t.is_empty());
        self.identity.list_users(limit, page_token).await
    }

    pub async fn get(&self, uid: &str) -> Result<User> {
        self.identity.get_user(uid).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        self.identity.get_user_by_email(email).await
    }

    pub async fn update(&self, uid: &str, input: UpdateUserInput) -> Result<User> {
        input.validate()?;
        self.identity.update_user(uid, &input).await
    }

    pub async fn delete(&self, uid: &str) -> Result<()> {
        self.identity.delete_user(uid).await?;
        info!(uid = %uid, "User deleted");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        self.identity.user_count().await
    }
}

fn clamp_page_size(limit: Option<i64>) -> u32 {
    match limit {
        Some(n) if n > 0 => n.min(MAX_PAGE_SIZE as i64) as u32,
        _ => DEFAULT_PAGE_SIZE,
    }
}
