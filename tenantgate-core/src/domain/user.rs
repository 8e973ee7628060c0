//! User domain model

use super::claims::ClaimSet;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User record held by the identity provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    /// Creation time, milliseconds since the Unix epoch
    #[serde(default)]
    pub creation_timestamp: i64,
    /// Last sign-in time, milliseconds since the Unix epoch
    #[serde(default)]
    pub last_sign_in_timestamp: i64,
    #[serde(default)]
    pub custom_claims: ClaimSet,
}

/// Reduced user view used in listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub disabled: bool,
    pub creation_timestamp: i64,
    pub last_sign_in_timestamp: i64,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            disabled: user.disabled,
            creation_timestamp: user.creation_timestamp,
            last_sign_in_timestamp: user.last_sign_in_timestamp,
        }
    }
}

/// One page of a user listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Input for creating a new user through the gateway
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, message = "project_id is required"))]
    pub project_id: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[validate(length(max = 255))]
    pub display_name: Option<String>,
}

/// User fields forwarded to the identity provider on creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Input for updating a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}
