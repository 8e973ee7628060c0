//! User management API handlers

use crate::api::{MessageResponse, SuccessResponse};
use crate::domain::{CreateUserInput, UpdateUserInput, UserSummary};
use crate::error::Result;
use crate::state::HasServices;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedUserView {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    pub project_id: String,
    pub role: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user: CreatedUserView,
    pub profile: ProfileView,
}

/// Raw list query; `limit` stays a string so junk values fall back to the
/// default instead of failing the request.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<String>,
    pub page_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserSummary>,
    pub count: usize,
    pub next_page_token: Option<String>,
    pub has_more: bool,
}

/// POST /api/v1/users
pub async fn create<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<CreateUserInput>,
) -> Result<impl IntoResponse> {
    let created = state.user_service().create(input).await?;

    let response = CreateUserResponse {
        user: CreatedUserView {
            uid: created.user.uid,
            email: created.user.email,
            display_name: created.user.display_name,
        },
        profile: ProfileView {
            profile_id: created.profile_id,
            project_id: created.project_id,
            role: "user".to_string(),
            status: "active".to_string(),
        },
    };
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(response))))
}

/// GET /api/v1/users
pub async fn list<S: HasServices>(
    State(state): State<S>,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse> {
    let limit = query.limit.and_then(|l| l.trim().parse::<i64>().ok());
    let page = state.user_service().list(limit, query.page_token).await?;

    let users: Vec<UserSummary> = page.users.into_iter().map(UserSummary::from).collect();
    Ok(Json(SuccessResponse::new(ListUsersResponse {
        count: users.len(),
        has_more: page.next_page_token.is_some(),
        next_page_token: page.next_page_token,
        users,
    })))
}

/// GET /api/v1/users/{uid}
pub async fn get<S: HasServices>(
    State(state): State<S>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse> {
    let user = state.user_service().get(&uid).await?;
    Ok(Json(SuccessResponse::new(user)))
}

/// GET /api/v1/users/email/{email}
pub async fn get_by_email<S: HasServices>(
    State(state): State<S>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse> {
    let user = state.user_service().get_by_email(&email).await?;
    Ok(Json(SuccessResponse::new(user)))
}

/// PUT /api/v1/users/{uid}
pub async fn update<S: HasServices>(
    State(state): State<S>,
    Path(uid): Path<String>,
    Json(input): Json<UpdateUserInput>,
) -> Result<impl IntoResponse> {
    let user = state.user_service().update(&uid, input).await?;
    Ok(Json(SuccessResponse::new(user)))
}

/// DELETE /api/v1/users/{uid}
pub async fn delete<S: HasServices>(
    State(state): State<S>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse> {
    state.user_service().delete(&uid).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
