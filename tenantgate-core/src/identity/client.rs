//! Identity provider REST client
//!
//! Talks JSON over HTTP to the identity provider's service API. Every call
//! maps a 404 to [`AppError::NotFound`] and any other non-success status to
//! [`AppError::IdentityProvider`].

use super::IdentityProvider;
use crate::config::IdentityProviderConfig;
use crate::domain::{
    ClaimSet, LoginOutcome, NewUser, OtpRequestOutcome, Session, UpdateUserInput, User, UserPage,
};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identity provider REST client
#[derive(Clone)]
pub struct IdentityProviderClient {
    config: IdentityProviderConfig,
    http_client: Client,
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    password: &'a str,
}

#[derive(Serialize)]
struct OtpRequestBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct OtpLoginBody<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Deserialize)]
struct CountResponse {
    count: i64,
}

impl IdentityProviderClient {
    pub fn new(config: IdentityProviderConfig) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.service_token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, action: &str) -> Result<Response> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("Failed to {}: {}", action, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Not found while trying to {}", action)));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::IdentityProvider(format!(
                "Failed to {}: {} - {}",
                action, status, body
            )));
        }

        Ok(response)
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response, action: &str) -> Result<T> {
        response.json().await.map_err(|e| {
            AppError::IdentityProvider(format!("Failed to parse response to {}: {}", action, e))
        })
    }
}

#[async_trait]
impl IdentityProvider for IdentityProviderClient {
    async fn validate_session(&self, session_id: &str) -> Result<Session> {
        let url = self.url(&format!("/v1/sessions/{}", urlencoding::encode(session_id)));
        let response = self
            .send(self.http_client.get(&url), "validate session")
            .await?;
        Self::parse(response, "validate session").await
    }

    async fn invalidate_session(&self, session_id: &str) -> Result<()> {
        let url = self.url(&format!("/v1/sessions/{}", urlencoding::encode(session_id)));
        self.send(self.http_client.delete(&url), "invalidate session")
            .await?;
        Ok(())
    }

    async fn get_claims(&self, uid: &str) -> Result<ClaimSet> {
        let url = self.url(&format!("/v1/users/{}/claims", urlencoding::encode(uid)));
        let response = self.send(self.http_client.get(&url), "get claims").await?;
        Self::parse(response, "get claims").await
    }

    async fn set_claims(&self, uid: &str, claims: &ClaimSet) -> Result<()> {
        let url = self.url(&format!("/v1/users/{}/claims", urlencoding::encode(uid)));
        self.send(self.http_client.put(&url).json(claims), "set claims")
            .await?;
        Ok(())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let url = self.url("/v1/users");
        let response = self
            .send(self.http_client.post(&url).json(user), "create user")
            .await?;
        Self::parse(response, "create user").await
    }

    async fn store_credentials(&self, uid: &str, password: &str) -> Result<()> {
        let url = self.url(&format!("/v1/users/{}/credentials", urlencoding::encode(uid)));
        self.send(
            self.http_client
                .put(&url)
                .json(&CredentialsBody { password }),
            "store credentials",
        )
        .await?;
        Ok(())
    }

    async fn get_user(&self, uid: &str) -> Result<User> {
        let url = self.url(&format!("/v1/users/{}", urlencoding::encode(uid)));
        let response = self.send(self.http_client.get(&url), "get user").await?;
        Self::parse(response, "get user").await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        let url = self.url(&format!("/v1/users/by-email/{}", urlencoding::encode(email)));
        let response = self
            .send(self.http_client.get(&url), "get user by email")
            .await?;
        Self::parse(response, "get user by email").await
    }

    async fn update_user(&self, uid: &str, input: &UpdateUserInput) -> Result<User> {
        let url = self.url(&format!("/v1/users/{}", urlencoding::encode(uid)));
        let response = self
            .send(self.http_client.patch(&url).json(input), "update user")
            .await?;
        Self::parse(response, "update user").await
    }

    async fn delete_user(&self, uid: &str) -> Result<()> {
        let url = self.url(&format!("/v1/users/{}", urlencoding::encode(uid)));
        self.send(self.http_client.delete(&url), "delete user")
            .await?;
        Ok(())
    }

    async fn list_users(&self, limit: u32, page_token: Option<String>) -> Result<UserPage> {
        let url = self.url("/v1/users");
        let mut request = self
            .http_client
            .get(&url)
            .query(&[("limit", limit.to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("page_token", token)]);
        }

        let response = self.send(request, "list users").await?;
        Self::parse(response, "list users").await
    }

    async fn user_count(&self) -> Result<i64> {
        let url = self.url("/v1/stats/users");
        let response = self
            .send(self.http_client.get(&url), "count users")
            .await?;
        let body: CountResponse = Self::parse(response, "count users").await?;
        Ok(body.count)
    }

    async fn request_otp(&self, email: &str) -> Result<OtpRequestOutcome> {
        let url = self.url("/v1/otp/request");
        let response = self
            .send(
                self.http_client.post(&url).json(&OtpRequestBody { email }),
                "request otp",
            )
            .await?;
        Self::parse(response, "request otp").await
    }

    async fn login_with_otp(&self, email: &str, otp: &str) -> Result<LoginOutcome> {
        let url = self.url("/v1/otp/login");
        let response = self
            .send(
                self.http_client
                    .post(&url)
                    .json(&OtpLoginBody { email, otp }),
                "login with otp",
            )
            .await?;
        Self::parse(response, "login with otp").await
    }
}
