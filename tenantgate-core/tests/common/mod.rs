//! HTTP test infrastructure
//!
//! In-memory identity provider and document store plus request helpers.
//! Tests drive the production `build_router()` through `tower::ServiceExt`,
//! so the full gate chain runs without any network collaborator.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tenantgate_core::config::Config;
use tenantgate_core::documents::{DocumentStore, Fields};
use tenantgate_core::domain::{
    ClaimSet, Document, LoginOutcome, NewUser, OtpRequestOutcome, QueryOptions, Session,
    UpdateUserInput, User, UserPage, EQ,
};
use tenantgate_core::error::{AppError, Result};
use tenantgate_core::identity::IdentityProvider;
use tenantgate_core::server::{build_router, AppState};
use tokio::sync::RwLock;
use tower::ServiceExt;

pub const API_KEY: &str = "test-api-key";

// ============================================================================
// Test Configuration
// ============================================================================

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "API_KEY" => Some(API_KEY.to_string()),
        "PROJECT_ID" => Some("test-project".to_string()),
        "IDENTITY_PROVIDER_URL" => Some("http://identity.invalid".to_string()),
        "DOCUMENT_STORE_URL" => Some("http://documents.invalid".to_string()),
        _ => None,
    })
    .unwrap()
}

// ============================================================================
// In-memory identity provider
// ============================================================================

#[derive(Default)]
pub struct TestIdentityProvider {
    sessions: RwLock<HashMap<String, Session>>,
    users: RwLock<HashMap<String, User>>,
    credentials: RwLock<HashMap<String, String>>,
    otps: RwLock<HashMap<String, String>>,
    invalidated: RwLock<Vec<String>>,
    next_uid: AtomicUsize,
    pub calls: AtomicUsize,
    pub fail_set_claims: AtomicBool,
    pub fail_store_credentials: AtomicBool,
    pub fail_user_count: AtomicBool,
}

impl TestIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Register a user with `claims` and an active session `session_id`.
    pub async fn add_session(&self, session_id: &str, uid: &str, claims: ClaimSet) {
        self.add_user(uid, &format!("{}@example.com", uid), claims.clone())
            .await;
        self.sessions.write().await.insert(
            session_id.to_string(),
            Session {
                id: session_id.to_string(),
                uid: uid.to_string(),
                active: true,
                claims,
            },
        );
    }

    pub async fn add_inactive_session(&self, session_id: &str, uid: &str, claims: ClaimSet) {
        self.add_session(session_id, uid, claims).await;
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.active = false;
        }
    }

    pub async fn add_user(&self, uid: &str, email: &str, claims: ClaimSet) {
        self.users.write().await.insert(
            uid.to_string(),
            User {
                uid: uid.to_string(),
                email: email.to_string(),
                custom_claims: claims,
                ..Default::default()
            },
        );
    }

    pub async fn add_otp(&self, email: &str, otp: &str) {
        self.otps
            .write()
            .await
            .insert(email.to_string(), otp.to_string());
    }

    pub async fn claims_of(&self, uid: &str) -> Option<ClaimSet> {
        self.users
            .read()
            .await
            .get(uid)
            .map(|u| u.custom_claims.clone())
    }

    pub async fn credentials_of(&self, uid: &str) -> Option<String> {
        self.credentials.read().await.get(uid).cloned()
    }

    pub async fn invalidated_sessions(&self) -> Vec<String> {
        self.invalidated.read().await.clone()
    }

    fn not_found(what: &str) -> AppError {
        AppError::NotFound(format!("{} not found", what))
    }
}

#[async_trait]
impl IdentityProvider for TestIdentityProvider {
    async fn validate_session(&self, session_id: &str) -> Result<Session> {
        self.touch();
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| Self::not_found("session"))
    }

    async fn invalidate_session(&self, session_id: &str) -> Result<()> {
        self.touch();
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| Self::not_found("session"))?;
        session.active = false;
        self.invalidated.write().await.push(session_id.to_string());
        Ok(())
    }

    async fn get_claims(&self, uid: &str) -> Result<ClaimSet> {
        self.touch();
        self.claims_of(uid)
            .await
            .ok_or_else(|| Self::not_found("user"))
    }

    async fn set_claims(&self, uid: &str, claims: &ClaimSet) -> Result<()> {
        self.touch();
        if self.fail_set_claims.load(Ordering::SeqCst) {
            return Err(AppError::IdentityProvider("claims write failed".to_string()));
        }
        let mut users = self.users.write().await;
        let user = users.get_mut(uid).ok_or_else(|| Self::not_found("user"))?;
        user.custom_claims = claims.clone();
        Ok(())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        self.touch();
        let uid = format!("uid-{}", self.next_uid.fetch_add(1, Ordering::SeqCst) + 1);
        let created = User {
            uid: uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            ..Default::default()
        };
        self.users.write().await.insert(uid, created.clone());
        Ok(created)
    }

    async fn store_credentials(&self, uid: &str, password: &str) -> Result<()> {
        self.touch();
        if self.fail_store_credentials.load(Ordering::SeqCst) {
            return Err(AppError::IdentityProvider(
                "credential store unavailable".to_string(),
            ));
        }
        self.credentials
            .write()
            .await
            .insert(uid.to_string(), password.to_string());
        Ok(())
    }

    async fn get_user(&self, uid: &str) -> Result<User> {
        self.touch();
        self.users
            .read()
            .await
            .get(uid)
            .cloned()
            .ok_or_else(|| Self::not_found("user"))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.touch();
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| Self::not_found("user"))
    }

    async fn update_user(&self, uid: &str, input: &UpdateUserInput) -> Result<User> {
        self.touch();
        let mut users = self.users.write().await;
        let user = users.get_mut(uid).ok_or_else(|| Self::not_found("user"))?;
        if let Some(email) = &input.email {
            user.email = email.clone();
        }
        if let Some(name) = &input.display_name {
            user.display_name = Some(name.clone());
        }
        if let Some(disabled) = input.disabled {
            user.disabled = disabled;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, uid: &str) -> Result<()> {
        self.touch();
        self.users
            .write()
            .await
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| Self::not_found("user"))
    }

    async fn list_users(&self, limit: u32, page_token: Option<String>) -> Result<UserPage> {
        self.touch();
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.uid.cmp(&b.uid));

        let start = page_token
            .and_then(|t| t.parse::<usize>().ok())
            .unwrap_or(0);
        let end = (start + limit as usize).min(users.len());
        let next_page_token = (end < users.len()).then(|| end.to_string());

        Ok(UserPage {
            users: users.get(start..end).unwrap_or_default().to_vec(),
            next_page_token,
        })
    }

    async fn user_count(&self) -> Result<i64> {
        self.touch();
        if self.fail_user_count.load(Ordering::SeqCst) {
            return Err(AppError::IdentityProvider("count failed".to_string()));
        }
        Ok(self.users.read().await.len() as i64)
    }

    async fn request_otp(&self, email: &str) -> Result<OtpRequestOutcome> {
        self.touch();
        let known = self.users.read().await.values().any(|u| u.email == email);
        Ok(OtpRequestOutcome {
            success: known,
            message: if known {
                "OTP sent".to_string()
            } else {
                "User not found".to_string()
            },
        })
    }

    async fn login_with_otp(&self, email: &str, otp: &str) -> Result<LoginOutcome> {
        self.touch();
        let expected = self.otps.read().await.get(email).cloned();
        if expected.as_deref() != Some(otp) {
            return Ok(LoginOutcome {
                success: false,
                message: "Invalid or expired code".to_string(),
                ..Default::default()
            });
        }

        let user = self.get_user_by_email(email).await?;
        let session_id = format!("session-{}", user.uid);
        self.sessions.write().await.insert(
            session_id.clone(),
            Session {
                id: session_id.clone(),
                uid: user.uid.clone(),
                active: true,
                claims: user.custom_claims.clone(),
            },
        );

        Ok(LoginOutcome {
            success: true,
            message: "Login successful".to_string(),
            session_id,
            custom_token: "custom-token".to_string(),
            expires_at: None,
            uid: user.uid,
            claims: user.custom_claims,
        })
    }
}

// ============================================================================
// In-memory document store
// ============================================================================

#[derive(Default)]
pub struct TestDocumentStore {
    collections: RwLock<HashMap<String, HashMap<String, Fields>>>,
    queries: RwLock<Vec<(String, QueryOptions)>>,
    failing_collections: RwLock<HashSet<String>>,
    next_id: AtomicUsize,
    pub calls: AtomicUsize,
}

impl TestDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn insert(&self, collection: &str, id: &str, fields: Value) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), object(fields));
    }

    pub async fn fields(&self, collection: &str, id: &str) -> Option<Fields> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned()
    }

    pub async fn all(&self, collection: &str) -> Vec<Fields> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn recorded_queries(&self) -> Vec<(String, QueryOptions)> {
        self.queries.read().await.clone()
    }

    /// Make every write to `collection` fail with a collaborator error.
    pub async fn fail_writes_to(&self, collection: &str) {
        self.failing_collections
            .write()
            .await
            .insert(collection.to_string());
    }

    async fn begin_write(&self, collection: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_collections.read().await.contains(collection) {
            return Err(AppError::DocumentStore(format!(
                "writes to {} unavailable",
                collection
            )));
        }
        Ok(())
    }

    fn to_document(collection: &str, id: &str, fields: &Fields) -> Document {
        Document {
            id: id.to_string(),
            collection: collection.to_string(),
            fields: fields.clone(),
        }
    }
}

#[async_trait]
impl DocumentStore for TestDocumentStore {
    async fn create_document(&self, collection: &str, fields: &Fields) -> Result<String> {
        self.begin_write(collection).await?;
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields.clone());
        Ok(id)
    }

    async fn create_document_with_id(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<()> {
        self.begin_write(collection).await?;
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields.clone());
        Ok(())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fields(collection, id)
            .await
            .map(|f| Self::to_document(collection, id, &f))
            .ok_or_else(|| AppError::NotFound(format!("document {} not found", id)))
    }

    async fn update_document(&self, collection: &str, id: &str, fields: &Fields) -> Result<()> {
        self.begin_write(collection).await?;
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| AppError::NotFound(format!("document {} not found", id)))?;
        existing.extend(fields.clone());
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        self.begin_write(collection).await?;
        self.collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("document {} not found", id)))
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|c| {
                c.iter()
                    .map(|(id, f)| Self::to_document(collection, id, f))
                    .collect()
            })
            .unwrap_or_default();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }

    async fn query_documents(
        &self,
        collection: &str,
        options: &QueryOptions,
    ) -> Result<Vec<Document>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .write()
            .await
            .push((collection.to_string(), options.clone()));

        if let Some(filter) = options.filters.iter().find(|f| f.operator != EQ) {
            return Err(AppError::BadRequest(format!(
                "unsupported operator {}",
                filter.operator
            )));
        }

        let docs = self.list_documents(collection).await?;
        Ok(docs
            .into_iter()
            .filter(|d| {
                options
                    .filters
                    .iter()
                    .all(|f| d.fields.get(&f.field) == Some(&f.value))
            })
            .collect())
    }
}

// ============================================================================
// Test application
// ============================================================================

pub struct TestApp {
    pub identity: Arc<TestIdentityProvider>,
    pub store: Arc<TestDocumentStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let identity = Arc::new(TestIdentityProvider::new());
        let store = Arc::new(TestDocumentStore::new());
        let state = AppState::new(test_config(), identity.clone(), store.clone()).unwrap();
        Self {
            router: build_router(state, None),
            identity,
            store,
        }
    }

    /// Total collaborator calls made so far.
    pub fn collaborator_calls(&self) -> usize {
        self.identity.call_count() + self.store.call_count()
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder<'_> {
        RequestBuilder {
            app: self,
            method,
            path: path.to_string(),
            headers: vec![("x-api-key".to_string(), API_KEY.to_string())],
            body: None,
        }
    }
}

pub struct RequestBuilder<'a> {
    app: &'a TestApp,
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl RequestBuilder<'_> {
    pub fn without_api_key(mut self) -> Self {
        self.headers.retain(|(k, _)| k != "x-api-key");
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.retain(|(k, _)| k != name);
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach the session and tenant headers.
    pub fn session(self, session_id: &str, tenant: &str) -> Self {
        self.header("x-session-id", session_id)
            .header("x-client-subdomain", tenant)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub async fn send(self) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(self.method).uri(&self.path);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let request = match self.body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected JSON object, got {}", other),
    }
}
