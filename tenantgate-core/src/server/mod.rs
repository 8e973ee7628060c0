//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::documents::{DocumentStore, DocumentStoreClient};
use crate::identity::{IdentityProvider, IdentityProviderClient};
use crate::middleware::{
    require_admin, require_api_key, require_bound_tenant, require_session, require_valid_session,
    ObservabilityLayer, SanitizedMakeSpan, SecretGate,
};
use crate::middleware::{
    api_key::API_KEY_HEADER,
    metrics::REQUEST_ID_HEADER,
    session_auth::{SESSION_HEADER, TENANT_HEADER},
};
use crate::service::{ClaimsService, DocumentService, SessionService, UserService};
use crate::state::HasServices;
use anyhow::Result;
use axum::{
    http::{header, HeaderName, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
pub struct AppState<I: IdentityProvider, D: DocumentStore> {
    pub config: Arc<Config>,
    pub secret_gate: SecretGate,
    pub session_service: Arc<SessionService<I>>,
    pub user_service: Arc<UserService<I, D>>,
    pub claims_service: Arc<ClaimsService<I, D>>,
    pub document_service: Arc<DocumentService<D>>,
}

// Manual impl: deriving would require `I: Clone` and `D: Clone`.
impl<I: IdentityProvider, D: DocumentStore> Clone for AppState<I, D> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            secret_gate: self.secret_gate.clone(),
            session_service: self.session_service.clone(),
            user_service: self.user_service.clone(),
            claims_service: self.claims_service.clone(),
            document_service: self.document_service.clone(),
        }
    }
}

impl<I: IdentityProvider, D: DocumentStore> AppState<I, D> {
    /// Wire every service onto the two collaborators.
    ///
    /// Fails when the configured shared secret is empty.
    pub fn new(config: Config, identity: Arc<I>, store: Arc<D>) -> Result<Self> {
        let secret_gate = SecretGate::new(config.security.api_key.expose())?;
        let collections = config.collections.clone();

        Ok(Self {
            secret_gate,
            session_service: Arc::new(SessionService::new(identity.clone())),
            user_service: Arc::new(UserService::new(
                identity.clone(),
                store.clone(),
                collections.profiles,
            )),
            claims_service: Arc::new(ClaimsService::new(
                identity,
                store.clone(),
                collections.claims_mirror,
            )),
            document_service: Arc::new(DocumentService::new(store)),
            config: Arc::new(config),
        })
    }
}

impl<I, D> HasServices for AppState<I, D>
where
    I: IdentityProvider + 'static,
    D: DocumentStore + 'static,
{
    type Identity = I;
    type Documents = D;

    fn config(&self) -> &Config {
        &self.config
    }

    fn secret_gate(&self) -> &SecretGate {
        &self.secret_gate
    }

    fn session_service(&self) -> &SessionService<I> {
        &self.session_service
    }

    fn user_service(&self) -> &UserService<I, D> {
        &self.user_service
    }

    fn claims_service(&self) -> &ClaimsService<I, D> {
        &self.claims_service
    }

    fn document_service(&self) -> &DocumentService<D> {
        &self.document_service
    }
}

/// Run the server
pub async fn run(config: Config, prometheus_handle: Option<PrometheusHandle>) -> Result<()> {
    let identity = Arc::new(IdentityProviderClient::new(
        config.identity_provider.clone(),
    )?);
    info!(url = %config.identity_provider.url, "Identity provider client initialized");

    let store = Arc::new(DocumentStoreClient::new(config.document_store.clone())?);
    info!(url = %config.document_store.url, "Document store client initialized");

    let http_addr = config.http_addr();
    let state = AppState::new(config, identity, store)?;
    let app = build_router(state, prometheus_handle);

    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Build the HTTP router with generic state type
///
/// Gate order per route group: secret gate on all of `/api/v1`, then the
/// session gate, then the bound-tenant re-check (documents) or the admin
/// gate (user listing and claims).
pub fn build_router<S: HasServices>(state: S, prometheus_handle: Option<PrometheusHandle>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(API_KEY_HEADER),
            HeaderName::from_static(SESSION_HEADER),
            HeaderName::from_static(TENANT_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    let session_gate = from_fn_with_state(state.clone(), require_session::<S>);

    let auth_routes = Router::new()
        .route("/api/v1/auth/otp", post(api::auth::request_otp::<S>))
        .route("/api/v1/auth/login", post(api::auth::login::<S>))
        .route(
            "/api/v1/auth/logout",
            post(api::auth::logout::<S>)
                .route_layer(from_fn_with_state(state.clone(), require_valid_session::<S>)),
        );

    // Only listing users requires an admin session; the other user routes
    // sit behind the secret gate alone.
    let user_routes = Router::new()
        .route(
            "/api/v1/users",
            post(api::user::create::<S>).merge(
                get(api::user::list::<S>)
                    .route_layer(from_fn(require_admin))
                    .route_layer(session_gate.clone()),
            ),
        )
        .route(
            "/api/v1/users/{uid}",
            get(api::user::get::<S>)
                .put(api::user::update::<S>)
                .delete(api::user::delete::<S>),
        )
        .route(
            "/api/v1/users/email/{email}",
            get(api::user::get_by_email::<S>),
        );

    let claims_routes = Router::new()
        .route(
            "/api/v1/users/{uid}/claims",
            post(api::claims::set_claims::<S>).patch(api::claims::patch_claims::<S>),
        )
        .route_layer(from_fn(require_admin))
        .route_layer(session_gate.clone());

    let document_routes = Router::new()
        .route(
            "/api/v1/collections/{collection}/documents",
            get(api::document::list::<S>).post(api::document::create::<S>),
        )
        .route(
            "/api/v1/collections/{collection}/documents/{id}",
            get(api::document::get::<S>)
                .put(api::document::update::<S>)
                .delete(api::document::delete::<S>),
        )
        .route(
            "/api/v1/collections/{collection}/query",
            post(api::document::query::<S>),
        )
        .route_layer(from_fn(require_bound_tenant))
        .route_layer(session_gate);

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .merge(claims_routes)
        .merge(document_routes)
        .route("/api/v1/stats", get(api::stats::get_stats::<S>))
        .route_layer(from_fn_with_state(state.clone(), require_api_key::<S>));

    let metrics_routes = Router::new()
        .route("/metrics", get(api::metrics::metrics_handler))
        .with_state(Arc::new(prometheus_handle));

    Router::new()
        .route("/", get(api::health::root::<S>))
        .route("/health", get(api::health::health))
        .merge(api_routes)
        .with_state(state)
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http().make_span_with(SanitizedMakeSpan))
        .layer(cors)
        .layer(ObservabilityLayer)
}
