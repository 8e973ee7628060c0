//! Application state traits for dependency injection
//!
//! Handlers and gates are generic over [`HasServices`], so the same router
//! runs against the production REST clients or in-memory test collaborators.

use crate::config::Config;
use crate::documents::DocumentStore;
use crate::identity::IdentityProvider;
use crate::middleware::SecretGate;
use crate::service::{ClaimsService, DocumentService, SessionService, UserService};

/// Trait for application state that provides access to all services.
pub trait HasServices: Clone + Send + Sync + 'static {
    /// The identity provider collaborator type
    type Identity: IdentityProvider + 'static;
    /// The document store collaborator type
    type Documents: DocumentStore + 'static;

    /// Get the application configuration
    fn config(&self) -> &Config;

    /// Get the shared-secret gate
    fn secret_gate(&self) -> &SecretGate;

    fn session_service(&self) -> &SessionService<Self::Identity>;

    fn user_service(&self) -> &UserService<Self::Identity, Self::Documents>;

    fn claims_service(&self) -> &ClaimsService<Self::Identity, Self::Documents>;

    fn document_service(&self) -> &DocumentService<Self::Documents>;
}
