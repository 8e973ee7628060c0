//! Tenantgate Core - multi-tenant REST gateway
//!
//! This crate provides the authorization pipeline (secret gate, session
//! validation, tenant policy, ownership filter and claims synchronization)
//! that sits in front of an external identity provider and an external
//! document store.

pub mod api;
pub mod config;
pub mod documents;
pub mod domain;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod policy;
pub mod server;
pub mod service;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
