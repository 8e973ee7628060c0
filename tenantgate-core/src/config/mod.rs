//! Configuration management for Tenantgate Core

use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Identifier of the deployment, reported by `/stats`
    pub project_id: String,
    /// Shared-secret gate configuration
    pub security: SecurityConfig,
    /// Identity provider configuration
    pub identity_provider: IdentityProviderConfig,
    /// Document store configuration
    pub document_store: DocumentStoreConfig,
    /// Collection names used by the gateway itself
    pub collections: CollectionsConfig,
    /// Logging / metrics configuration
    pub telemetry: TelemetryConfig,
}

/// A configuration value that must never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Process-wide shared secret every caller must present in `X-API-KEY`
    pub api_key: SecretString,
}

#[derive(Debug, Clone)]
pub struct IdentityProviderConfig {
    /// Base URL of the identity provider REST API
    pub url: String,
    /// Optional bearer token used for server-to-server calls
    pub service_token: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct DocumentStoreConfig {
    /// Base URL of the document store REST API
    pub url: String,
    /// Optional bearer token used for server-to-server calls
    pub service_token: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct CollectionsConfig {
    /// Mirror of identity-provider custom claims, keyed by uid
    pub claims_mirror: String,
    /// Profile records created alongside new users
    pub profiles: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            claims_mirror: "user_claims".to_string(),
            profiles: "profiles".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "json" or "pretty"
    pub log_format: String,
    pub metrics_enabled: bool,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            service_name: "tenantgate-core".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests use it to avoid mutating the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_key = lookup("API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            bail!("API_KEY is required and must not be empty");
        }

        Ok(Self {
            http_host: var("HTTP_HOST", "0.0.0.0"),
            http_port: var("HTTP_PORT", "8080")
                .parse()
                .context("Invalid HTTP_PORT")?,
            project_id: var("PROJECT_ID", "default"),
            security: SecurityConfig {
                api_key: SecretString::new(api_key),
            },
            identity_provider: IdentityProviderConfig {
                url: lookup("IDENTITY_PROVIDER_URL")
                    .context("IDENTITY_PROVIDER_URL is required")?,
                service_token: lookup("IDENTITY_PROVIDER_TOKEN")
                    .filter(|t| !t.is_empty())
                    .map(SecretString::new),
                timeout_secs: var("IDENTITY_PROVIDER_TIMEOUT_SECS", "30")
                    .parse()
                    .unwrap_or(30),
            },
            document_store: DocumentStoreConfig {
                url: lookup("DOCUMENT_STORE_URL").context("DOCUMENT_STORE_URL is required")?,
                service_token: lookup("DOCUMENT_STORE_TOKEN")
                    .filter(|t| !t.is_empty())
                    .map(SecretString::new),
                timeout_secs: var("DOCUMENT_STORE_TIMEOUT_SECS", "30")
                    .parse()
                    .unwrap_or(30),
            },
            collections: CollectionsConfig {
                claims_mirror: var("CLAIMS_MIRROR_COLLECTION", "user_claims"),
                profiles: var("PROFILES_COLLECTION", "profiles"),
            },
            telemetry: TelemetryConfig {
                log_format: var("LOG_FORMAT", "pretty").to_lowercase(),
                metrics_enabled: lookup("METRICS_ENABLED")
                    .map(|s| s.to_lowercase() == "true")
                    .unwrap_or(false),
                service_name: var("SERVICE_NAME", "tenantgate-core"),
            },
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
