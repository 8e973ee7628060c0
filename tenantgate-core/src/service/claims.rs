//! Claims synchronization between the identity provider and the mirror
//!
//! The identity provider is the source of truth. After every successful
//! provider write the same claim map is upserted into the mirror collection
//! as `{"claims": <map>}`. A failed mirror write is logged and counted but
//! never rolls back the provider write, so the two stores may diverge until
//! the next successful write.
//!
//! Merging is read-modify-write without any lock. Two concurrent writers for
//! the same uid race at the granularity of the whole claim map and the last
//! write wins; updates from the other writer may be lost.

use crate::documents::{DocumentStore, Fields};
use crate::domain::ClaimSet;
use crate::error::Result;
use crate::identity::IdentityProvider;
use crate::telemetry::metrics::record_best_effort_failure;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a claims write
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimsSyncOutcome {
    /// Claims now held by the identity provider
    pub claims: ClaimSet,
    /// Whether the mirror record was written as well
    pub mirror_synced: bool,
}

pub struct ClaimsService<I: IdentityProvider, D: DocumentStore> {
    identity: Arc<I>,
    store: Arc<D>,
    mirror_collection: String,
}

impl<I: IdentityProvider, D: DocumentStore> ClaimsService<I, D> {
    pub fn new(identity: Arc<I>, store: Arc<D>, mirror_collection: impl Into<String>) -> Self {
        Self {
            identity,
            store,
            mirror_collection: mirror_collection.into(),
        }
    }

    /// Replace the user's claims with `claims`.
    pub async fn set_claims(&self, uid: &str, claims: ClaimSet) -> Result<ClaimsSyncOutcome> {
        self.identity.set_claims(uid, &claims).await?;
        info!(uid = %uid, "Custom claims written to identity provider");

        let mirror_synced = self.sync_mirror(uid, &claims).await;
        Ok(ClaimsSyncOutcome {
            claims,
            mirror_synced,
        })
    }

    /// Overlay `patch` on the user's current claims and write the result.
    pub async fn patch_claims(
        &self,
        uid: &str,
        patch: Map<String, Value>,
    ) -> Result<ClaimsSyncOutcome> {
        let current = self.identity.get_claims(uid).await?;
        self.set_claims(uid, current.merged(patch)).await
    }

    async fn sync_mirror(&self, uid: &str, claims: &ClaimSet) -> bool {
        let mut fields = Fields::new();
        fields.insert("claims".to_string(), Value::Object(claims.to_map()));

        match self
            .store
            .upsert_document(&self.mirror_collection, uid, &fields)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    uid = %uid,
                    collection = %self.mirror_collection,
                    error = %e,
                    "Failed to sync claims mirror; identity provider value remains authoritative"
                );
                record_best_effort_failure("claims_mirror");
                false
            }
        }
    }
}
