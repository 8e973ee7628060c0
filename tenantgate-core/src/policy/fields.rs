//! Declarative per-field write policy
//!
//! Each write payload is evaluated once against a table of field rules
//! instead of scattering conditional deletes through the handlers.

use crate::domain::{RequestTenantContext, TENANT_FIELD};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Computes the value a forced field is set to on create.
pub type ForcedValue = fn(&RequestTenantContext) -> Value;

/// Mutability rule for a single field
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldRule {
    /// Only admins may supply or change the field.
    pub admin_only: bool,
    /// Nobody may change the field after creation.
    pub immutable: bool,
    /// Value written on create, unless an admin supplied one.
    pub forced: Option<ForcedValue>,
}

fn effective_tenant(context: &RequestTenantContext) -> Value {
    Value::String(context.effective_tenant.clone())
}

#[derive(Debug, Clone, Default)]
pub struct FieldPolicy {
    rules: BTreeMap<String, FieldRule>,
}

impl FieldPolicy {
    /// Policy protecting the tenant-ownership tag of documents.
    pub fn ownership() -> Self {
        Self::default().with_rule(
            TENANT_FIELD,
            FieldRule {
                admin_only: true,
                immutable: false,
                forced: Some(effective_tenant),
            },
        )
    }

    pub fn with_rule(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    /// Apply the policy to a new document's fields.
    ///
    /// Admin-only fields supplied by non-admins are discarded. Forced fields
    /// are then written unless an admin supplied a string value for them.
    pub fn apply_create(&self, fields: &mut Map<String, Value>, context: &RequestTenantContext) {
        for (name, rule) in &self.rules {
            if rule.admin_only && !context.is_admin {
                fields.remove(name);
            }

            if let Some(forced) = rule.forced {
                let admin_supplied =
                    context.is_admin && fields.get(name).is_some_and(Value::is_string);
                if !admin_supplied {
                    fields.insert(name.clone(), forced(context));
                }
            }
        }
    }

    /// Apply the policy to a partial update, returning the names of the
    /// fields that were stripped from the payload.
    pub fn apply_update(
        &self,
        fields: &mut Map<String, Value>,
        context: &RequestTenantContext,
    ) -> Vec<String> {
        let mut stripped = Vec::new();
        for (name, rule) in &self.rules {
            let denied = rule.immutable || (rule.admin_only && !context.is_admin);
            if denied && fields.remove(name).is_some() {
                stripped.push(name.clone());
            }
        }
        stripped
    }
}
