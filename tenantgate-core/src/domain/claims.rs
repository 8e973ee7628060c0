//! Authorization claims attached to a principal

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role value that lifts a principal out of tenant scoping.
pub const ADMIN_ROLE: &str = "admin";

pub const ROLE_CLAIM: &str = "role";
pub const SUBDOMAIN_CLAIM: &str = "subdomain";

/// Claim set carried by a principal.
///
/// `role` and `subdomain` are the two reserved claims the gateway reasons
/// about; every other provider claim is kept verbatim in `extra`.
///
/// Parsing never fails. A non-string `role` reads as no role, a non-array
/// `subdomain` reads as no tenants and non-string tenant entries are
/// skipped. When a reserved claim is not in its canonical shape the raw
/// value is kept in `extra` so it is written back unchanged until the typed
/// field is modified.
///
/// `subdomain` keeps the order it was given in. An absent or empty
/// `subdomain` means zero tenant access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Map<String, Value>")]
pub struct ClaimSet {
    pub role: Option<String>,
    pub subdomain: Vec<String>,
    pub extra: Map<String, Value>,
}

fn parse_role(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn parse_subdomain(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn is_canonical_subdomain(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.iter().all(Value::is_string))
}

impl ClaimSet {
    /// Build a tenant-scoped claim set.
    pub fn tenant_user<I, T>(tenants: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            role: Some("user".to_string()),
            subdomain: tenants.into_iter().map(Into::into).collect(),
            extra: Map::new(),
        }
    }

    /// Build an admin claim set with no tenant memberships.
    pub fn admin() -> Self {
        Self {
            role: Some(ADMIN_ROLE.to_string()),
            ..Default::default()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }

    /// Byte-exact membership test against the `subdomain` claim.
    pub fn has_tenant(&self, tenant: &str) -> bool {
        self.subdomain.iter().any(|t| t == tenant)
    }

    /// Parse a raw JSON claim object.
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let role = match map.remove(ROLE_CLAIM) {
            Some(Value::String(role)) => Some(role),
            Some(raw) => {
                map.insert(ROLE_CLAIM.to_string(), raw);
                None
            }
            None => None,
        };

        let subdomain = match map.remove(SUBDOMAIN_CLAIM) {
            Some(raw) if is_canonical_subdomain(&raw) => parse_subdomain(&raw),
            Some(raw) => {
                let tenants = parse_subdomain(&raw);
                map.insert(SUBDOMAIN_CLAIM.to_string(), raw);
                tenants
            }
            None => Vec::new(),
        };

        Self {
            role,
            subdomain,
            extra: map,
        }
    }

    /// Flatten back into a raw JSON claim object.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();

        // A kept raw value survives only while it still reads as the typed one.
        let raw_role_current = map.get(ROLE_CLAIM).map(parse_role) == Some(self.role.clone());
        if !raw_role_current {
            match &self.role {
                Some(role) => map.insert(ROLE_CLAIM.to_string(), Value::String(role.clone())),
                None => map.remove(ROLE_CLAIM),
            };
        }

        let raw_subdomain_current = map
            .get(SUBDOMAIN_CLAIM)
            .is_some_and(|raw| parse_subdomain(raw) == self.subdomain);
        if !raw_subdomain_current {
            if self.subdomain.is_empty() {
                map.remove(SUBDOMAIN_CLAIM);
            } else {
                map.insert(
                    SUBDOMAIN_CLAIM.to_string(),
                    Value::Array(self.subdomain.iter().cloned().map(Value::String).collect()),
                );
            }
        }

        map
    }

    /// Overlay `patch` on top of the current claims.
    ///
    /// Keys present in the patch replace existing ones; keys absent from the
    /// patch are preserved.
    pub fn merged(&self, patch: Map<String, Value>) -> Self {
        let mut map = self.to_map();
        map.extend(patch);
        Self::from_map(map)
    }
}

/// Check the reserved claims of an admin-supplied claim object.
///
/// Provider-sourced claims are read leniently; writes through the gateway
/// must use the canonical shapes.
pub fn validate_reserved_claims(map: &Map<String, Value>) -> Result<(), String> {
    if let Some(role) = map.get(ROLE_CLAIM) {
        if !role.is_string() {
            return Err("role must be a string".to_string());
        }
    }
    if let Some(subdomain) = map.get(SUBDOMAIN_CLAIM) {
        if !is_canonical_subdomain(subdomain) {
            return Err("subdomain must be an array of strings".to_string());
        }
    }
    Ok(())
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

impl From<Value> for ClaimSet {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Self::default(),
        }
    }
}

impl From<ClaimSet> for Map<String, Value> {
    fn from(claims: ClaimSet) -> Self {
        claims.to_map()
    }
}
