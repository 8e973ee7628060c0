//! Document store models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field carrying a document's tenant-ownership tag.
pub const TENANT_FIELD: &str = "subdomain";

/// Field partitioning documents by project.
pub const PROJECT_FIELD: &str = "project_id";

/// Equality operator accepted by the document store.
pub const EQ: &str = "==";

/// Externally owned document record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Tenant tag of the document, if it carries a string one.
    pub fn tenant(&self) -> Option<&str> {
        self.fields.get(TENANT_FIELD).and_then(Value::as_str)
    }
}

/// Single query predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl QueryFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: EQ.to_string(),
            value: value.into(),
        }
    }

    pub fn is_equality_on(&self, field: &str) -> bool {
        self.field == field && self.operator == EQ
    }
}

/// Query request forwarded to the document store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub filters: Vec<QueryFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl QueryOptions {
    pub fn has_equality_filter(&self, field: &str) -> bool {
        self.filters.iter().any(|f| f.is_equality_on(field))
    }
}
