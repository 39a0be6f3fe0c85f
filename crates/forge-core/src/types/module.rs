//! Module and release record types.
//!
//! A module is deserialized from one entry of the `v3/modules` listing. The
//! fields the collector relies on are typed; everything else the registry
//! sends is kept in `extra` and written back out untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Owner;
use crate::error::{ForgeError, ForgeResult};
use crate::utils::time::str_to_datetime;

/// Module metadata from the registry, enriched with releases and owner profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub owner: ModuleOwner,
    pub updated_at: String,
    /// Every release of the module, in the order the registry returned them
    #[serde(default)]
    pub releases: Vec<Release>,
    /// Resolved owner profile, shared with other modules of the same owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_data: Option<Arc<Owner>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Owner reference embedded in a module listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleOwner {
    pub username: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Release record; the collector does not interpret any of its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Release(pub Value);

impl Module {
    /// Build a module from one parsed listing entry
    pub fn from_value(value: Value) -> ForgeResult<Self> {
        serde_json::from_value(value).map_err(|e| ForgeError::json("malformed module record", e))
    }

    /// Registry identifier, `<owner>-<name>`
    pub fn id(&self) -> String {
        format!("{}-{}", self.owner.username, self.name)
    }

    /// Parse `updated_at` into an absolute point in time
    pub fn updated_on(&self) -> ForgeResult<DateTime<Utc>> {
        str_to_datetime(&self.updated_at)
    }

    /// String value of a registry field kept in the extension area
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Attach releases and owner profile
    pub fn enrich(&mut self, releases: Vec<Release>, owner: Arc<Owner>) {
        self.releases = releases;
        self.owner_data = Some(owner);
    }
}

impl From<Value> for Release {
    fn from(value: Value) -> Self {
        Release(value)
    }
}
