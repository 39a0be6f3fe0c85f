//! Owner profile type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ForgeError, ForgeResult};

/// Publisher profile returned by `v3/users/<username>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Registry fields the collector does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Owner {
    /// Create an owner profile with only the required fields
    pub fn new(username: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            username: username.into(),
            display_name,
            extra: Map::new(),
        }
    }

    /// Build an owner from a parsed JSON object
    pub fn from_value(value: Value) -> ForgeResult<Self> {
        serde_json::from_value(value).map_err(|e| ForgeError::json("malformed owner record", e))
    }
}
