//! Item envelope wrapped around every collected module.

use serde::{Deserialize, Serialize};

use super::Module;

/// Envelope carrying a collected module and its provenance metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub backend_name: String,
    pub backend_version: String,
    /// When the item was fetched, in seconds since the Unix epoch
    pub timestamp: f64,
    pub origin: String,
    pub uuid: String,
    /// `updated_at` of the module, in seconds since the Unix epoch
    pub updated_on: f64,
    pub category: String,
    pub search_fields: SearchFields,
    pub tag: String,
    pub data: Module,
}

/// Fields indexed for searching collected items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFields {
    pub item_id: String,
    pub module_group: Option<String>,
    pub slug: Option<String>,
}

impl SearchFields {
    /// Extract the search fields of a module
    pub fn for_module(module: &Module) -> Self {
        Self {
            item_id: module.id(),
            module_group: module.field_str("module_group").map(str::to_string),
            slug: module.field_str("slug").map(str::to_string),
        }
    }
}
