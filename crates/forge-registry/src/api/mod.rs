//! Puppet Forge v3 wire format
//!
//! Resource paths, query parameter names and the two JSON shapes the
//! collector looks at: the `results` array of list endpoints and the
//! `pagination.next` cursor.

use serde_json::Value;
use forge_core::error::ForgeError;
use crate::RegistryResult;

/// API version prefix of every resource path
pub const API_PREFIX: &str = "v3";

/// Module listing resource
pub const RMODULES: &str = "modules";
/// Release listing resource
pub const RRELEASES: &str = "releases";
/// User profile resource; the username is appended as a path segment
pub const RUSERS: &str = "users";

pub const PLIMIT: &str = "limit";
pub const PMODULE: &str = "module";
pub const PSHOW_DELETED: &str = "show_deleted";
pub const PSORT_BY: &str = "sort_by";

pub const VLATEST_RELEASE: &str = "latest_release";
pub const VRELEASE_DATE: &str = "release_date";

/// Result of parsing one page body
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPage {
    /// Body of a list endpoint: the contents of its `results` array
    Items(Vec<Value>),
    /// Any other body, such as a user profile
    Single(Value),
}

impl ParsedPage {
    /// Items of the page; a single array value yields its elements
    pub fn into_items(self) -> Vec<Value> {
        match self {
            ParsedPage::Items(items) => items,
            ParsedPage::Single(Value::Array(items)) => items,
            ParsedPage::Single(value) => vec![value],
        }
    }

    /// The single object of the page
    pub fn into_single(self) -> RegistryResult<Value> {
        match self {
            ParsedPage::Single(value) => Ok(value),
            ParsedPage::Items(items) => Err(ForgeError::Protocol {
                message: format!("expected a single object, got a list of {} items", items.len()),
            }),
        }
    }
}

/// Parse a raw page body; a top-level `results` key marks a list page
pub fn parse_page(raw: &str) -> RegistryResult<ParsedPage> {
    let value: Value = serde_json::from_str(raw).map_err(|e| ForgeError::json("invalid page body", e))?;

    match value {
        Value::Object(mut map) if map.contains_key("results") => match map.remove("results") {
            Some(Value::Array(items)) => Ok(ParsedPage::Items(items)),
            Some(Value::Null) | None => Ok(ParsedPage::Items(Vec::new())),
            Some(other) => Err(ForgeError::parse(format!(
                "'results' must be an array, found {}",
                json_kind(&other)
            ))),
        },
        other => Ok(ParsedPage::Single(other)),
    }
}

/// Extract the next-page cursor of a parsed page.
///
/// A page without a `pagination` object ends the sequence, even on list
/// endpoints. `next` being absent, null or empty ends it as well.
pub fn next_cursor(page: &Value) -> RegistryResult<Option<String>> {
    let pagination = match page.get("pagination") {
        Some(pagination) => pagination,
        None => return Ok(None),
    };

    let pagination = pagination.as_object().ok_or_else(|| {
        ForgeError::parse(format!("'pagination' must be an object, found {}", json_kind(pagination)))
    })?;

    match pagination.get("next") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(next)) if next.is_empty() => Ok(None),
        Some(Value::String(next)) => Ok(Some(next.clone())),
        Some(other) => Err(ForgeError::parse(format!(
            "'pagination.next' must be a string, found {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests;
