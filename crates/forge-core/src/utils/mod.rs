//! Utility functions and helpers.
//!
//! Common functionality used across multiple forge crates.

pub mod hash;
pub mod time;

// Re-export commonly used utilities
pub use hash::item_uuid;
pub use time::{datetime_to_timestamp, default_datetime, str_to_datetime};
