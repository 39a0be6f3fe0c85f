//! # forge-core
//!
//! Core types and utilities shared across all forge crates.
//!
//! This crate provides:
//! - Typed Module, Release and Owner records with open extension maps
//! - The Item envelope wrapped around every collected module
//! - ForgeError enum for unified error handling
//! - Time parsing and item identifier helpers
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Registry records and the item envelope
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{ForgeError, ForgeResult};
pub use types::{Item, Module, ModuleOwner, Owner, Release, SearchFields};

/// Registry the collector talks to unless configured otherwise
pub const PUPPET_FORGE_URL: &str = "https://forge.puppet.com/";

/// Default number of items requested per page
pub const MAX_ITEMS: u32 = 100;
