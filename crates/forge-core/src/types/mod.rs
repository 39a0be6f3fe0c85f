//! Registry record types.
//!
//! This module provides the typed records produced by the collector:
//! - Module records with their releases and resolved owner profile
//! - Owner profiles as returned by the users endpoint
//! - The Item envelope wrapped around each collected module

pub mod item;
pub mod module;
pub mod owner;

// Re-export all public types
pub use item::{Item, SearchFields};
pub use module::{Module, ModuleOwner, Release};
pub use owner::Owner;
