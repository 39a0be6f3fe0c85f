//! Puppet Forge REST API client and module collector
//!
//! This crate walks the registry's `v3` API: it pages through modules newest
//! first, resolves every module's releases and owner profile, and wraps the
//! result in item envelopes. Responses can be recorded to and replayed from a
//! local archive.

pub mod api;
pub mod archive;
pub mod backend;
pub mod cache;
pub mod client;
pub mod collector;
pub mod transport;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export main types
pub use api::{parse_page, ParsedPage};
pub use archive::{Archive, ArchiveEntry, RecordingTransport, ReplayTransport};
pub use backend::{ItemStream, PuppetForge};
pub use cache::OwnerCache;
pub use client::{ForgeClient, PageCursor};
pub use collector::{ModuleCollector, ModuleStream};
pub use transport::{HttpTransport, RawResponse, RetryConfig, Transport, TransportConfig};

use forge_core::error::ForgeError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, ForgeError>;
