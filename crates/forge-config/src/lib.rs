//! Configuration loading for the Puppet Forge collector
//!
//! This crate parses forge.toml files and layers environment variables and
//! command line flags on top, producing the settings the collector runs with.

pub mod merge;
pub mod toml;

// Re-export main types
pub use self::merge::{CliOverrides, ConfigLayering, ConfigLoader, ConfigSource};
pub use self::toml::{ArchiveMode, ArchiveSection, ForgeConfig, RetrySection};

use forge_core::error::ForgeError;
pub use forge_core::{MAX_ITEMS, PUPPET_FORGE_URL};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ForgeError>;

/// Name of the per-project configuration file
pub const CONFIG_FILE_NAME: &str = "forge.toml";
