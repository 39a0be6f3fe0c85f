//! Command implementations.
//!
//! The collector has a single command, `fetch`, driven by the top-level flags.

use camino::Utf8PathBuf;
use forge_core::error::{ForgeError, ForgeResult};

pub mod fetch;


/// Shared context for commands
pub struct CommandContext {
    /// Directory forge.toml discovery starts from
    pub cwd: Utf8PathBuf,
}

impl CommandContext {
    /// Create a context rooted at the current directory
    pub fn new() -> ForgeResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| ForgeError::io("Failed to get current directory".to_string(), e))?;

        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| ForgeError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("Invalid current directory path: {}", e),
        })?;

        Ok(Self { cwd })
    }
}
