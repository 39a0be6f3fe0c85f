//! Terminal output: item lines on stdout, formatted errors on stderr.

pub mod colors;
pub mod errors;

use std::io::Write;

use forge_core::error::{ForgeError, ForgeResult};
use forge_core::Item;

/// Writes items as JSON lines
pub struct JsonLinesWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Serialize one item on its own line
    pub fn write_item(&mut self, item: &Item) -> ForgeResult<()> {
        serde_json::to_writer(&mut self.out, item)
            .map_err(|e| ForgeError::json(format!("cannot serialize item {}", item.uuid), e))?;
        self.out
            .write_all(b"\n")
            .map_err(|e| ForgeError::io("Failed to write item".to_string(), e))?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> ForgeResult<()> {
        self.out
            .flush()
            .map_err(|e| ForgeError::io("Failed to flush output".to_string(), e))
    }

    /// Number of items written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
