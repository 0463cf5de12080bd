//! Output module for SchemaScribe
//!
//! Emitters that turn the parsed model into artifacts, and artifact writing.

pub mod diagram;
pub mod dump;
pub mod migration;
pub mod render;
pub mod tabular;
pub mod writer;

use std::fs;
use std::path::Path;

use crate::error::Result;

// Re-export key types
pub use diagram::render_diagram;
pub use dump::{DumpColumn, StructuredDump};
pub use migration::MigrationEmitter;
pub use render::{CommandRenderer, DiagramRenderer};
pub use tabular::TabularExport;
pub use writer::BlockWriter;

/// Write an artifact, creating its directory first
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
    Ok(())
}
