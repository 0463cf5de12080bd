//! Naming utilities for SchemaScribe
//!
//! Reference extraction from markdown link tokens, identifier checks and
//! artifact file naming.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Joined name used for the contexts/practitioners join table
pub const CONTEXTS_PRACTITIONERS: &str = "contexts_practitioners";

static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.+)\]").unwrap());
static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Extract the referenced name from a markdown link token such as `[patients](#patients)`.
///
/// Returns `None` for empty input or text that carries no bracketed link.
/// Any text mentioning both `contexts` and `practitioners` names the join
/// table, whatever its brackets contain.
pub fn extract_reference(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    if text.contains("contexts") && text.contains("practitioners") {
        return Some(CONTEXTS_PRACTITIONERS.to_string());
    }

    LINK_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|payload| payload.as_str().to_string())
}

/// Whether `name` is a bare identifier (letters, digits, underscores)
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(name)
}

/// Format name as a valid file name component
pub fn format_file_name(name: &str) -> String {
    name.replace(
        [' ', '/', '\\', ':', '*', '?', '"', '<', '>', '|'],
        "_",
    )
    .to_lowercase()
}

/// Prefix the file name of `path` with a `%Y%m%d%H%M%S` timestamp
pub fn timestamped_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| format_file_name(&name.to_string_lossy()))
        .unwrap_or_default();

    path.with_file_name(format!("{}_{}", now.format("%Y%m%d%H%M%S"), file_name))
}
