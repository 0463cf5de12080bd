//! Utilities for SchemaScribe
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod naming;

// Re-export key utility functions
pub use naming::{extract_reference, is_identifier, CONTEXTS_PRACTITIONERS};
