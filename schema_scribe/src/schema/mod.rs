//! Schema module for SchemaScribe
//!
//! This module holds the parsed data model and the type resolution rules.

pub mod resolver;
pub mod types;

// Re-export key types
pub use resolver::{is_primary, resolve};
pub use types::{
    ColumnDefinition, ColumnOptions, Relationship, Resolution, SchemaModel, SourceType,
    TableDefinition, TargetType,
};
