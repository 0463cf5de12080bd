//! Structured schema dump
//!
//! `table -> column -> attributes`, serialized as YAML (or JSON). This is
//! the input of the diagram step.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::DumpFormat;
use crate::error::Result;
use crate::schema::types::{ColumnDefinition, SchemaModel};

/// Attributes kept for each column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpColumn {
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub required: bool,
}

impl From<&ColumnDefinition> for DumpColumn {
    fn from(column: &ColumnDefinition) -> Self {
        Self {
            column_type: column.type_label().to_string(),
            primary_key: column.is_primary(),
            foreign_key: column.foreign_key.clone(),
            comment: column.comment.clone(),
            required: column.required,
        }
    }
}

/// Ordered `table -> column -> attributes` mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredDump {
    pub tables: IndexMap<String, IndexMap<String, DumpColumn>>,
}

impl StructuredDump {
    pub fn from_model(model: &SchemaModel) -> Self {
        let tables = model
            .tables
            .values()
            .map(|table| {
                let columns = table
                    .columns
                    .values()
                    .map(|column| (column.name.clone(), DumpColumn::from(column)))
                    .collect();
                (table.name.clone(), columns)
            })
            .collect();

        Self { tables }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: DumpFormat) -> Result<String> {
        match format {
            DumpFormat::Yaml => self.to_yaml(),
            DumpFormat::Json => self.to_json(),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a dump file; `.json` files are JSON, everything else YAML
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        match format_for_path(path) {
            DumpFormat::Json => Self::from_json(&text),
            DumpFormat::Yaml => Self::from_yaml(&text),
        }
    }
}

/// Dump format implied by a file extension
pub fn format_for_path(path: &Path) -> DumpFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => DumpFormat::Json,
        _ => DumpFormat::Yaml,
    }
}
