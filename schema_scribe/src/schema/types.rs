//! Type definitions for the parsed data model

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column type token as written in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Int,
    Text,
    Bigint,
    Serial,
    Float,
    Date,
    Boolean,
}

impl SourceType {
    pub const ALL: [SourceType; 7] = [
        SourceType::Int,
        SourceType::Text,
        SourceType::Bigint,
        SourceType::Serial,
        SourceType::Float,
        SourceType::Date,
        SourceType::Boolean,
    ];

    /// Look up a token from the closed set; anything else is `None`
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == token)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Int => "int",
            SourceType::Text => "text",
            SourceType::Bigint => "bigint",
            SourceType::Serial => "serial",
            SourceType::Float => "float",
            SourceType::Date => "date",
            SourceType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved schema type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    Integer,
    String,
    Float,
    Date,
    Boolean,
    /// Auto-incrementing 64-bit primary key
    PrimaryKey,
}

/// Options produced by type resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnOptions {
    /// Declared as `text`
    pub text: bool,
    /// Integer widened to 64 bits
    pub bigint: bool,
    /// Text-typed primary key; integer primary keys use [`TargetType::PrimaryKey`]
    pub primary_key: bool,
}

/// Result of resolving a column's declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub source_type: SourceType,
    pub target_type: TargetType,
    pub options: ColumnOptions,
}

/// One column row of a table section
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub source_type: SourceType,
    pub target_type: TargetType,
    pub options: ColumnOptions,
    pub comment: String,
    pub foreign_key: Option<String>,
    pub required: bool,
}

impl ColumnDefinition {
    pub fn is_primary(&self) -> bool {
        self.target_type == TargetType::PrimaryKey || self.options.primary_key
    }

    /// Type name used by the structured dump and the diagram
    pub fn type_label(&self) -> &'static str {
        if self.options.bigint {
            return "Bigint";
        }
        match self.target_type {
            TargetType::Integer => "Integer",
            TargetType::String => "String",
            TargetType::Float => "Float",
            TargetType::Date => "Date",
            TargetType::Boolean => "Boolean",
            TargetType::PrimaryKey => "Bigint",
        }
    }
}

/// A table section: name plus columns in document order
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: IndexMap<String, ColumnDefinition>,
}

impl TableDefinition {
    /// Create a new table with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: IndexMap::new(),
        }
    }

    /// Add a column; a repeated name replaces the earlier column in place
    pub fn add_column(&mut self, column: ColumnDefinition) {
        if self.columns.contains_key(&column.name) {
            tracing::warn!(table = %self.name, column = %column.name, "Duplicate column replaces earlier definition");
        }
        self.columns.insert(column.name.clone(), column);
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.get(name)
    }

    /// Referenced tables, first occurrence order, without duplicates
    pub fn referenced_tables(&self) -> Vec<&str> {
        self.columns
            .values()
            .filter_map(|col| col.foreign_key.as_deref())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Many-to-one edge from an owning table to the table a column references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub from: String,
    pub to: String,
}

/// All parsed tables in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaModel {
    pub tables: IndexMap<String, TableDefinition>,
}

impl SchemaModel {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table; a table seen again has its columns merged into the first one
    pub fn add_table(&mut self, table: TableDefinition) {
        match self.tables.get_mut(&table.name) {
            Some(existing) => {
                tracing::debug!(table = %table.name, "Merging repeated table section");
                for (_, column) in table.columns {
                    existing.add_column(column);
                }
            }
            None => {
                self.tables.insert(table.name.clone(), table);
            }
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.get(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Foreign-key edges, deduplicated per owning table
    pub fn relationships(&self) -> Vec<Relationship> {
        self.tables
            .values()
            .flat_map(|table| {
                table.referenced_tables().into_iter().map(|to| Relationship {
                    from: table.name.clone(),
                    to: to.to_string(),
                })
            })
            .collect()
    }
}
