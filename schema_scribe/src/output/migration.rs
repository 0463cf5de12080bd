//! Migration script emitter
//!
//! Renders tables as a Sequel migration:
//!
//! ```ruby
//! Sequel.migration do
//!   change do
//!     create_table(:patients) do
//!       primary_key :id, type: :Bigint, comment: ""
//!       String :name, text: true, comment: "Full name", null: false
//!     end
//!
//!   end
//! end
//! ```
//!
//! The emitter listens to parser events, so the script is written while the
//! document is scanned.

use crate::config::MigrationConfig;
use crate::error::Result;
use crate::output::writer::BlockWriter;
use crate::parser::{ParseEvent, ParseListener};
use crate::schema::types::{ColumnDefinition, SchemaModel, TargetType};
use crate::utils::naming::is_identifier;

/// Key column every foreign key points at
pub const FOREIGN_KEY_TARGET: &str = "id";

/// Streams a Sequel migration from parse events
pub struct MigrationEmitter {
    writer: BlockWriter,
    config: MigrationConfig,
    pending: Option<String>,
    open: Option<String>,
}

impl MigrationEmitter {
    /// Create an emitter with the migration and change blocks already open
    pub fn new(config: &MigrationConfig) -> Self {
        let mut writer = BlockWriter::new(config.indent_width, "end");
        writer.open_block("Sequel.migration do");
        writer.open_block("change do");

        Self {
            writer,
            config: config.clone(),
            pending: None,
            open: None,
        }
    }

    /// Render a whole model at once
    pub fn emit_model(model: &SchemaModel, config: &MigrationConfig) -> Result<String> {
        let mut emitter = Self::new(config);
        for table in model.tables.values() {
            emitter.on_event(&ParseEvent::BeginTable {
                table: table.name.clone(),
            })?;
            emitter.on_event(&ParseEvent::RowsStarted {
                table: table.name.clone(),
            })?;
            for column in table.columns.values() {
                emitter.write_column(&table.name, column);
            }
            emitter.on_event(&ParseEvent::EndTable(table.clone()))?;
        }
        Ok(emitter.finish())
    }

    /// Close all remaining blocks and return the script
    pub fn finish(mut self) -> String {
        let healed = self.writer.finish();
        // migration + change blocks are always open here
        if healed > 2 {
            tracing::warn!(blocks = healed - 2, "Closed table blocks left open at end of input");
        }
        self.writer.into_string()
    }

    fn begin_table(&mut self, table: &str) {
        if let Some(open) = &self.open {
            tracing::warn!(table = %open, next = %table, "Table block still open when next table began");
        }
        self.pending = Some(table.to_string());
    }

    /// Open `create_table` for the pending heading, if there is one
    fn open_table(&mut self) -> bool {
        match self.pending.take() {
            Some(name) => {
                self.writer
                    .open_block(&format!("create_table({}) do", ruby_symbol(&name)));
                self.open = Some(name);
                true
            }
            None => false,
        }
    }

    fn write_column(&mut self, table: &str, column: &ColumnDefinition) {
        if !self.open_table() && self.open.is_none() {
            tracing::warn!(table = %table, column = %column.name, "Column outside of a table block");
        }
        self.writer.write_line(&render_column(column));
    }

    fn end_table(&mut self, table: &str) {
        // heading never reached a separator: prose, not a table
        if self.pending.take().is_some() {
            tracing::debug!(table = %table, "No column block, create_table skipped");
            return;
        }
        if self.open.take().is_none() {
            return;
        }
        if self.config.emit_indexes {
            for index in self.config.indexes.get(table).into_iter().flatten() {
                self.writer.write_line(&render_index(index));
            }
        }
        self.writer.close_block();
    }
}

impl ParseListener for MigrationEmitter {
    fn on_event(&mut self, event: &ParseEvent) -> Result<()> {
        match event {
            ParseEvent::BeginTable { table } => self.begin_table(table),
            ParseEvent::RowsStarted { .. } => {
                self.open_table();
            }
            ParseEvent::Column { table, column, .. } => self.write_column(table, column),
            ParseEvent::EndTable(table) => self.end_table(&table.name),
        }
        Ok(())
    }
}

/// Sequel generator method for a resolved type
fn sequel_method(target_type: TargetType) -> &'static str {
    match target_type {
        TargetType::Integer => "Integer",
        TargetType::String => "String",
        TargetType::Float => "Float",
        TargetType::Date => "Date",
        TargetType::Boolean => "TrueClass",
        TargetType::PrimaryKey => "primary_key",
    }
}

/// One column declaration line
pub fn render_column(column: &ColumnDefinition) -> String {
    let mut options: Vec<(&str, String)> = Vec::new();

    let head = match &column.foreign_key {
        Some(target) => {
            // resolved options stay; the key is always a 64-bit reference to `id`
            if column.options.text {
                options.push(("text", "true".to_string()));
            }
            options.push(("type", ":Bigint".to_string()));
            options.push(("key", ruby_symbol(FOREIGN_KEY_TARGET)));
            if column.options.primary_key {
                options.push(("primary_key", "true".to_string()));
            }
            format!(
                "foreign_key {}, {}",
                ruby_symbol(&column.name),
                ruby_symbol(target)
            )
        }
        None => {
            if column.options.text {
                options.push(("text", "true".to_string()));
            }
            if column.options.bigint {
                options.push(("type", ":Bigint".to_string()));
            }
            if column.options.primary_key {
                options.push(("primary_key", "true".to_string()));
            }
            format!(
                "{} {}",
                sequel_method(column.target_type),
                ruby_symbol(&column.name)
            )
        }
    };

    // every column carries a comment, even an empty one
    options.push(("comment", ruby_string(&column.comment)));
    if column.required {
        options.push(("null", "false".to_string()));
    }

    let options: Vec<String> = options
        .into_iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect();
    format!("{}, {}", head, options.join(", "))
}

/// `index [...]` line; identifiers become symbols, anything else is verbatim
fn render_index(columns: &[String]) -> String {
    let parts: Vec<String> = columns
        .iter()
        .map(|col| {
            if is_identifier(col) {
                ruby_symbol(col)
            } else {
                col.clone()
            }
        })
        .collect();
    format!("index [{}]", parts.join(", "))
}

/// Ruby symbol literal, quoted when the name is not a bare identifier
pub fn ruby_symbol(name: &str) -> String {
    if is_identifier(name) {
        format!(":{}", name)
    } else {
        format!(":{}", ruby_string(name))
    }
}

/// Double-quoted Ruby string literal
pub fn ruby_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => out.push_str("\\#"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
