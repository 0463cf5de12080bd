//! Entity-relationship diagram description
//!
//! Produces the plain-text notation understood by the `erd` tool:
//!
//! ```text
//! [visits]
//! *id { label: "Bigint" }
//! +patient_id { label: "Integer, required" }
//! visits ?--* patients
//! ```

use indexmap::IndexSet;

use crate::output::dump::{DumpColumn, StructuredDump};

/// Many-to-one relationship marker
pub const MANY_TO_ONE: &str = "?--*";

/// A table of the diagram
pub struct Entity<'a> {
    name: &'a str,
    columns: Vec<(&'a str, &'a DumpColumn)>,
}

impl<'a> Entity<'a> {
    pub fn new(name: &'a str, columns: impl IntoIterator<Item = (&'a str, &'a DumpColumn)>) -> Self {
        Self {
            name,
            columns: columns.into_iter().collect(),
        }
    }

    /// Distinct referenced tables, first occurrence order
    pub fn relationships(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(|(_, column)| column.foreign_key.as_deref())
            .collect::<IndexSet<_>>()
            .into_iter()
            .map(|target| format!("{} {} {}", self.name, MANY_TO_ONE, target))
            .collect()
    }

    pub fn render(&self) -> String {
        let mut lines = vec![format!("[{}]", self.name)];
        lines.extend(
            self.columns
                .iter()
                .map(|(name, column)| render_attribute(name, column)),
        );
        lines.extend(self.relationships());
        lines.join("\n")
    }
}

/// `<markers><name> { label: "<type>[, required]" }`
fn render_attribute(name: &str, column: &DumpColumn) -> String {
    let mut line = String::new();
    if column.primary_key {
        line.push('*');
    }
    if column.foreign_key.is_some() {
        line.push('+');
    }
    line.push_str(name);
    line.push_str(" { label: \"");
    line.push_str(&column.column_type);
    if column.required {
        line.push_str(", required");
    }
    line.push_str("\" }");
    line
}

/// Render every table of a dump, blank-line separated
pub fn render_diagram(dump: &StructuredDump) -> String {
    dump.tables
        .iter()
        .map(|(table, columns)| {
            Entity::new(
                table,
                columns.iter().map(|(name, column)| (name.as_str(), column)),
            )
            .render()
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
