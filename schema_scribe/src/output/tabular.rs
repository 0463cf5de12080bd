//! Tabular (CSV) export
//!
//! One row per column with the values exactly as written in the document.

use crate::error::Result;
use crate::parser::{ParseEvent, ParseListener};

/// Header row of the export
pub const CSV_HEADER: [&str; 6] = ["table", "column", "type", "comment", "foreign_key", "required"];

/// Collects column rows from parse events
#[derive(Debug, Default)]
pub struct TabularExport {
    rows: Vec<[String; 6]>,
}

impl TabularExport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render header plus rows as CSV
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_record(&mut out, CSV_HEADER.iter().copied());
        for row in &self.rows {
            write_record(&mut out, row.iter().map(String::as_str));
        }
        out
    }
}

impl ParseListener for TabularExport {
    fn on_event(&mut self, event: &ParseEvent) -> Result<()> {
        if let ParseEvent::Column { table, row, .. } = event {
            self.rows.push([
                table.clone(),
                row.name.clone(),
                row.source_type.clone(),
                row.comment.clone(),
                row.foreign_key.clone(),
                row.required.clone(),
            ]);
        }
        Ok(())
    }
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (idx, field) in fields.enumerate() {
        if idx > 0 {
            out.push(',');
        }
        write_field(out, field);
    }
    out.push('\n');
}

/// Quote fields containing separators, quotes or line breaks; double inner quotes
fn write_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
