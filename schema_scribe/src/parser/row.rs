//! Body-row splitting
//!
//! A column row looks like `| name | type | comment | [table](#table) | x |`.

/// Number of pipe-delimited fields in a column row
pub const ROW_FIELDS: usize = 5;

/// The five trimmed fields of a column row, before any resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub name: String,
    pub source_type: String,
    pub comment: String,
    pub foreign_key: String,
    pub required: String,
    /// Fields actually present in the line
    pub field_count: usize,
}

impl RawRow {
    /// Split a row line into its fields.
    ///
    /// One leading and one trailing pipe are dropped. Missing trailing
    /// fields become empty strings; fields past the fifth are ignored.
    pub fn split(line: &str) -> Self {
        let line = line.trim();
        let line = line.strip_prefix('|').unwrap_or(line);
        let line = line.strip_suffix('|').unwrap_or(line);

        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        let field = |idx: usize| fields.get(idx).map(|f| f.to_string()).unwrap_or_default();

        Self {
            name: field(0),
            source_type: field(1),
            comment: field(2),
            foreign_key: field(3),
            required: field(4),
            field_count: fields.len(),
        }
    }

    /// Whether the row carried fewer than five fields
    pub fn is_short(&self) -> bool {
        self.field_count < ROW_FIELDS
    }

    /// A non-empty required field marks the column as required
    pub fn is_required(&self) -> bool {
        !self.required.is_empty()
    }
}
