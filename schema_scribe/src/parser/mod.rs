//! Table parser
//!
//! Scans a markdown data-model document line by line. Each table section is
//! a heading naming the table, a markdown table header, a separator line of
//! four or more dashes and pipe-delimited column rows ending at a blank line:
//!
//! ```text
//! ### [patients](#patients)
//!
//! | column | type | description | foreign key | required |
//! |--------|------|-------------|-------------|----------|
//! | id     | serial |           |             |          |
//! | name   | text | Full name   |             | x        |
//! ```
//!
//! The parser is a state transition `(state, line) -> (state', events)`.
//! Listeners receive every event as it happens; the [`SchemaModel`] is
//! assembled from the closed tables.

pub mod row;

use once_cell::sync::Lazy;
use regex::Regex;
use std::mem;

use crate::error::{Error, Result};
use crate::schema::resolver;
use crate::schema::types::{ColumnDefinition, SchemaModel, TableDefinition};
use crate::utils::naming::{extract_reference, is_identifier};

pub use row::RawRow;

static SEPARATOR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{4,}").unwrap());

/// Heading recognition for one parse pass
#[derive(Debug, Clone)]
pub struct ParserOptions {
    heading_depth: usize,
    heading_pattern: Regex,
}

impl ParserOptions {
    /// Headings with at least `heading_depth` `#` characters open a table
    pub fn new(heading_depth: usize) -> Result<Self> {
        if heading_depth == 0 {
            return Err(Error::ConfigError(
                "heading depth must be at least 1".to_string(),
            ));
        }

        let heading_pattern = Regex::new(&format!(r"^#{{{},}}\s*(.+)$", heading_depth))
            .map_err(|e| Error::ConfigError(format!("Invalid heading pattern: {}", e)))?;

        Ok(Self {
            heading_depth,
            heading_pattern,
        })
    }

    pub fn heading_depth(&self) -> usize {
        self.heading_depth
    }

    /// Table name named by a heading line, if the line is a table heading
    pub fn table_name(&self, line: &str) -> Option<String> {
        let heading = self.heading_pattern.captures(line)?.get(1)?.as_str();

        extract_reference(heading).or_else(|| {
            let plain = heading.trim_start_matches('#').trim();
            is_identifier(plain).then(|| plain.to_string())
        })
    }
}

/// Where the parser is relative to a table section
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ParserState {
    #[default]
    OutsideTable,
    HeaderSeenAwaitingSeparator(TableDefinition),
    CollectingRows(TableDefinition),
}

impl ParserState {
    pub fn open_table(&self) -> Option<&TableDefinition> {
        match self {
            ParserState::OutsideTable => None,
            ParserState::HeaderSeenAwaitingSeparator(table)
            | ParserState::CollectingRows(table) => Some(table),
        }
    }

    /// Close whatever table is open
    fn finalize(self) -> Vec<ParseEvent> {
        match self {
            ParserState::OutsideTable => Vec::new(),
            ParserState::HeaderSeenAwaitingSeparator(table)
            | ParserState::CollectingRows(table) => vec![ParseEvent::EndTable(table)],
        }
    }
}

/// What the parser recognised on a line
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    BeginTable {
        table: String,
    },
    /// Separator line reached; column rows follow
    RowsStarted {
        table: String,
    },
    Column {
        table: String,
        row: RawRow,
        column: ColumnDefinition,
    },
    EndTable(TableDefinition),
}

/// Receives parse events in document order
pub trait ParseListener {
    fn on_event(&mut self, event: &ParseEvent) -> Result<()>;
}

/// Apply one line to the parser state
pub fn transition(
    state: ParserState,
    line: &str,
    options: &ParserOptions,
) -> Result<(ParserState, Vec<ParseEvent>)> {
    // a new heading closes whatever table is open
    if let Some(name) = options.table_name(line) {
        let mut events = state.finalize();
        events.push(ParseEvent::BeginTable {
            table: name.clone(),
        });
        return Ok((
            ParserState::HeaderSeenAwaitingSeparator(TableDefinition::new(&name)),
            events,
        ));
    }

    if SEPARATOR_PATTERN.is_match(line) {
        return Ok(match state {
            ParserState::HeaderSeenAwaitingSeparator(table) => {
                let event = ParseEvent::RowsStarted {
                    table: table.name.clone(),
                };
                (ParserState::CollectingRows(table), vec![event])
            }
            // horizontal rule, or a stray separator among rows
            other => (other, Vec::new()),
        });
    }

    // blank line ends the row block
    if line.trim().is_empty() {
        return Ok(match state {
            ParserState::CollectingRows(table) => {
                (ParserState::OutsideTable, vec![ParseEvent::EndTable(table)])
            }
            other => (other, Vec::new()),
        });
    }

    match state {
        ParserState::CollectingRows(mut table) => {
            let row = RawRow::split(line);
            let column = build_column(&row)?;
            if row.is_short() {
                tracing::debug!(table = %table.name, column = %row.name, fields = row.field_count, "Short row padded with empty fields");
            }
            table.add_column(column.clone());
            let event = ParseEvent::Column {
                table: table.name.clone(),
                row,
                column,
            };
            Ok((ParserState::CollectingRows(table), vec![event]))
        }
        other => Ok((other, Vec::new())),
    }
}

/// Resolve a raw row into a column definition
fn build_column(row: &RawRow) -> Result<ColumnDefinition> {
    let resolution = resolver::resolve(&row.name, &row.source_type)?;

    Ok(ColumnDefinition {
        name: row.name.clone(),
        source_type: resolution.source_type,
        target_type: resolution.target_type,
        options: resolution.options,
        comment: row.comment.clone(),
        foreign_key: extract_reference(&row.foreign_key),
        required: row.is_required(),
    })
}

/// Incremental driver around [`transition`] that assembles a [`SchemaModel`]
pub struct TableParser {
    options: ParserOptions,
    state: ParserState,
    model: SchemaModel,
    line: usize,
}

impl TableParser {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            state: ParserState::OutsideTable,
            model: SchemaModel::new(),
            line: 0,
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Feed the next document line
    pub fn process_line(&mut self, line: &str) -> Result<Vec<ParseEvent>> {
        self.line += 1;
        let state = mem::take(&mut self.state);
        let (next, events) =
            transition(state, line, &self.options).map_err(|e| e.at_line(self.line))?;
        self.state = next;
        Ok(events)
    }

    /// Close any table still open at end of input
    pub fn finish(&mut self) -> Vec<ParseEvent> {
        mem::take(&mut self.state).finalize()
    }

    /// Fold a closed table into the model
    pub fn record(&mut self, event: ParseEvent) {
        if let ParseEvent::EndTable(table) = event {
            if table.is_empty() {
                tracing::debug!(table = %table.name, "Heading without columns left out of the model");
            } else {
                tracing::debug!(table = %table.name, columns = table.columns.len(), "Parsed table");
                self.model.add_table(table);
            }
        }
    }

    pub fn into_model(self) -> SchemaModel {
        self.model
    }
}

/// Parse a whole document, notifying `listeners` of every event
pub fn parse_document(
    document: &str,
    options: &ParserOptions,
    listeners: &mut [&mut dyn ParseListener],
) -> Result<SchemaModel> {
    let mut parser = TableParser::new(options.clone());

    // listeners see each event before the model folds it in
    for line in document.lines() {
        let events = parser.process_line(line)?;
        dispatch(&mut parser, events, listeners)?;
    }

    let events = parser.finish();
    dispatch(&mut parser, events, listeners)?;

    let model = parser.into_model();
    tracing::info!(tables = model.len(), depth = options.heading_depth(), "Parsed data model document");
    Ok(model)
}

fn dispatch(
    parser: &mut TableParser,
    events: Vec<ParseEvent>,
    listeners: &mut [&mut dyn ParseListener],
) -> Result<()> {
    for event in events {
        for listener in listeners.iter_mut() {
            listener.on_event(&event)?;
        }
        parser.record(event);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{SourceType, TargetType};
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = "\
# Data Model

Some prose about the model.

### [patients](#patients)

| column | type | description | foreign key | required |
|--------|------|-------------|-------------|----------|
| id | serial | | | |
| name | text | Full name | | x |
| birth_date | date | | | |

### [visits](#visits)

| column | type | description | foreign key | required |
|--------|------|-------------|-------------|----------|
| id | int | | | |
| patient_id | int | Who came in | [patients](#patients) | x |
";

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ParseListener for Recorder {
        fn on_event(&mut self, event: &ParseEvent) -> Result<()> {
            self.events.push(match event {
                ParseEvent::BeginTable { table } => format!("begin {table}"),
                ParseEvent::RowsStarted { table } => format!("rows {table}"),
                ParseEvent::Column { table, column, .. } => format!("column {table}.{}", column.name),
                ParseEvent::EndTable(table) => format!("end {}", table.name),
            });
            Ok(())
        }
    }

    fn options(depth: usize) -> ParserOptions {
        ParserOptions::new(depth).expect("valid depth")
    }

    #[test]
    fn test_parse_document_events_in_order() {
        let mut recorder = Recorder::default();
        let model = parse_document(DOCUMENT, &options(3), &mut [&mut recorder]).expect("parses");

        assert_eq!(
            recorder.events,
            vec![
                "begin patients",
                "rows patients",
                "column patients.id",
                "column patients.name",
                "column patients.birth_date",
                "end patients",
                "begin visits",
                "rows visits",
                "column visits.id",
                "column visits.patient_id",
                "end visits",
            ]
        );
        assert_eq!(model.tables.keys().collect::<Vec<_>>(), vec!["patients", "visits"]);
    }

    #[test]
    fn test_column_attributes_are_merged() {
        let model = parse_document(DOCUMENT, &options(3), &mut []).expect("parses");
        let patients = model.table("patients").expect("patients table");

        let id = patients.column("id").expect("id column");
        assert_eq!(id.source_type, SourceType::Serial);
        assert_eq!(id.target_type, TargetType::PrimaryKey);
        assert!(!id.required);

        let name = patients.column("name").expect("name column");
        assert_eq!(name.target_type, TargetType::String);
        assert_eq!(name.comment, "Full name");
        assert!(name.required);

        let visits = model.table("visits").expect("visits table");
        let patient_id = visits.column("patient_id").expect("fk column");
        assert_eq!(patient_id.foreign_key.as_deref(), Some("patients"));
        assert!(visits.column("id").map(|c| c.is_primary()).unwrap_or(false));
    }

    #[test]
    fn test_table_running_to_end_of_input_is_finalized() {
        let document = "## [costs]\n----\n| amount | float |";
        let mut recorder = Recorder::default();
        let model = parse_document(document, &options(2), &mut [&mut recorder]).expect("parses");

        assert_eq!(recorder.events.last().map(String::as_str), Some("end costs"));
        assert_eq!(model.table("costs").map(|t| t.columns.len()), Some(1));
    }

    #[test]
    fn test_missing_required_field_is_not_an_error() {
        let document = "## [deaths]\n|----|\n| cause | text | Cause of death\n";
        let model = parse_document(document, &options(2), &mut []).expect("parses");
        let cause = model
            .table("deaths")
            .and_then(|t| t.column("cause"))
            .expect("cause column");

        assert!(!cause.required);
        assert_eq!(cause.foreign_key, None);
    }

    #[test]
    fn test_unknown_type_aborts_with_line_number() {
        let document = "## [costs]\n----\n| amount | money | | | |\n";
        let err = parse_document(document, &options(2), &mut []).unwrap_err();

        match &err {
            Error::Document { line, .. } => assert_eq!(*line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.unknown_token(), Some("money"));
    }

    #[test]
    fn test_heading_depth_selects_sections() {
        let document = "## [shallow]\n----\n| a | int |\n\n### [deep]\n----\n| b | int |\n";

        let shallow = parse_document(document, &options(2), &mut []).expect("parses");
        assert_eq!(shallow.tables.keys().collect::<Vec<_>>(), vec!["shallow", "deep"]);

        let deep = parse_document(document, &options(3), &mut []).expect("parses");
        assert_eq!(deep.tables.keys().collect::<Vec<_>>(), vec!["deep"]);
    }

    #[test]
    fn test_table_names_from_headings() {
        let opts = options(2);
        assert_eq!(opts.table_name("## [patients](#patients)").as_deref(), Some("patients"));
        assert_eq!(opts.table_name("### [concepts]").as_deref(), Some("concepts"));
        assert_eq!(
            opts.table_name("## [contexts](#c) & [practitioners](#p)").as_deref(),
            Some("contexts_practitioners")
        );
        assert_eq!(opts.table_name("## mappings").as_deref(), Some("mappings"));
        assert_eq!(opts.table_name("## Table Overview"), None);
        assert_eq!(opts.table_name("# [patients]"), None);
        assert_eq!(opts.table_name("patients"), None);
    }

    #[test]
    fn test_prose_and_rules_outside_tables_are_ignored() {
        let document = "Intro text\n\n-----\n\n| not | a | row |\n";
        let mut recorder = Recorder::default();
        let model = parse_document(document, &options(2), &mut [&mut recorder]).expect("parses");

        assert!(recorder.events.is_empty());
        assert!(model.is_empty());
    }

    #[test]
    fn test_new_heading_closes_open_table() {
        let document = "## [a]\n----\n| x | int |\n## [b]\n----\n| y | int |\n";
        let mut recorder = Recorder::default();
        parse_document(document, &options(2), &mut [&mut recorder]).expect("parses");

        assert_eq!(
            recorder.events,
            vec!["begin a", "rows a", "column a.x", "end a", "begin b", "rows b", "column b.y", "end b"]
        );
    }

    #[test]
    fn test_table_without_rows_stays_out_of_model() {
        let document = "## [empty]\n|----|----|\n\n## [full]\n----\n| a | int |\n";
        let mut recorder = Recorder::default();
        let model = parse_document(document, &options(2), &mut [&mut recorder]).expect("parses");

        assert_eq!(
            recorder.events,
            vec!["begin empty", "rows empty", "end empty", "begin full", "rows full", "column full.a", "end full"]
        );
        assert_eq!(model.tables.keys().collect::<Vec<_>>(), vec!["full"]);
    }

    #[test]
    fn test_transition_states() {
        let opts = options(2);
        let (state, events) = transition(ParserState::OutsideTable, "## [costs]", &opts).expect("heading");
        assert!(matches!(state, ParserState::HeaderSeenAwaitingSeparator(_)));
        assert_eq!(events.len(), 1);

        let (state, events) = transition(state, "| column | type |", &opts).expect("header row");
        assert!(matches!(state, ParserState::HeaderSeenAwaitingSeparator(_)));
        assert!(events.is_empty());

        let (state, events) = transition(state, "|----|----|", &opts).expect("separator");
        assert!(matches!(state, ParserState::CollectingRows(_)));
        assert!(matches!(events.as_slice(), [ParseEvent::RowsStarted { table }] if table == "costs"));

        let (state, events) = transition(state, "| amount | float |", &opts).expect("row");
        assert_eq!(state.open_table().map(|t| t.columns.len()), Some(1));
        assert!(matches!(events.as_slice(), [ParseEvent::Column { .. }]));

        let (state, events) = transition(state, "   ", &opts).expect("blank");
        assert_eq!(state, ParserState::OutsideTable);
        assert!(matches!(events.as_slice(), [ParseEvent::EndTable(_)]));
    }

    #[test]
    fn test_zero_heading_depth_is_rejected() {
        assert!(matches!(ParserOptions::new(0), Err(Error::ConfigError(_))));
    }
}
