//! SchemaScribe: turns a markdown data-model document into schema artifacts
//!
//! The document describes one table per section as a pipe-delimited column
//! table. SchemaScribe parses it once and renders a Sequel migration, a CSV
//! export, a YAML schema dump and an ERD description from the same model.

pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod schema;
pub mod utils;

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

// Re-export main types for easier access
pub use config::Config;
pub use error::{Error, Result};
pub use output::{
    render_diagram, CommandRenderer, DiagramRenderer, MigrationEmitter, StructuredDump,
    TabularExport,
};
pub use parser::{parse_document, ParseEvent, ParseListener, ParserOptions, TableParser};
pub use schema::types::{ColumnDefinition, SchemaModel, TableDefinition};

/// Initialize SchemaScribe with an optional configuration file
pub fn init(config_path: Option<&str>) -> Result<SchemaScribe> {
    let config = config::load_or_default(config_path)?;
    Ok(SchemaScribe::new(config))
}

/// Every text artifact produced from one document
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub model: SchemaModel,
    pub migration: String,
    pub csv: String,
    pub dump: StructuredDump,
    pub diagram: String,
}

/// Where each artifact was written
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub migration: PathBuf,
    pub csv: PathBuf,
    pub dump: PathBuf,
    pub diagram: PathBuf,
    pub image: Option<PathBuf>,
}

/// The document-to-artifacts pipeline
pub struct SchemaScribe {
    config: Config,
}

impl SchemaScribe {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse the document into a model using the table heading depth
    pub fn parse(&self, document: &str) -> Result<SchemaModel> {
        let options = ParserOptions::new(self.config.parser.heading_depth)?;
        parse_document(document, &options, &mut [])
    }

    /// Model plus CSV export, from the table heading depth
    pub fn export(&self, document: &str) -> Result<(SchemaModel, TabularExport)> {
        let options = ParserOptions::new(self.config.parser.heading_depth)?;
        let mut export = TabularExport::new();
        let model = parse_document(document, &options, &mut [&mut export])?;
        Ok((model, export))
    }

    /// Migration script, streamed while parsing at the migration heading depth
    pub fn generate_migration(&self, document: &str) -> Result<String> {
        let options = ParserOptions::new(self.config.parser.migration_heading_depth)?;
        let mut emitter = MigrationEmitter::new(&self.config.migration);
        parse_document(document, &options, &mut [&mut emitter])?;
        Ok(emitter.finish())
    }

    /// Build every artifact in memory; nothing is written if parsing fails
    pub fn build_artifacts(&self, document: &str) -> Result<Artifacts> {
        // both passes run before any file is touched
        let (model, export) = self.export(document)?;
        let migration = self.generate_migration(document)?;
        let dump = StructuredDump::from_model(&model);
        let diagram = render_diagram(&dump);

        Ok(Artifacts {
            model,
            migration,
            csv: export.to_csv(),
            dump,
            diagram,
        })
    }

    /// Write the artifacts under the configured output directory
    pub fn write_artifacts(&self, artifacts: &Artifacts) -> Result<ArtifactPaths> {
        let output = &self.config.output;

        // Resolve paths
        let mut migration = output.path_for(&output.migration_file);
        if self.config.migration.timestamp_filename {
            migration = utils::naming::timestamped_path(&migration, Utc::now());
        }
        let csv = output.path_for(&output.csv_file);
        let dump = output.path_for(&output.dump_file);
        let diagram = output.path_for(&output.diagram_file);

        // Write files; parent directories are created as needed
        output::write_artifact(&migration, &artifacts.migration)?;
        output::write_artifact(&csv, &artifacts.csv)?;
        output::write_artifact(&dump, &artifacts.dump.render(output.dump_format)?)?;
        output::write_artifact(&diagram, &artifacts.diagram)?;

        Ok(ArtifactPaths {
            migration,
            csv,
            dump,
            diagram,
            image: None,
        })
    }

    /// Render the diagram image; failure is logged and yields `None`
    pub fn render_image(&self, diagram: &str, renderer: &dyn DiagramRenderer) -> Option<PathBuf> {
        let image = self.config.output.path_for(&self.config.diagram.image_file);
        if let Some(parent) = image.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "Could not create image directory");
                return None;
            }
        }

        match renderer.render(diagram, &image) {
            Ok(()) => Some(image),
            Err(e) => {
                tracing::warn!(error = %e, "Diagram rendering failed; text artifacts are unaffected");
                None
            }
        }
    }

    /// Complete workflow: read the document, write every artifact, optionally render
    pub fn convert_file(&self, document_path: &Path) -> Result<ArtifactPaths> {
        let document = fs::read_to_string(document_path)?;
        tracing::info!(path = %document_path.display(), "Converting data model document");

        let artifacts = self.build_artifacts(&document)?;
        let mut paths = self.write_artifacts(&artifacts)?;

        // Image last, so a renderer failure leaves the text artifacts in place
        if self.config.diagram.render {
            let renderer = CommandRenderer::from_config(&self.config.diagram);
            paths.image = self.render_image(&artifacts.diagram, &renderer);
        }

        Ok(paths)
    }

    /// Diagram description from a previously written dump file
    pub fn diagram_from_dump_file(&self, dump_path: &Path) -> Result<String> {
        let dump = StructuredDump::load(dump_path)?;
        Ok(render_diagram(&dump))
    }
}
