//! Configuration handling for SchemaScribe

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "schema_scribe.toml";

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Load the given config file, or `schema_scribe.toml` if it exists, or the defaults
pub fn load_or_default(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => load_from_file(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_from_file(DEFAULT_CONFIG_FILE),
        None => Ok(Config::default()),
    }
}

/// Represents the complete SchemaScribe configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub output: OutputConfig,
    pub migration: MigrationConfig,
    pub diagram: DiagramConfig,
    pub logging: Option<LoggingConfig>,
}

/// Heading depths that open a table section
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ParserConfig {
    /// Used for the tabular export and structured dump
    pub heading_depth: usize,
    /// Used for the migration script
    pub migration_heading_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            heading_depth: 2,
            migration_heading_depth: 3,
        }
    }
}

/// Serialization format of the structured dump
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DumpFormat {
    #[default]
    Yaml,
    Json,
}

/// Artifact locations, relative to `directory`
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub migration_file: String,
    pub csv_file: String,
    pub dump_file: String,
    pub dump_format: DumpFormat,
    pub diagram_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "artifacts".to_string(),
            migration_file: "schemas/gdm/schema.rb".to_string(),
            csv_file: "gdm.csv".to_string(),
            dump_file: "gdm.yml".to_string(),
            dump_format: DumpFormat::Yaml,
            diagram_file: "erd.txt".to_string(),
        }
    }
}

impl OutputConfig {
    /// Resolve an artifact file name against the output directory
    pub fn path_for(&self, file: &str) -> PathBuf {
        Path::new(&self.directory).join(file)
    }
}

/// Migration script settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct MigrationConfig {
    pub indent_width: usize,
    pub timestamp_filename: bool,
    pub emit_indexes: bool,
    /// Table name -> indexes, each index a list of column names or raw expressions
    pub indexes: IndexMap<String, Vec<Vec<String>>>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            timestamp_filename: false,
            emit_indexes: false,
            indexes: IndexMap::new(),
        }
    }
}

/// Diagram rendering settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DiagramConfig {
    pub render: bool,
    pub program: String,
    /// `{output}` is replaced with the image path
    pub args: Vec<String>,
    pub image_file: String,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            render: false,
            program: "erd".to_string(),
            args: vec!["-o".to_string(), "{output}".to_string()],
            image_file: "erd.png".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: "text".to_string(),
            stdout: true,
        }
    }
}
