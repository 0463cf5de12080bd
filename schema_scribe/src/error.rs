//! Error types for SchemaScribe

use thiserror::Error;

/// Result type for SchemaScribe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for SchemaScribe
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown type `{token}` for column `{column}`")]
    UnknownSourceType { token: String, column: String },

    #[error("Line {line}: {source}")]
    Document {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Diagram rendering error: {0}")]
    RenderError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Attach the 1-based document line a fatal error was raised on
    pub fn at_line(self, line: usize) -> Self {
        match self {
            already @ Error::Document { .. } => already,
            other => Error::Document {
                line,
                source: Box::new(other),
            },
        }
    }

    /// The unknown type token behind this error, if it is one
    pub fn unknown_token(&self) -> Option<&str> {
        match self {
            Error::UnknownSourceType { token, .. } => Some(token),
            Error::Document { source, .. } => source.unknown_token(),
            _ => None,
        }
    }
}

/// Convert Serde JSON errors to SchemaScribe errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert Serde YAML errors to SchemaScribe errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to SchemaScribe errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
