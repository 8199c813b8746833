// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that abort a mapping run before any matching begins.
#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Failed to open crawl file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Crawl file {path} could not be parsed as tabular data: {source}")]
    Unparseable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Crawl file {path} is missing required column \"{column}\"")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MapperError {
    /// True for errors caused by an uploaded crawl file rather than configuration.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, MapperError::Config(_))
    }
}
