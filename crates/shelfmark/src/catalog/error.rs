//! Error types for the catalog

use std::io;
use thiserror::Error;

/// Catalog error type
#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Catalog already exists at {0}")]
    AlreadyInitialized(String),

    #[error("No catalog found at {0}")]
    NotInitialized(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{field}' is not a {expected} field")]
    WrongFieldKind { field: String, expected: &'static str },

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Value '{value}' not present in field '{field}'")]
    ValueNotPresent { field: String, value: String },

    #[error("Duplicate field: {0}")]
    DuplicateField(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Plugin error: {0}")]
    Plugin(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ShelfError>;
