//! Error types for the catalog binary.

use std::fmt;

/// Catalog errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// A built-in definition was rejected (use as context wrapper).
    Builtin,
    /// No trigger or action has this id.
    UnknownDefinition { id: String },
    /// The configuration argument is not a JSON object.
    InvalidConfigJson { details: String },
    /// A mock run failed (use as context wrapper).
    Invocation { id: String },
    /// Output could not be rendered.
    Output { details: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "configuration error: {details}"),
            Self::Builtin => write!(f, "built-in definitions failed to load"),
            Self::UnknownDefinition { id } => write!(f, "unknown definition '{id}'"),
            Self::InvalidConfigJson { details } => {
                write!(f, "configuration must be a JSON object: {details}")
            }
            Self::Invocation { id } => write!(f, "mock run of '{id}' failed"),
            Self::Output { details } => write!(f, "failed to render output: {details}"),
        }
    }
}

impl std::error::Error for CatalogError {}
