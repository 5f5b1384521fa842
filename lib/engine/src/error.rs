//! Error types for the engine crate.
//!
//! `InvocationError` is a context layer: the report it heads carries the
//! registry, validation or execution error that caused it.

use flowkit_core::DefinitionId;
use flowkit_toolkit::RunMode;
use std::fmt;

/// High-level invocation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    /// The definition could not be looked up.
    Lookup { definition_id: DefinitionId },
    /// The raw configuration was rejected.
    Validation { definition_id: DefinitionId },
    /// The definition needs a connection and none was supplied.
    ConnectionRequired { definition_id: DefinitionId },
    /// The connection could not be resolved.
    Connection { definition_id: DefinitionId },
    /// The handler failed (use as context wrapper).
    Execution {
        definition_id: DefinitionId,
        mode: RunMode,
    },
}

impl InvocationError {
    /// Returns the definition the failed invocation targeted.
    #[must_use]
    pub fn definition_id(&self) -> &DefinitionId {
        match self {
            Self::Lookup { definition_id }
            | Self::Validation { definition_id }
            | Self::ConnectionRequired { definition_id }
            | Self::Connection { definition_id }
            | Self::Execution { definition_id, .. } => definition_id,
        }
    }
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup { definition_id } => {
                write!(f, "lookup failed for definition {definition_id}")
            }
            Self::Validation { definition_id } => {
                write!(f, "configuration rejected for definition {definition_id}")
            }
            Self::ConnectionRequired { definition_id } => {
                write!(f, "definition {definition_id} requires a connection")
            }
            Self::Connection { definition_id } => {
                write!(
                    f,
                    "connection resolution failed for definition {definition_id}"
                )
            }
            Self::Execution {
                definition_id,
                mode,
            } => {
                write!(f, "{mode} run failed for definition {definition_id}")
            }
        }
    }
}

impl std::error::Error for InvocationError {}
