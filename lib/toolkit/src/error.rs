//! Error types for the toolkit crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `DefinitionError`: a builder refused its input
//! - `RegistryError`: registration or lookup failed
//! - `ValidationError`: raw configuration did not match the declared fields
//! - `ExecutionError`: a run or mock-run handler failed

use flowkit_core::DefinitionId;
use std::fmt;
use std::time::Duration;

/// One reason a definition was rejected at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionProblem {
    /// The id is empty or whitespace.
    BlankId,
    /// The display name is empty or whitespace.
    BlankName,
    /// An input field has an empty key.
    BlankFieldKey { index: usize },
    /// Two input fields share a key.
    DuplicateFieldKey { key: String },
    /// A select field declares no options.
    EmptySelectOptions { key: String },
    /// A field's default value does not satisfy its own type.
    DefaultTypeMismatch { key: String },
    /// A visibility rule refers to a key that is not declared.
    UnknownVisibilityReference { key: String, reference: String },
    /// A visibility rule refers to the field it is attached to.
    SelfReferentialVisibility { key: String },
    /// Visibility rules refer to each other in a cycle.
    CyclicVisibility { key: String },
    /// A webhook path template is empty or does not start with `/`.
    InvalidWebhookPath { path: String },
    /// A polling trigger was given a zero interval.
    ZeroPollingInterval,
}

impl fmt::Display for DefinitionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankId => write!(f, "id must not be empty"),
            Self::BlankName => write!(f, "name must not be empty"),
            Self::BlankFieldKey { index } => {
                write!(f, "input field #{index} has an empty key")
            }
            Self::DuplicateFieldKey { key } => {
                write!(f, "input field key '{key}' is declared more than once")
            }
            Self::EmptySelectOptions { key } => {
                write!(f, "select field '{key}' declares no options")
            }
            Self::DefaultTypeMismatch { key } => {
                write!(f, "default value of field '{key}' does not match its type")
            }
            Self::UnknownVisibilityReference { key, reference } => {
                write!(
                    f,
                    "visibility rule of field '{key}' refers to undeclared field '{reference}'"
                )
            }
            Self::SelfReferentialVisibility { key } => {
                write!(f, "visibility rule of field '{key}' refers to itself")
            }
            Self::CyclicVisibility { key } => {
                write!(
                    f,
                    "visibility rule of field '{key}' depends on itself through other fields"
                )
            }
            Self::InvalidWebhookPath { path } => {
                write!(f, "webhook path template '{path}' must start with '/'")
            }
            Self::ZeroPollingInterval => write!(f, "polling interval must be greater than zero"),
        }
    }
}

/// Errors from the definition builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// The builder input failed one or more checks.
    Invalid {
        id: DefinitionId,
        problems: Vec<DefinitionProblem>,
    },
}

impl DefinitionError {
    /// Returns every problem found, in discovery order.
    #[must_use]
    pub fn problems(&self) -> &[DefinitionProblem] {
        match self {
            Self::Invalid { problems, .. } => problems,
        }
    }
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { id, problems } => {
                write!(f, "definition '{id}' is invalid: ")?;
                for (i, problem) in problems.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{problem}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for DefinitionError {}

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A definition with this id is already registered.
    Duplicate { id: DefinitionId },
    /// No definition with this id is registered.
    NotFound { id: DefinitionId },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate { id } => write!(f, "definition already registered: {id}"),
            Self::NotFound { id } => write!(f, "definition not found: {id}"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// What is wrong with a single configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    /// A visible required field has no value.
    Missing,
    /// The value has the wrong JSON type.
    WrongType { expected: &'static str },
    /// The value is not one of the declared select options.
    NotAnOption { value: String },
    /// The value is not a valid date or timestamp.
    InvalidDate { value: String },
    /// The key is not declared (strict mode only).
    Unknown,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "value is required"),
            Self::WrongType { expected } => write!(f, "expected a {expected}"),
            Self::NotAnOption { value } => write!(f, "'{value}' is not an allowed option"),
            Self::InvalidDate { value } => write!(f, "'{value}' is not a valid date"),
            Self::Unknown => write!(f, "unknown field"),
        }
    }
}

/// A problem attached to one configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The configuration key.
    pub key: String,
    /// What is wrong with it.
    pub problem: FieldProblem,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(key: impl Into<String>, problem: FieldProblem) -> Self {
        Self {
            key: key.into(),
            problem,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.problem)
    }
}

/// Raw configuration was rejected.
///
/// Lists every offending field so a form can highlight all of them at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Every field that failed. Unknown keys come first, then declared
    /// fields in declaration order.
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    /// Returns true if the given key is among the failures.
    #[must_use]
    pub fn mentions(&self, key: &str) -> bool {
        self.fields.iter().any(|field| field.key == key)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration invalid: ")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Errors from run and mock-run handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The handler reported a failure.
    Failed { reason: String },
    /// The handler did not finish within the allotted time.
    TimedOut { after: Duration },
    /// The external connection could not be resolved or used.
    ConnectionUnavailable { reason: String },
    /// Validated configuration did not fit the handler's config type.
    ConfigMismatch { reason: String },
    /// A handler produced an item that could not be serialized.
    InvalidResponse { reason: String },
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "execution failed: {reason}"),
            Self::TimedOut { after } => {
                write!(f, "execution timed out after {}ms", after.as_millis())
            }
            Self::ConnectionUnavailable { reason } => {
                write!(f, "connection unavailable: {reason}")
            }
            Self::ConfigMismatch { reason } => {
                write!(f, "configuration does not fit handler: {reason}")
            }
            Self::InvalidResponse { reason } => {
                write!(f, "handler produced an invalid response item: {reason}")
            }
        }
    }
}

impl std::error::Error for ExecutionError {}
