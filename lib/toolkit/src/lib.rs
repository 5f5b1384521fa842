//! Definition model for the flowkit automation toolkit.
//!
//! This crate provides the contract integrations use to register units of
//! work with the execution engine:
//!
//! - **Input Config**: declared, typed configuration fields with validation
//!   and conditional visibility
//! - **View Options**: presentation hints passed through to the UI
//! - **Triggers**: one builder per strategy (schedule, webhook, polling, manual)
//! - **Actions**: the same shape without a strategy
//! - **Handlers**: the shared interface of `run` and `mock_run`
//! - **Registry**: ordered, id-keyed catalogs with an explicit duplicate policy

pub mod action;
pub mod definition;
pub mod error;
pub mod handler;
pub mod input_config;
pub mod registry;
pub mod trigger;
pub mod view_options;

pub use action::ActionDefinition;
pub use definition::{
    CreateActionArgs, CreateDefinitionArgs, CreateTriggerArgs, Definition, DefinitionBody,
    DefinitionKind, DefinitionSummary,
};
pub use error::{
    DefinitionError, DefinitionProblem, ExecutionError, FieldError, FieldProblem, RegistryError,
    ValidationError,
};
pub use handler::{
    Connection, ExecutionContext, ResponseItem, RunArgs, RunHandler, RunMode, TypedRunArgs,
    handler_fn, typed_handler,
};
pub use input_config::{
    FieldType, InputConfig, InputField, SelectOption, ValidatedConfig, ValidationMode,
    VisibilityRule,
};
pub use registry::{
    ActionRegistry, DefinitionRegistry, HotReloadRegistry, RegistrationMode, TriggerRegistry,
};
pub use trigger::{StrategyKind, TriggerDefinition, TriggerStrategy};
pub use view_options::{ViewGroup, ViewOptions};
