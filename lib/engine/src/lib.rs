//! Reference invocation path for flowkit definitions.
//!
//! The scheduling engine proper lives elsewhere. This crate provides the
//! steps every engine performs before a handler runs:
//!
//! - **Lookup**: fetch the definition from a registry
//! - **Validation**: check raw configuration against the declared fields
//! - **Connections**: resolve an external connection when one is needed
//! - **Invocation**: call `run` or `mock_run` under a timeout

pub mod config;
pub mod error;
pub mod invoker;
pub mod resolver;

pub use config::EngineConfig;
pub use error::InvocationError;
pub use invoker::{DefinitionLookup, InvocationOutcome, InvocationRequest, Invoker};
pub use resolver::{ConnectionResolver, NoConnections, StaticConnections};
