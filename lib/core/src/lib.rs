//! Core types shared by every flowkit crate.
//!
//! This crate provides the identifier types and the `Result` alias used
//! throughout the trigger and action definition toolkit.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{
    ConnectionId, DefinitionId, ExecutionId, ParseIdError, ProjectId, UserId, WorkflowId,
    WorkspaceId,
};
