//! Run and mock-run capabilities.
//!
//! Both behaviors of a definition implement the same [`RunHandler`] trait,
//! so an engine can swap one for the other without changing how it calls
//! them. Which one runs is chosen by [`RunMode`].

use crate::error::ExecutionError;
use crate::input_config::ValidatedConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flowkit_core::{ConnectionId, ExecutionId, ProjectId, WorkflowId, WorkspaceId};
use rootcause::prelude::Report;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// One item produced by a run.
pub type ResponseItem = JsonValue;

/// Whether an invocation may have side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Real execution against external services.
    #[default]
    Live,
    /// Preview execution; must not call external services.
    Mock,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// A resolved external-service connection.
///
/// The core treats it as an opaque, engine-owned handle.
#[derive(Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Connection identifier.
    pub id: ConnectionId,
    /// The service this connection talks to (e.g. "gmail").
    pub provider: String,
    /// Provider-specific credential material.
    pub credentials: JsonValue,
}

impl Connection {
    /// Creates a connection handle.
    #[must_use]
    pub fn new(id: ConnectionId, provider: impl Into<String>, credentials: JsonValue) -> Self {
        Self {
            id,
            provider: provider.into(),
            credentials,
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("provider", &self.provider)
            .field("credentials", &"<redacted>")
            .finish()
    }
}

/// Per-invocation context supplied by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Identifier of this invocation.
    pub execution_id: ExecutionId,
    /// Workspace the invocation runs in.
    pub workspace_id: WorkspaceId,
    /// Project, if the invocation belongs to one.
    pub project_id: Option<ProjectId>,
    /// Workflow, if the invocation belongs to one.
    pub workflow_id: Option<WorkflowId>,
    /// Live or mock.
    pub mode: RunMode,
    /// When the invocation started.
    pub started_at: DateTime<Utc>,
}

impl ExecutionContext {
    /// Creates a context for a fresh invocation.
    #[must_use]
    pub fn new(workspace_id: WorkspaceId, mode: RunMode) -> Self {
        Self {
            execution_id: ExecutionId::new(),
            workspace_id,
            project_id: None,
            workflow_id: None,
            mode,
            started_at: Utc::now(),
        }
    }

    /// Sets the project.
    #[must_use]
    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Sets the workflow.
    #[must_use]
    pub fn with_workflow(mut self, workflow_id: WorkflowId) -> Self {
        self.workflow_id = Some(workflow_id);
        self
    }
}

/// Arguments passed to run and mock-run handlers.
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Validated configuration values.
    pub config: ValidatedConfig,
    /// Resolved connection, present when the definition needs one.
    pub connection: Option<Connection>,
    /// Invocation context.
    pub context: ExecutionContext,
}

impl RunArgs {
    /// Creates run arguments without a connection.
    #[must_use]
    pub fn new(config: ValidatedConfig, context: ExecutionContext) -> Self {
        Self {
            config,
            connection: None,
            context,
        }
    }

    /// Attaches a resolved connection.
    #[must_use]
    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connection = Some(connection);
        self
    }
}

/// The behavior behind `run` and `mock_run`.
///
/// Handlers must be safe to abort at any await point: dropping the
/// returned future must not leave shared state half-updated.
#[async_trait]
pub trait RunHandler: Send + Sync {
    /// Executes the handler and returns the produced items in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the run fails; the engine decides what to do
    /// with it.
    async fn call(&self, args: RunArgs) -> Result<Vec<ResponseItem>, Report<ExecutionError>>;
}

impl fmt::Debug for dyn RunHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RunHandler")
    }
}

/// A handler backed by an async closure over raw [`RunArgs`].
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> RunHandler for FnHandler<F>
where
    F: Fn(RunArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<ResponseItem>, Report<ExecutionError>>> + Send + 'static,
{
    async fn call(&self, args: RunArgs) -> Result<Vec<ResponseItem>, Report<ExecutionError>> {
        (self.f)(args).await
    }
}

/// Wraps an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn RunHandler>
where
    F: Fn(RunArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<ResponseItem>, Report<ExecutionError>>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}

/// Arguments for a typed handler.
#[derive(Debug, Clone)]
pub struct TypedRunArgs<C> {
    /// Configuration deserialized into the handler's own type.
    pub config: C,
    /// Resolved connection, present when the definition needs one.
    pub connection: Option<Connection>,
    /// Invocation context.
    pub context: ExecutionContext,
}

/// A handler that works with concrete config and item types.
pub struct TypedHandler<C, R, F> {
    f: F,
    _types: PhantomData<fn() -> (C, R)>,
}

#[async_trait]
impl<C, R, F, Fut> RunHandler for TypedHandler<C, R, F>
where
    C: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    F: Fn(TypedRunArgs<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<R>, Report<ExecutionError>>> + Send + 'static,
{
    async fn call(&self, args: RunArgs) -> Result<Vec<ResponseItem>, Report<ExecutionError>> {
        let config: C = args
            .config
            .deserialize()
            .map_err(|e| ExecutionError::ConfigMismatch {
                reason: e.to_string(),
            })?;

        let items = (self.f)(TypedRunArgs {
            config,
            connection: args.connection,
            context: args.context,
        })
        .await?;

        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let value =
                serde_json::to_value(item).map_err(|e| ExecutionError::InvalidResponse {
                    reason: e.to_string(),
                })?;
            values.push(value);
        }
        Ok(values)
    }
}

/// Wraps a typed async closure as a shareable handler.
///
/// The validated configuration is deserialized into `C` before the
/// closure runs, and every returned `R` is serialized into a
/// [`ResponseItem`].
pub fn typed_handler<C, R, F, Fut>(f: F) -> Arc<dyn RunHandler>
where
    C: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    F: Fn(TypedRunArgs<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<R>, Report<ExecutionError>>> + Send + 'static,
{
    Arc::new(TypedHandler {
        f,
        _types: PhantomData,
    })
}
