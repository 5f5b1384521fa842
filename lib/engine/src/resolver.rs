//! Connection resolution.
//!
//! Definitions that set `needs_connection` receive a resolved
//! [`Connection`] in their run arguments. Where it comes from (a credential
//! vault, an OAuth refresh, ...) is the engine's business; the invoker only
//! talks to this trait.

use async_trait::async_trait;
use flowkit_core::{ConnectionId, DefinitionId, WorkspaceId};
use flowkit_toolkit::{Connection, ExecutionError};
use rootcause::prelude::Report;
use std::collections::HashMap;

/// Resolves connection ids into usable connections.
#[async_trait]
pub trait ConnectionResolver: Send + Sync {
    /// Resolves a connection for one invocation.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::ConnectionUnavailable`] if the connection
    /// does not exist or cannot be used by this workspace.
    async fn resolve(
        &self,
        workspace_id: WorkspaceId,
        connection_id: ConnectionId,
        definition_id: &DefinitionId,
    ) -> Result<Connection, Report<ExecutionError>>;
}

/// A resolver for deployments without external connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConnections;

#[async_trait]
impl ConnectionResolver for NoConnections {
    async fn resolve(
        &self,
        _workspace_id: WorkspaceId,
        connection_id: ConnectionId,
        _definition_id: &DefinitionId,
    ) -> Result<Connection, Report<ExecutionError>> {
        Err(ExecutionError::ConnectionUnavailable {
            reason: format!("no connection provider configured for {connection_id}"),
        }
        .into())
    }
}

/// A fixed set of connections, keyed by workspace and id.
#[derive(Debug, Clone, Default)]
pub struct StaticConnections {
    connections: HashMap<(WorkspaceId, ConnectionId), Connection>,
}

impl StaticConnections {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection owned by `workspace_id`.
    #[must_use]
    pub fn with_connection(mut self, workspace_id: WorkspaceId, connection: Connection) -> Self {
        self.connections
            .insert((workspace_id, connection.id), connection);
        self
    }
}

#[async_trait]
impl ConnectionResolver for StaticConnections {
    async fn resolve(
        &self,
        workspace_id: WorkspaceId,
        connection_id: ConnectionId,
        _definition_id: &DefinitionId,
    ) -> Result<Connection, Report<ExecutionError>> {
        self.connections
            .get(&(workspace_id, connection_id))
            .cloned()
            .ok_or_else(|| {
                ExecutionError::ConnectionUnavailable {
                    reason: format!("connection {connection_id} not found in {workspace_id}"),
                }
                .into()
            })
    }
}
