//! The loaded catalog and the operations the CLI exposes.

use crate::builtin;
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use flowkit_core::{ConnectionId, WorkspaceId};
use flowkit_engine::{InvocationOutcome, InvocationRequest, Invoker, StaticConnections};
use flowkit_toolkit::{
    ActionDefinition, ActionRegistry, Connection, Definition, DefinitionSummary, RunMode,
    TriggerDefinition, TriggerRegistry,
};
use rootcause::prelude::{Report, ResultExt};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue, json};
use std::sync::Arc;
use tracing::info;

/// Everything `list` prints.
#[derive(Debug, Serialize)]
pub struct Listing {
    pub platform: String,
    pub triggers: Vec<DefinitionSummary>,
    pub actions: Vec<DefinitionSummary>,
}

/// Built-in definitions plus the invokers used to preview them.
///
/// Mock runs execute in a sandbox workspace holding one placeholder
/// connection, which is handed to definitions that need a connection.
pub struct Catalog {
    config: CatalogConfig,
    triggers: Invoker<TriggerDefinition, TriggerRegistry, StaticConnections>,
    actions: Invoker<ActionDefinition, ActionRegistry, StaticConnections>,
    trigger_registry: Arc<TriggerRegistry>,
    action_registry: Arc<ActionRegistry>,
    workspace_id: WorkspaceId,
    connection_id: ConnectionId,
}

impl Catalog {
    /// Loads the built-in definitions.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Builtin`] if a definition is rejected.
    pub fn builtin(config: CatalogConfig) -> Result<Self, Report<CatalogError>> {
        let trigger_registry = Arc::new(builtin::triggers()?);
        let action_registry = Arc::new(builtin::actions()?);

        let workspace_id = WorkspaceId::new();
        let connection_id = ConnectionId::new();
        let connections = StaticConnections::new().with_connection(
            workspace_id,
            Connection::new(connection_id, "sandbox", json!({})),
        );

        info!(
            triggers = trigger_registry.len(),
            actions = action_registry.len(),
            "catalog loaded"
        );

        Ok(Self {
            triggers: Invoker::new(
                Arc::clone(&trigger_registry),
                connections.clone(),
                config.engine(),
            ),
            actions: Invoker::new(Arc::clone(&action_registry), connections, config.engine()),
            trigger_registry,
            action_registry,
            workspace_id,
            connection_id,
            config,
        })
    }

    /// Summarizes every definition in registration order.
    #[must_use]
    pub fn listing(&self) -> Listing {
        Listing {
            platform: self.config.platform_name.clone(),
            triggers: self
                .trigger_registry
                .list()
                .map(|trigger| trigger.summary())
                .collect(),
            actions: self
                .action_registry
                .list()
                .map(|action| action.summary())
                .collect(),
        }
    }

    /// Summarizes one definition.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownDefinition`] if neither registry has
    /// the id.
    pub fn describe(&self, id: &str) -> Result<DefinitionSummary, Report<CatalogError>> {
        if let Ok(trigger) = self.trigger_registry.get(id) {
            return Ok(trigger.summary());
        }
        self.action_registry
            .get(id)
            .map(|action| action.summary())
            .context(CatalogError::UnknownDefinition { id: id.to_string() })
    }

    /// Mock-runs a definition with raw JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidConfigJson`] if `raw_config` is not a
    /// JSON object, [`CatalogError::UnknownDefinition`] for an unknown id,
    /// or [`CatalogError::Invocation`] wrapping the invoker's error.
    pub async fn mock(
        &self,
        id: &str,
        raw_config: &str,
    ) -> Result<InvocationOutcome, Report<CatalogError>> {
        let config = parse_config(raw_config)?;

        let (needs_connection, is_trigger) = if let Ok(trigger) = self.trigger_registry.get(id) {
            (trigger.body().needs_connection(), true)
        } else if let Ok(action) = self.action_registry.get(id) {
            (action.body().needs_connection(), false)
        } else {
            return Err(CatalogError::UnknownDefinition { id: id.to_string() }.into());
        };

        let mut request =
            InvocationRequest::new(id, self.workspace_id, RunMode::Mock).with_config(config);
        if needs_connection {
            request = request.with_connection(self.connection_id);
        }

        let outcome = if is_trigger {
            self.triggers.invoke(request).await
        } else {
            self.actions.invoke(request).await
        };
        outcome.context(CatalogError::Invocation { id: id.to_string() })
    }
}

fn parse_config(raw: &str) -> Result<Map<String, JsonValue>, Report<CatalogError>> {
    match serde_json::from_str(raw) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(other) => Err(CatalogError::InvalidConfigJson {
            details: format!("expected an object, got {other}"),
        }
        .into()),
        Err(e) => Err(CatalogError::InvalidConfigJson {
            details: e.to_string(),
        }
        .into()),
    }
}
