//! The invocation path.
//!
//! For one request the invoker:
//! 1. Looks the definition up
//! 2. Validates the raw configuration against its input config
//! 3. Resolves a connection if the definition needs one
//! 4. Calls `run` or `mock_run`, selected by the request mode, under the
//!    configured timeout
//!
//! Dropping the future returned by [`Invoker::invoke`] aborts the handler
//! at its current await point; registries are never written here.

use crate::config::EngineConfig;
use crate::error::InvocationError;
use crate::resolver::ConnectionResolver;
use flowkit_core::{ConnectionId, DefinitionId, ExecutionId, ProjectId, WorkflowId, WorkspaceId};
use flowkit_toolkit::{
    Definition, DefinitionRegistry, ExecutionContext, ExecutionError, HotReloadRegistry,
    RegistryError, ResponseItem, RunArgs, RunMode,
};
use rootcause::prelude::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Read access to a set of definitions.
pub trait DefinitionLookup<D>: Send + Sync {
    /// Looks up a definition by id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no definition has this id.
    fn lookup(&self, id: &str) -> Result<Arc<D>, Report<RegistryError>>;
}

impl<D: Definition> DefinitionLookup<D> for DefinitionRegistry<D> {
    fn lookup(&self, id: &str) -> Result<Arc<D>, Report<RegistryError>> {
        self.get(id)
    }
}

impl<D: Definition> DefinitionLookup<D> for HotReloadRegistry<D> {
    fn lookup(&self, id: &str) -> Result<Arc<D>, Report<RegistryError>> {
        self.get(id)
    }
}

/// A request to invoke one definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// The definition to invoke.
    pub definition_id: DefinitionId,
    /// Raw, unvalidated configuration.
    #[serde(default)]
    pub config: Map<String, JsonValue>,
    /// Workspace the invocation runs in.
    pub workspace_id: WorkspaceId,
    /// Connection to resolve, for definitions that need one.
    #[serde(default)]
    pub connection_id: Option<ConnectionId>,
    /// Owning project, if any.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Owning workflow, if any.
    #[serde(default)]
    pub workflow_id: Option<WorkflowId>,
    /// Live or mock.
    #[serde(default)]
    pub mode: RunMode,
}

impl InvocationRequest {
    /// Creates a request with empty configuration.
    #[must_use]
    pub fn new(
        definition_id: impl Into<DefinitionId>,
        workspace_id: WorkspaceId,
        mode: RunMode,
    ) -> Self {
        Self {
            definition_id: definition_id.into(),
            config: Map::new(),
            workspace_id,
            connection_id: None,
            project_id: None,
            workflow_id: None,
            mode,
        }
    }

    /// Sets the raw configuration.
    #[must_use]
    pub fn with_config(mut self, config: Map<String, JsonValue>) -> Self {
        self.config = config;
        self
    }

    /// Sets one raw configuration value.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Sets the connection to resolve.
    #[must_use]
    pub fn with_connection(mut self, connection_id: ConnectionId) -> Self {
        self.connection_id = Some(connection_id);
        self
    }

    /// Sets the owning project.
    #[must_use]
    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Sets the owning workflow.
    #[must_use]
    pub fn with_workflow(mut self, workflow_id: WorkflowId) -> Self {
        self.workflow_id = Some(workflow_id);
        self
    }
}

/// The result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationOutcome {
    /// Identifier assigned to this invocation.
    pub execution_id: ExecutionId,
    /// The definition that ran.
    pub definition_id: DefinitionId,
    /// Live or mock.
    pub mode: RunMode,
    /// Items produced, in order.
    pub items: Vec<ResponseItem>,
}

/// Runs definitions on behalf of an engine.
pub struct Invoker<D, L, R> {
    definitions: Arc<L>,
    resolver: R,
    config: EngineConfig,
    _definition: std::marker::PhantomData<fn() -> D>,
}

impl<D, L, R> Invoker<D, L, R>
where
    D: Definition,
    L: DefinitionLookup<D>,
    R: ConnectionResolver,
{
    /// Creates an invoker over a populated registry.
    pub fn new(definitions: Arc<L>, resolver: R, config: EngineConfig) -> Self {
        Self {
            definitions,
            resolver,
            config,
            _definition: std::marker::PhantomData,
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Invokes one definition.
    ///
    /// # Errors
    ///
    /// Returns an [`InvocationError`] whose cause is the registry,
    /// validation, connection or execution error that stopped the run.
    #[instrument(
        skip(self, request),
        fields(definition_id = %request.definition_id, mode = %request.mode)
    )]
    pub async fn invoke(
        &self,
        request: InvocationRequest,
    ) -> Result<InvocationOutcome, Report<InvocationError>> {
        let definition_id = request.definition_id.clone();

        let definition = self
            .definitions
            .lookup(definition_id.as_str())
            .context(InvocationError::Lookup {
                definition_id: definition_id.clone(),
            })?;
        let body = definition.body();

        let config = body
            .input_config()
            .validate(&request.config, self.config.validation_mode)
            .context(InvocationError::Validation {
                definition_id: definition_id.clone(),
            })?;

        let mut context = ExecutionContext::new(request.workspace_id, request.mode);
        if let Some(project_id) = request.project_id {
            context = context.with_project(project_id);
        }
        if let Some(workflow_id) = request.workflow_id {
            context = context.with_workflow(workflow_id);
        }
        let execution_id = context.execution_id;

        let mut args = RunArgs::new(config, context);
        if body.needs_connection() {
            let Some(connection_id) = request.connection_id else {
                return Err(InvocationError::ConnectionRequired {
                    definition_id: definition_id.clone(),
                }
                .into());
            };
            let connection = self
                .resolver
                .resolve(request.workspace_id, connection_id, &definition_id)
                .await
                .context(InvocationError::Connection {
                    definition_id: definition_id.clone(),
                })?;
            args = args.with_connection(connection);
        }

        let timeout = self.config.run_timeout();
        let handler = body.handler(request.mode);
        let result = match tokio::time::timeout(timeout, handler.call(args)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    %execution_id,
                    timeout_secs = self.config.run_timeout_secs,
                    "handler timed out"
                );
                Err(ExecutionError::TimedOut { after: timeout }.into())
            }
        };
        let items = result.context(InvocationError::Execution {
            definition_id: definition_id.clone(),
            mode: request.mode,
        })?;

        debug!(%execution_id, items = items.len(), "invocation finished");

        Ok(InvocationOutcome {
            execution_id,
            definition_id,
            mode: request.mode,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{NoConnections, StaticConnections};
    use flowkit_toolkit::{
        ActionDefinition, Connection, CreateActionArgs, CreateTriggerArgs, InputConfig, InputField,
        RegistrationMode, TriggerDefinition, TriggerRegistry, ValidationMode, handler_fn,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn daily_report(live_calls: Arc<AtomicUsize>) -> TriggerDefinition {
        TriggerDefinition::schedule(
            CreateTriggerArgs::new(
                "daily-report",
                "Daily report",
                "Runs once a day",
                handler_fn(move |_args: RunArgs| {
                    let calls = Arc::clone(&live_calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(vec![json!({"sent": true})])
                    }
                }),
                handler_fn(|args: RunArgs| async move {
                    Ok(vec![json!({
                        "preview": true,
                        "hour": args.config.get("hour").cloned(),
                        "execution": args.context.execution_id,
                    })])
                }),
            )
            .with_input_config(InputConfig::new(vec![
                InputField::number("hour", "Hour").required(),
            ])),
        )
        .expect("valid trigger")
    }

    fn new_email() -> TriggerDefinition {
        TriggerDefinition::polling(
            CreateTriggerArgs::new(
                "new-email",
                "New email",
                "Polls a mailbox",
                handler_fn(|args: RunArgs| async move {
                    let provider = args
                        .connection
                        .map(|connection| connection.provider)
                        .unwrap_or_default();
                    Ok(vec![json!({"provider": provider})])
                }),
                handler_fn(|_args: RunArgs| async move { Ok(vec![json!({"subject": "Hi"})]) }),
            )
            .with_needs_connection(true),
            Duration::from_secs(300),
        )
        .expect("valid trigger")
    }

    fn registry(definitions: Vec<TriggerDefinition>) -> Arc<TriggerRegistry> {
        let mut registry = TriggerRegistry::new();
        registry.register_all(definitions).expect("unique ids");
        Arc::new(registry)
    }

    #[tokio::test]
    async fn mock_invocation_skips_live_handler() {
        let live_calls = Arc::new(AtomicUsize::new(0));
        let invoker = Invoker::new(
            registry(vec![daily_report(Arc::clone(&live_calls))]),
            NoConnections,
            EngineConfig::default(),
        );

        let outcome = invoker
            .invoke(
                InvocationRequest::new("daily-report", WorkspaceId::new(), RunMode::Mock)
                    .with_value("hour", json!(9)),
            )
            .await
            .expect("mock run succeeds");

        assert_eq!(outcome.mode, RunMode::Mock);
        assert_eq!(outcome.items[0]["hour"], json!(9));
        assert_eq!(
            outcome.items[0]["execution"],
            serde_json::to_value(outcome.execution_id).expect("serialize")
        );
        assert_eq!(live_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn live_invocation_uses_run() {
        let live_calls = Arc::new(AtomicUsize::new(0));
        let invoker = Invoker::new(
            registry(vec![daily_report(Arc::clone(&live_calls))]),
            NoConnections,
            EngineConfig::default(),
        );

        let outcome = invoker
            .invoke(
                InvocationRequest::new("daily-report", WorkspaceId::new(), RunMode::Live)
                    .with_value("hour", json!(7)),
            )
            .await
            .expect("live run succeeds");

        assert_eq!(outcome.items, vec![json!({"sent": true})]);
        assert_eq!(live_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_definition_is_a_lookup_error() {
        let invoker = Invoker::new(registry(vec![]), NoConnections, EngineConfig::default());

        let report = invoker
            .invoke(InvocationRequest::new("missing", WorkspaceId::new(), RunMode::Mock))
            .await
            .expect_err("not registered");
        assert!(matches!(
            report.current_context(),
            InvocationError::Lookup { .. }
        ));
    }

    #[tokio::test]
    async fn invalid_config_is_a_validation_error() {
        let invoker = Invoker::new(
            registry(vec![daily_report(Arc::new(AtomicUsize::new(0)))]),
            NoConnections,
            EngineConfig::default(),
        );

        let report = invoker
            .invoke(InvocationRequest::new("daily-report", WorkspaceId::new(), RunMode::Mock))
            .await
            .expect_err("hour is required");
        assert_eq!(
            report.current_context(),
            &InvocationError::Validation {
                definition_id: DefinitionId::from("daily-report")
            }
        );
    }

    #[tokio::test]
    async fn strict_mode_rejects_unknown_keys() {
        let invoker = Invoker::new(
            registry(vec![daily_report(Arc::new(AtomicUsize::new(0)))]),
            NoConnections,
            EngineConfig {
                validation_mode: ValidationMode::Strict,
                ..EngineConfig::default()
            },
        );

        let request = InvocationRequest::new("daily-report", WorkspaceId::new(), RunMode::Mock)
            .with_value("hour", json!(9))
            .with_value("colour", json!("blue"));
        assert!(invoker.invoke(request.clone()).await.is_err());

        let lenient = Invoker::new(
            registry(vec![daily_report(Arc::new(AtomicUsize::new(0)))]),
            NoConnections,
            EngineConfig::default(),
        );
        assert!(lenient.invoke(request).await.is_ok());
    }

    #[tokio::test]
    async fn missing_connection_id_is_reported() {
        let definitions = registry(vec![new_email()]);
        let invoker = Invoker::new(definitions, NoConnections, EngineConfig::default());

        let report = invoker
            .invoke(InvocationRequest::new("new-email", WorkspaceId::new(), RunMode::Live))
            .await
            .expect_err("connection required");
        assert!(matches!(
            report.current_context(),
            InvocationError::ConnectionRequired { .. }
        ));
    }

    #[tokio::test]
    async fn resolved_connection_reaches_the_handler() {
        let workspace_id = WorkspaceId::new();
        let connection = Connection::new(ConnectionId::new(), "imap", json!({"password": "p"}));
        let connection_id = connection.id;
        let invoker = Invoker::new(
            registry(vec![new_email()]),
            StaticConnections::new().with_connection(workspace_id, connection),
            EngineConfig::default(),
        );

        let outcome = invoker
            .invoke(
                InvocationRequest::new("new-email", workspace_id, RunMode::Live)
                    .with_connection(connection_id),
            )
            .await
            .expect("connection resolves");
        assert_eq!(outcome.items, vec![json!({"provider": "imap"})]);

        let report = invoker
            .invoke(
                InvocationRequest::new("new-email", WorkspaceId::new(), RunMode::Live)
                    .with_connection(connection_id),
            )
            .await
            .expect_err("foreign workspace");
        assert!(matches!(
            report.current_context(),
            InvocationError::Connection { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_handler_times_out() {
        let slow = TriggerDefinition::manual(CreateTriggerArgs::new(
            "slow",
            "Slow",
            "Never finishes in time",
            handler_fn(|_args: RunArgs| async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(vec![])
            }),
            handler_fn(|_args: RunArgs| async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(vec![])
            }),
        ))
        .expect("valid trigger");

        let invoker = Invoker::new(
            registry(vec![slow]),
            NoConnections,
            EngineConfig {
                run_timeout_secs: 1,
                ..EngineConfig::default()
            },
        );

        let report = invoker
            .invoke(InvocationRequest::new("slow", WorkspaceId::new(), RunMode::Mock))
            .await
            .expect_err("times out");
        assert_eq!(
            report.current_context(),
            &InvocationError::Execution {
                definition_id: DefinitionId::from("slow"),
                mode: RunMode::Mock,
            }
        );
        assert!(format!("{report:?}").contains("timed out"));
    }

    #[tokio::test]
    async fn handler_failure_propagates() {
        let failing = ActionDefinition::new(CreateActionArgs::new(
            "post",
            "Post",
            "Always fails",
            handler_fn(|_args: RunArgs| async move {
                Err(ExecutionError::Failed {
                    reason: "upstream returned 503".to_string(),
                }
                .into())
            }),
            handler_fn(|_args: RunArgs| async move { Ok(vec![]) }),
        ))
        .expect("valid action");

        let mut actions = DefinitionRegistry::new();
        actions.register(failing).expect("registered");
        let invoker = Invoker::new(Arc::new(actions), NoConnections, EngineConfig::default());

        let report = invoker
            .invoke(InvocationRequest::new("post", WorkspaceId::new(), RunMode::Live))
            .await
            .expect_err("handler fails");
        assert!(format!("{report:?}").contains("upstream returned 503"));

        let preview = invoker
            .invoke(InvocationRequest::new("post", WorkspaceId::new(), RunMode::Mock))
            .await
            .expect("mock run does not fail");
        assert!(preview.items.is_empty());
    }

    #[tokio::test]
    async fn hot_reload_registry_is_a_lookup_source() {
        let hot = Arc::new(HotReloadRegistry::new(TriggerRegistry::new()));
        let invoker = Invoker::new(Arc::clone(&hot), NoConnections, EngineConfig::default());

        let request = InvocationRequest::new("daily-report", WorkspaceId::new(), RunMode::Mock)
            .with_value("hour", json!(6));
        assert!(invoker.invoke(request.clone()).await.is_err());

        hot.register_with(
            daily_report(Arc::new(AtomicUsize::new(0))),
            RegistrationMode::Reject,
        )
        .expect("registered");
        assert!(invoker.invoke(request).await.is_ok());
    }
}
