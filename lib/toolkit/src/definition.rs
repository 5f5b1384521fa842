//! The shape shared by every registrable definition.
//!
//! Triggers and actions carry the same metadata, configuration schema and
//! pair of handlers. [`CreateDefinitionArgs`] is what an integration author
//! fills in; a builder checks it and freezes it into a [`DefinitionBody`].

use crate::error::{DefinitionError, DefinitionProblem, ExecutionError};
use crate::handler::{ResponseItem, RunArgs, RunHandler, RunMode};
use crate::input_config::InputConfig;
use crate::trigger::StrategyKind;
use crate::view_options::ViewOptions;
use flowkit_core::DefinitionId;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Builder input for a trigger or action.
#[derive(Debug, Clone)]
pub struct CreateDefinitionArgs {
    /// Stable identifier.
    pub id: DefinitionId,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Declared configuration fields.
    pub input_config: InputConfig,
    /// Whether the engine must resolve a connection before running.
    pub needs_connection: bool,
    /// Icon shown next to the definition.
    pub icon_url: Option<String>,
    /// Presentation hints, passed through.
    pub view_options: Option<ViewOptions>,
    /// Whether agents may use this definition.
    pub available_for_agent: bool,
    /// Live behavior.
    pub run: Arc<dyn RunHandler>,
    /// Preview behavior.
    pub mock_run: Arc<dyn RunHandler>,
}

/// Builder input for a trigger.
pub type CreateTriggerArgs = CreateDefinitionArgs;

/// Builder input for an action.
pub type CreateActionArgs = CreateDefinitionArgs;

impl CreateDefinitionArgs {
    /// Creates builder input with the mandatory fields; optional fields
    /// start out empty or `false`.
    #[must_use]
    pub fn new(
        id: impl Into<DefinitionId>,
        name: impl Into<String>,
        description: impl Into<String>,
        run: Arc<dyn RunHandler>,
        mock_run: Arc<dyn RunHandler>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            input_config: InputConfig::default(),
            needs_connection: false,
            icon_url: None,
            view_options: None,
            available_for_agent: false,
            run,
            mock_run,
        }
    }

    /// Sets the configuration fields.
    #[must_use]
    pub fn with_input_config(mut self, input_config: InputConfig) -> Self {
        self.input_config = input_config;
        self
    }

    /// Marks the definition as needing a connection.
    #[must_use]
    pub fn with_needs_connection(mut self, needs_connection: bool) -> Self {
        self.needs_connection = needs_connection;
        self
    }

    /// Sets the icon URL.
    #[must_use]
    pub fn with_icon_url(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }

    /// Sets the view options.
    #[must_use]
    pub fn with_view_options(mut self, view_options: ViewOptions) -> Self {
        self.view_options = Some(view_options);
        self
    }

    /// Sets whether agents may use this definition.
    #[must_use]
    pub fn with_available_for_agent(mut self, available: bool) -> Self {
        self.available_for_agent = available;
        self
    }

    /// Runs the checks common to every definition kind.
    fn problems(&self) -> Vec<DefinitionProblem> {
        let mut problems = Vec::new();
        if self.id.is_blank() {
            problems.push(DefinitionProblem::BlankId);
        }
        if self.name.trim().is_empty() {
            problems.push(DefinitionProblem::BlankName);
        }
        problems.extend(self.input_config.check_definition());
        problems
    }
}

/// A checked, immutable definition body.
#[derive(Debug, Clone)]
pub struct DefinitionBody {
    id: DefinitionId,
    name: String,
    description: String,
    input_config: InputConfig,
    needs_connection: bool,
    icon_url: Option<String>,
    view_options: Option<ViewOptions>,
    available_for_agent: bool,
    run: Arc<dyn RunHandler>,
    mock_run: Arc<dyn RunHandler>,
}

impl DefinitionBody {
    /// Checks `args` together with any kind-specific problems and freezes
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Invalid`] listing every problem found.
    pub(crate) fn freeze(
        args: CreateDefinitionArgs,
        extra_problems: Vec<DefinitionProblem>,
    ) -> Result<Self, Report<DefinitionError>> {
        let mut problems = args.problems();
        problems.extend(extra_problems);

        if !problems.is_empty() {
            return Err(DefinitionError::Invalid {
                id: args.id,
                problems,
            }
            .into());
        }

        Ok(Self {
            id: args.id,
            name: args.name,
            description: args.description,
            input_config: args.input_config,
            needs_connection: args.needs_connection,
            icon_url: args.icon_url,
            view_options: args.view_options,
            available_for_agent: args.available_for_agent,
            run: args.run,
            mock_run: args.mock_run,
        })
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> &DefinitionId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the declared configuration fields.
    #[must_use]
    pub fn input_config(&self) -> &InputConfig {
        &self.input_config
    }

    /// Returns whether a connection must be resolved before running.
    #[must_use]
    pub fn needs_connection(&self) -> bool {
        self.needs_connection
    }

    /// Returns the icon URL.
    #[must_use]
    pub fn icon_url(&self) -> Option<&str> {
        self.icon_url.as_deref()
    }

    /// Returns the view options.
    #[must_use]
    pub fn view_options(&self) -> Option<&ViewOptions> {
        self.view_options.as_ref()
    }

    /// Returns whether agents may use this definition.
    #[must_use]
    pub fn available_for_agent(&self) -> bool {
        self.available_for_agent
    }

    /// Returns the handler for a mode.
    #[must_use]
    pub fn handler(&self, mode: RunMode) -> &Arc<dyn RunHandler> {
        match mode {
            RunMode::Live => &self.run,
            RunMode::Mock => &self.mock_run,
        }
    }

    /// Executes the live handler.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error unchanged.
    pub async fn run(&self, args: RunArgs) -> Result<Vec<ResponseItem>, Report<ExecutionError>> {
        self.run.call(args).await
    }

    /// Executes the preview handler.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error unchanged.
    pub async fn mock_run(
        &self,
        args: RunArgs,
    ) -> Result<Vec<ResponseItem>, Report<ExecutionError>> {
        self.mock_run.call(args).await
    }
}

/// Whether a definition is a trigger or an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// Starts workflow executions.
    Trigger,
    /// Performs a workflow step.
    Action,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger => write!(f, "trigger"),
            Self::Action => write!(f, "action"),
        }
    }
}

/// Serializable listing entry for a definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionSummary {
    /// Identifier.
    pub id: DefinitionId,
    /// Trigger or action.
    pub kind: DefinitionKind,
    /// Strategy tag, for triggers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyKind>,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Icon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Whether a connection is needed.
    pub needs_connection: bool,
    /// Whether agents may use it.
    pub available_for_agent: bool,
    /// Declared configuration fields.
    pub input_config: InputConfig,
    /// Presentation hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_options: Option<ViewOptions>,
}

/// A frozen definition that can live in a registry.
pub trait Definition: fmt::Debug + Send + Sync + 'static {
    /// Returns the shared body.
    fn body(&self) -> &DefinitionBody;

    /// Returns whether this is a trigger or an action.
    fn kind(&self) -> DefinitionKind;

    /// Returns the strategy tag, for triggers.
    fn strategy_kind(&self) -> Option<StrategyKind> {
        None
    }

    /// Returns the identifier.
    fn id(&self) -> &DefinitionId {
        self.body().id()
    }

    /// Builds a listing entry.
    fn summary(&self) -> DefinitionSummary {
        let body = self.body();
        DefinitionSummary {
            id: body.id.clone(),
            kind: self.kind(),
            strategy: self.strategy_kind(),
            name: body.name.clone(),
            description: body.description.clone(),
            icon_url: body.icon_url.clone(),
            needs_connection: body.needs_connection,
            available_for_agent: body.available_for_agent,
            input_config: body.input_config.clone(),
            view_options: body.view_options.clone(),
        }
    }
}
