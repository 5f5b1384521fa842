//! Trigger definitions.
//!
//! A trigger is an event source that starts workflow executions. Each
//! builder variant fixes the strategy the engine uses to invoke it:
//!
//! - [`TriggerDefinition::schedule`]: time-based, driven by the engine's scheduler
//! - [`TriggerDefinition::webhook`]: an HTTP path template receives events
//! - [`TriggerDefinition::polling`]: the engine calls `run` on an interval
//! - [`TriggerDefinition::manual`]: user-initiated

use crate::definition::{CreateTriggerArgs, Definition, DefinitionBody, DefinitionKind};
use crate::error::{DefinitionError, DefinitionProblem};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The plain strategy tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Time-based.
    Schedule,
    /// HTTP webhook.
    Webhook,
    /// Interval polling.
    Polling,
    /// User-initiated.
    Manual,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schedule => write!(f, "schedule"),
            Self::Webhook => write!(f, "webhook"),
            Self::Polling => write!(f, "polling"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// How the engine invokes a trigger, with any variant-specific settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerStrategy {
    /// Time-based trigger.
    Schedule,
    /// HTTP webhook trigger.
    Webhook {
        /// Path template the webhook is served on (e.g. "/hooks/{workflow}").
        path_template: String,
    },
    /// Interval polling trigger.
    Polling {
        /// Time between polls.
        interval: Duration,
    },
    /// Manual trigger.
    Manual,
}

impl TriggerStrategy {
    /// Returns the plain tag.
    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Schedule => StrategyKind::Schedule,
            Self::Webhook { .. } => StrategyKind::Webhook,
            Self::Polling { .. } => StrategyKind::Polling,
            Self::Manual => StrategyKind::Manual,
        }
    }

    fn problems(&self) -> Vec<DefinitionProblem> {
        match self {
            Self::Webhook { path_template } if !path_template.starts_with('/') => {
                vec![DefinitionProblem::InvalidWebhookPath {
                    path: path_template.clone(),
                }]
            }
            Self::Polling { interval } if interval.is_zero() => {
                vec![DefinitionProblem::ZeroPollingInterval]
            }
            _ => Vec::new(),
        }
    }
}

/// An immutable, registrable trigger.
#[derive(Debug, Clone)]
pub struct TriggerDefinition {
    body: DefinitionBody,
    strategy: TriggerStrategy,
}

impl TriggerDefinition {
    /// Builds a schedule trigger.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Invalid`] if the input fails any check.
    pub fn schedule(args: CreateTriggerArgs) -> Result<Self, Report<DefinitionError>> {
        Self::build(args, TriggerStrategy::Schedule)
    }

    /// Builds a webhook trigger served on `path_template`.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Invalid`] if the input fails any check or
    /// the path template does not start with `/`.
    pub fn webhook(
        args: CreateTriggerArgs,
        path_template: impl Into<String>,
    ) -> Result<Self, Report<DefinitionError>> {
        Self::build(
            args,
            TriggerStrategy::Webhook {
                path_template: path_template.into(),
            },
        )
    }

    /// Builds a polling trigger.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Invalid`] if the input fails any check or
    /// the interval is zero.
    pub fn polling(
        args: CreateTriggerArgs,
        interval: Duration,
    ) -> Result<Self, Report<DefinitionError>> {
        Self::build(args, TriggerStrategy::Polling { interval })
    }

    /// Builds a manual trigger.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Invalid`] if the input fails any check.
    pub fn manual(args: CreateTriggerArgs) -> Result<Self, Report<DefinitionError>> {
        Self::build(args, TriggerStrategy::Manual)
    }

    fn build(
        args: CreateTriggerArgs,
        strategy: TriggerStrategy,
    ) -> Result<Self, Report<DefinitionError>> {
        let body = DefinitionBody::freeze(args, strategy.problems())?;
        Ok(Self { body, strategy })
    }

    /// Returns the strategy.
    #[must_use]
    pub fn strategy(&self) -> &TriggerStrategy {
        &self.strategy
    }
}

impl Definition for TriggerDefinition {
    fn body(&self) -> &DefinitionBody {
        &self.body
    }

    fn kind(&self) -> DefinitionKind {
        DefinitionKind::Trigger
    }

    fn strategy_kind(&self) -> Option<StrategyKind> {
        Some(self.strategy.kind())
    }
}
