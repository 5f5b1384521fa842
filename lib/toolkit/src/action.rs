//! Action definitions.
//!
//! Actions are the steps a workflow performs once triggered. They share
//! the trigger shape but have no invocation strategy.

use crate::definition::{CreateActionArgs, Definition, DefinitionBody, DefinitionKind};
use crate::error::DefinitionError;
use rootcause::prelude::Report;

/// An immutable, registrable action.
#[derive(Debug, Clone)]
pub struct ActionDefinition {
    body: DefinitionBody,
}

impl ActionDefinition {
    /// Builds an action.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Invalid`] if the input fails any check.
    pub fn new(args: CreateActionArgs) -> Result<Self, Report<DefinitionError>> {
        let body = DefinitionBody::freeze(args, Vec::new())?;
        Ok(Self { body })
    }
}

impl Definition for ActionDefinition {
    fn body(&self) -> &DefinitionBody {
        &self.body
    }

    fn kind(&self) -> DefinitionKind {
        DefinitionKind::Action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DefinitionProblem;
    use crate::handler::{RunArgs, handler_fn};
    use crate::input_config::{InputConfig, InputField, SelectOption};
    use serde_json::json;

    fn args(id: &str) -> CreateActionArgs {
        CreateActionArgs::new(
            id,
            "Send message",
            "Posts a message to a channel",
            handler_fn(|_args: RunArgs| async move { Ok(vec![json!({"sent": true})]) }),
            handler_fn(|_args: RunArgs| async move { Ok(vec![json!({"sent": false})]) }),
        )
    }

    #[test]
    fn action_has_no_strategy() {
        let action = ActionDefinition::new(args("send-message")).expect("valid");
        assert_eq!(action.kind(), DefinitionKind::Action);
        assert_eq!(action.strategy_kind(), None);
        assert!(action.summary().strategy.is_none());
    }

    #[test]
    fn action_input_config_is_checked() {
        let report = ActionDefinition::new(args("send-message").with_input_config(
            InputConfig::new(vec![InputField::select(
                "channel",
                "Channel",
                Vec::<SelectOption>::new(),
            )]),
        ))
        .expect_err("select without options");

        assert_eq!(
            report.current_context().problems(),
            &[DefinitionProblem::EmptySelectOptions {
                key: "channel".to_string()
            }]
        );
    }
}
