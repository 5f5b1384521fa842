//! Definitions shipped with the catalog.

use crate::error::CatalogError;
use chrono::Days;
use flowkit_toolkit::{
    ActionDefinition, ActionRegistry, Connection, CreateActionArgs, CreateTriggerArgs,
    DefinitionError, ExecutionError, InputConfig, InputField, ResponseItem, RunArgs, SelectOption,
    TriggerDefinition, TriggerRegistry, TypedRunArgs, ViewOptions, VisibilityRule, handler_fn,
    typed_handler,
};
use rootcause::prelude::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Builds the trigger registry.
///
/// # Errors
///
/// Returns [`CatalogError::Builtin`] if a definition is rejected.
pub fn triggers() -> Result<TriggerRegistry, Report<CatalogError>> {
    let definitions = [daily_report(), form_submitted(), new_email()]
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .context(CatalogError::Builtin)?;

    let mut registry = TriggerRegistry::new();
    registry
        .register_all(definitions)
        .context(CatalogError::Builtin)?;
    Ok(registry)
}

/// Builds the action registry.
///
/// # Errors
///
/// Returns [`CatalogError::Builtin`] if a definition is rejected.
pub fn actions() -> Result<ActionRegistry, Report<CatalogError>> {
    let mut registry = ActionRegistry::new();
    registry
        .register(send_message().context(CatalogError::Builtin)?)
        .context(CatalogError::Builtin)?;
    Ok(registry)
}

#[derive(Debug, Deserialize)]
struct DailyReportConfig {
    hour: u32,
    timezone: String,
    format: String,
    #[serde(default)]
    include_charts: bool,
}

#[derive(Debug, Serialize)]
struct ScheduledReport {
    scheduled_for: String,
    timezone: String,
    format: String,
    include_charts: bool,
}

const PREVIEW_DAYS: u64 = 3;

fn daily_report() -> Result<TriggerDefinition, Report<DefinitionError>> {
    let input_config = InputConfig::new(vec![
        InputField::number("hour", "Hour")
            .with_description("Hour of the day, 0 to 23")
            .required(),
        InputField::string("timezone", "Timezone").with_default(json!("UTC")),
        InputField::select(
            "format",
            "Format",
            vec![
                SelectOption::new("pdf", "PDF"),
                SelectOption::new("csv", "CSV"),
            ],
        )
        .with_default(json!("pdf")),
        InputField::boolean("include_charts", "Include charts")
            .with_default(json!(true))
            .visible_when(VisibilityRule::equals("format", json!("pdf"))),
    ]);

    TriggerDefinition::schedule(
        CreateTriggerArgs::new(
            "daily-report",
            "Daily report",
            "Starts the workflow once a day at the configured hour",
            typed_handler(schedule_report),
            typed_handler(preview_reports),
        )
        .with_input_config(input_config)
        .with_icon_url("https://icons.flowkit.dev/clock.svg")
        .with_view_options(
            ViewOptions::new()
                .with_group("Schedule", ["hour", "timezone"])
                .with_group("Output", ["format", "include_charts"]),
        ),
    )
}

async fn schedule_report(
    args: TypedRunArgs<DailyReportConfig>,
) -> Result<Vec<ScheduledReport>, Report<ExecutionError>> {
    Ok(vec![scheduled_at(&args, 0)?])
}

async fn preview_reports(
    args: TypedRunArgs<DailyReportConfig>,
) -> Result<Vec<ScheduledReport>, Report<ExecutionError>> {
    (0..PREVIEW_DAYS)
        .map(|day| scheduled_at(&args, day))
        .collect()
}

fn scheduled_at(
    args: &TypedRunArgs<DailyReportConfig>,
    day_offset: u64,
) -> Result<ScheduledReport, Report<ExecutionError>> {
    let config = &args.config;
    let scheduled = args
        .context
        .started_at
        .date_naive()
        .checked_add_days(Days::new(day_offset))
        .and_then(|date| date.and_hms_opt(config.hour, 0, 0))
        .ok_or_else(|| ExecutionError::Failed {
            reason: format!("hour {} is not a valid time of day", config.hour),
        })?;

    Ok(ScheduledReport {
        scheduled_for: scheduled.format("%Y-%m-%dT%H:%M:%S").to_string(),
        timezone: config.timezone.clone(),
        format: config.format.clone(),
        include_charts: config.include_charts,
    })
}

fn form_submitted() -> Result<TriggerDefinition, Report<DefinitionError>> {
    TriggerDefinition::webhook(
        CreateTriggerArgs::new(
            "form-submitted",
            "Form submitted",
            "Starts the workflow when a form posts to its webhook",
            handler_fn(|args: RunArgs| async move {
                Ok(vec![json!({
                    "form_id": args.config.get("form_id").cloned(),
                    "received_at": args.context.started_at,
                })])
            }),
            handler_fn(|args: RunArgs| async move {
                Ok(vec![json!({
                    "form_id": args.config.get("form_id").cloned(),
                    "fields": {"name": "Ada Lovelace", "email": "ada@example.com"},
                })])
            }),
        )
        .with_input_config(InputConfig::new(vec![
            InputField::string("form_id", "Form").required(),
        ]))
        .with_available_for_agent(true),
        "/hooks/forms/{form_id}",
    )
}

fn new_email() -> Result<TriggerDefinition, Report<DefinitionError>> {
    TriggerDefinition::polling(
        CreateTriggerArgs::new(
            "new-email",
            "New email",
            "Polls a mailbox and starts the workflow for each new message",
            handler_fn(poll_mailbox),
            handler_fn(|args: RunArgs| async move {
                let folder = args.config.get("folder").cloned();
                Ok(vec![
                    json!({"folder": folder, "subject": "Welcome aboard"}),
                    json!({"folder": folder, "subject": "Your weekly digest"}),
                ])
            }),
        )
        .with_input_config(InputConfig::new(vec![
            InputField::select(
                "folder",
                "Folder",
                vec![
                    SelectOption::new("inbox", "Inbox"),
                    SelectOption::new("archive", "Archive"),
                ],
            )
            .with_default(json!("inbox")),
            InputField::string("from", "From address"),
        ]))
        .with_needs_connection(true),
        Duration::from_secs(300),
    )
}

fn connection(args: &RunArgs) -> Result<&Connection, Report<ExecutionError>> {
    args.connection.as_ref().ok_or_else(|| {
        ExecutionError::ConnectionUnavailable {
            reason: "no connection was resolved".to_string(),
        }
        .into()
    })
}

async fn poll_mailbox(args: RunArgs) -> Result<Vec<ResponseItem>, Report<ExecutionError>> {
    let connection = connection(&args)?;
    debug!(provider = %connection.provider, "polling mailbox");
    Ok(vec![json!({
        "provider": connection.provider,
        "folder": args.config.get("folder").cloned(),
        "messages": [],
    })])
}

async fn post_message(args: RunArgs) -> Result<Vec<ResponseItem>, Report<ExecutionError>> {
    let connection = connection(&args)?;
    debug!(provider = %connection.provider, "posting message");
    Ok(vec![json!({
        "provider": connection.provider,
        "channel": args.config.get("channel").cloned(),
        "sent": true,
    })])
}

fn send_message() -> Result<ActionDefinition, Report<DefinitionError>> {
    ActionDefinition::new(
        CreateActionArgs::new(
            "send-message",
            "Send message",
            "Posts a message to a chat channel",
            handler_fn(post_message),
            handler_fn(|args: RunArgs| async move {
                Ok(vec![json!({
                    "channel": args.config.get("channel").cloned(),
                    "text": args.config.get("text").cloned(),
                    "sent": false,
                })])
            }),
        )
        .with_input_config(InputConfig::new(vec![
            InputField::string("channel", "Channel").required(),
            InputField::string("text", "Message").required(),
        ]))
        .with_needs_connection(true)
        .with_available_for_agent(true),
    )
}
