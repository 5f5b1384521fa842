//! Workspace administration service.

use crate::config::AdminConfig;
use crate::credits::{CreditBalance, CreditDetails, CreditLedger, UpdateCredits};
use crate::error::AdminError;
use crate::workspace::{WorkspaceFilter, WorkspaceRepository, WorkspaceSummary};
use flowkit_core::{Result, WorkspaceId};
use rootcause::prelude::ResultExt;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// An operator's credit adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustCredits {
    pub workspace_id: WorkspaceId,
    /// Credits to grant; negative values take credits away.
    pub credits: i64,
    /// Audit reason; a default naming the platform is used when absent.
    #[serde(default)]
    pub reason: Option<String>,
}

impl AdjustCredits {
    /// Converts the grant into a ledger entry.
    ///
    /// A grant is recorded as negative usage and a deduction as positive
    /// usage. The entry is never tied to a project.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidCredits`] for `i64::MIN`, which has no
    /// positive counterpart.
    pub fn into_update(self, platform_name: &str) -> Result<UpdateCredits, AdminError> {
        let credits_used = if self.credits > 0 {
            -self.credits
        } else {
            self.credits
                .checked_abs()
                .ok_or(AdminError::InvalidCredits {
                    credits: self.credits,
                })?
        };

        Ok(UpdateCredits {
            workspace_id: self.workspace_id,
            credits_used,
            project_id: None,
            details: CreditDetails {
                reason: self
                    .reason
                    .unwrap_or_else(|| format!("Updated by {platform_name}")),
            },
        })
    }
}

/// Support-console operations over workspaces and credits.
pub struct WorkspaceAdmin<L: CreditLedger, R: WorkspaceRepository> {
    ledger: L,
    workspaces: R,
    config: AdminConfig,
}

impl<L: CreditLedger, R: WorkspaceRepository> WorkspaceAdmin<L, R> {
    /// Creates the service.
    pub fn new(ledger: L, workspaces: R, config: AdminConfig) -> Self {
        Self {
            ledger,
            workspaces,
            config,
        }
    }

    /// Returns the ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Lists every workspace.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::WorkspaceQueryFailed`] if the repository fails.
    #[instrument(skip(self))]
    pub async fn workspaces(&self) -> Result<Vec<WorkspaceSummary>, AdminError> {
        self.workspaces
            .find_workspaces(WorkspaceFilter::all())
            .await
            .context(AdminError::WorkspaceQueryFailed)
    }

    /// Lists the workspaces a user with `email` belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::WorkspaceQueryFailed`] if the repository fails.
    #[instrument(skip(self))]
    pub async fn workspaces_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<WorkspaceSummary>, AdminError> {
        self.workspaces
            .find_workspaces(WorkspaceFilter::member_email(email))
            .await
            .context(AdminError::WorkspaceQueryFailed)
    }

    /// Grants or removes credits.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidCredits`] if the amount cannot be
    /// negated, or [`AdminError::CreditUpdateFailed`] wrapping the ledger's
    /// error.
    #[instrument(
        skip(self, adjustment),
        fields(workspace_id = %adjustment.workspace_id, credits = adjustment.credits)
    )]
    pub async fn adjust_credits(
        &self,
        adjustment: AdjustCredits,
    ) -> Result<CreditBalance, AdminError> {
        let workspace_id = adjustment.workspace_id;
        let update = adjustment.into_update(&self.config.platform_name)?;
        let reason = update.details.reason.clone();

        let balance = self
            .ledger
            .update_workspace_credits(update)
            .await
            .context(AdminError::CreditUpdateFailed { workspace_id })?;

        info!(%reason, remaining = balance.remaining(), "workspace credits adjusted");
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credits::InMemoryLedger;
    use crate::workspace::{InMemoryWorkspaces, MemberSummary};
    use chrono::Utc;
    use flowkit_core::UserId;

    fn admin(workspace_id: WorkspaceId) -> WorkspaceAdmin<InMemoryLedger, InMemoryWorkspaces> {
        let balance = CreditBalance::new(workspace_id, 1_000, 0);
        let ledger = InMemoryLedger::new().with_balance(balance);
        let workspaces = InMemoryWorkspaces::new();
        let mut summary = WorkspaceSummary::new(workspace_id, Utc::now());
        summary.members.push(MemberSummary {
            user_id: UserId::new(),
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
        });
        workspaces.insert(summary);
        workspaces.insert(WorkspaceSummary::new(WorkspaceId::new(), Utc::now()));

        WorkspaceAdmin::new(
            ledger,
            workspaces,
            AdminConfig {
                platform_name: "Acme".to_string(),
            },
        )
    }

    #[test]
    fn positive_grant_becomes_negative_usage() {
        let workspace_id = WorkspaceId::new();
        let update = AdjustCredits {
            workspace_id,
            credits: 250,
            reason: None,
        }
        .into_update("Acme")
        .expect("valid");

        assert_eq!(update.credits_used, -250);
        assert_eq!(update.project_id, None);
        assert_eq!(update.details.reason, "Updated by Acme");
    }

    #[test]
    fn negative_grant_becomes_positive_usage() {
        let update = AdjustCredits {
            workspace_id: WorkspaceId::new(),
            credits: -40,
            reason: Some("refund reversal".to_string()),
        }
        .into_update("Acme")
        .expect("valid");

        assert_eq!(update.credits_used, 40);
        assert_eq!(update.details.reason, "refund reversal");
    }

    #[test]
    fn minimum_credit_value_is_rejected() {
        let report = AdjustCredits {
            workspace_id: WorkspaceId::new(),
            credits: i64::MIN,
            reason: None,
        }
        .into_update("Acme")
        .expect_err("cannot negate");
        assert_eq!(
            report.current_context(),
            &AdminError::InvalidCredits { credits: i64::MIN }
        );
    }

    #[tokio::test]
    async fn adjust_credits_records_ledger_entry() {
        let workspace_id = WorkspaceId::new();
        let admin = admin(workspace_id);

        let balance = admin
            .adjust_credits(AdjustCredits {
                workspace_id,
                credits: 500,
                reason: None,
            })
            .await
            .expect("adjusted");
        assert_eq!(balance.remaining(), 1_500);

        let entries = admin.ledger().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].credits_used, -500);
        assert_eq!(entries[0].details.reason, "Updated by Acme");
    }

    #[tokio::test]
    async fn adjusting_unknown_workspace_is_wrapped() {
        let admin = admin(WorkspaceId::new());
        let workspace_id = WorkspaceId::new();

        let report = admin
            .adjust_credits(AdjustCredits {
                workspace_id,
                credits: 1,
                reason: None,
            })
            .await
            .expect_err("unknown workspace");
        assert_eq!(
            report.current_context(),
            &AdminError::CreditUpdateFailed { workspace_id }
        );
    }

    #[tokio::test]
    async fn workspaces_by_email_filters_members() {
        let workspace_id = WorkspaceId::new();
        let admin = admin(workspace_id);

        assert_eq!(admin.workspaces().await.expect("all").len(), 2);

        let found = admin
            .workspaces_by_email("ada@example.com")
            .await
            .expect("filtered");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, workspace_id);
    }
}
