//! Credit ledger.
//!
//! Usage is recorded as a signed amount: positive values consume credits,
//! negative values hand them back.

use crate::error::AdminError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flowkit_core::{ProjectId, Result, WorkspaceId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Audit details attached to a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditDetails {
    /// Why the credits moved.
    pub reason: String,
}

/// A single usage entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCredits {
    /// Workspace being charged or credited.
    pub workspace_id: WorkspaceId,
    /// Credits consumed; negative values add credits.
    pub credits_used: i64,
    /// Project the usage belongs to, if any.
    pub project_id: Option<ProjectId>,
    /// Audit details.
    pub details: CreditDetails,
}

/// A workspace's credit position after an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBalance {
    /// Workspace the balance belongs to.
    pub workspace_id: WorkspaceId,
    /// Credits granted by the plan.
    pub allotted_credits: i64,
    /// Credits bought on top of the plan.
    pub purchased_credits: i64,
    /// Net credits consumed so far.
    pub used_credits: i64,
    /// When the allotment was last refreshed.
    pub refreshed_at: DateTime<Utc>,
}

impl CreditBalance {
    /// Creates a balance with no usage.
    #[must_use]
    pub fn new(workspace_id: WorkspaceId, allotted_credits: i64, purchased_credits: i64) -> Self {
        Self {
            workspace_id,
            allotted_credits,
            purchased_credits,
            used_credits: 0,
            refreshed_at: Utc::now(),
        }
    }

    /// Credits still available.
    #[must_use]
    pub fn remaining(&self) -> i64 {
        self.allotted_credits
            .saturating_add(self.purchased_credits)
            .saturating_sub(self.used_credits)
    }
}

/// Records credit usage.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Applies one usage entry and returns the resulting balance.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::WorkspaceNotFound`] if the workspace has no
    /// balance.
    async fn update_workspace_credits(
        &self,
        update: UpdateCredits,
    ) -> Result<CreditBalance, AdminError>;
}

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<WorkspaceId, CreditBalance>,
    entries: Vec<UpdateCredits>,
}

/// A ledger kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a balance for a workspace.
    #[must_use]
    pub fn with_balance(self, balance: CreditBalance) -> Self {
        self.state
            .lock()
            .balances
            .insert(balance.workspace_id, balance);
        self
    }

    /// Returns the current balance of a workspace.
    #[must_use]
    pub fn balance(&self, workspace_id: WorkspaceId) -> Option<CreditBalance> {
        self.state.lock().balances.get(&workspace_id).cloned()
    }

    /// Returns every applied entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<UpdateCredits> {
        self.state.lock().entries.clone()
    }
}

#[async_trait]
impl CreditLedger for InMemoryLedger {
    async fn update_workspace_credits(
        &self,
        update: UpdateCredits,
    ) -> Result<CreditBalance, AdminError> {
        let mut state = self.state.lock();
        let Some(balance) = state.balances.get_mut(&update.workspace_id) else {
            return Err(AdminError::WorkspaceNotFound {
                workspace_id: update.workspace_id,
            }
            .into());
        };

        balance.used_credits = balance
            .used_credits
            .checked_add(update.credits_used)
            .ok_or(AdminError::InvalidCredits {
                credits: update.credits_used,
            })?;
        let balance = balance.clone();

        debug!(
            workspace_id = %update.workspace_id,
            credits_used = update.credits_used,
            remaining = balance.remaining(),
            "credits updated"
        );
        state.entries.push(update);
        Ok(balance)
    }
}
