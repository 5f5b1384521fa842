//! Workspace listing.

use crate::error::AdminError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flowkit_core::{Result, UserId, WorkspaceId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A workspace member as shown to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    /// The member's user id.
    pub user_id: UserId,
    /// Display name, if the user set one.
    pub name: Option<String>,
    /// Login email.
    pub email: String,
}

/// Billing state of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSummary {
    /// Customer id at the payment provider.
    pub stripe_customer_id: Option<String>,
    /// Subscribed plan.
    pub plan_type: String,
    /// Subscription status.
    pub status: String,
}

/// Resource counts of a workspace.
///
/// Workflow, execution, agent and task counts are summed across projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceCounts {
    pub connections: u64,
    pub knowledge: u64,
    pub variables: u64,
    pub projects: u64,
    pub workflows: u64,
    pub executions: u64,
    pub agents: u64,
    pub tasks: u64,
}

/// Credit allotment of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub allotted_credits: i64,
    pub purchased_credits: i64,
    pub refreshed_at: DateTime<Utc>,
}

/// Everything an operator sees about one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    pub id: WorkspaceId,
    pub created_at: DateTime<Utc>,
    /// Member who created the workspace, if still present.
    pub creator: Option<MemberSummary>,
    pub members: Vec<MemberSummary>,
    pub billing: Option<BillingSummary>,
    pub counts: WorkspaceCounts,
    pub usage: Option<UsageSummary>,
}

impl WorkspaceSummary {
    /// Creates a summary with no members, billing or usage.
    #[must_use]
    pub fn new(id: WorkspaceId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            creator: None,
            members: Vec::new(),
            billing: None,
            counts: WorkspaceCounts::default(),
            usage: None,
        }
    }

    /// Returns true if a member has exactly this email.
    #[must_use]
    pub fn has_member_email(&self, email: &str) -> bool {
        self.members.iter().any(|member| member.email == email)
    }
}

/// Which workspaces to return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceFilter {
    /// Only workspaces with a member using this email.
    pub member_email: Option<String>,
}

impl WorkspaceFilter {
    /// Matches every workspace.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches workspaces with a member using `email`.
    #[must_use]
    pub fn member_email(email: impl Into<String>) -> Self {
        Self {
            member_email: Some(email.into()),
        }
    }

    /// Returns true if the workspace passes the filter.
    #[must_use]
    pub fn matches(&self, workspace: &WorkspaceSummary) -> bool {
        self.member_email
            .as_deref()
            .is_none_or(|email| workspace.has_member_email(email))
    }
}

/// Reads workspace summaries.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Returns the workspaces matching `filter`, oldest first.
    async fn find_workspaces(
        &self,
        filter: WorkspaceFilter,
    ) -> Result<Vec<WorkspaceSummary>, AdminError>;
}

/// Workspaces kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryWorkspaces {
    workspaces: RwLock<Vec<WorkspaceSummary>>,
}

impl InMemoryWorkspaces {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a workspace.
    pub fn insert(&self, workspace: WorkspaceSummary) {
        self.workspaces.write().push(workspace);
    }
}

#[async_trait]
impl WorkspaceRepository for InMemoryWorkspaces {
    async fn find_workspaces(
        &self,
        filter: WorkspaceFilter,
    ) -> Result<Vec<WorkspaceSummary>, AdminError> {
        let mut found: Vec<_> = self
            .workspaces
            .read()
            .iter()
            .filter(|workspace| filter.matches(workspace))
            .cloned()
            .collect();
        found.sort_by_key(|workspace| workspace.created_at);
        Ok(found)
    }
}
