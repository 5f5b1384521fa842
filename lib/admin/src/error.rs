//! Error types for the admin crate.

use flowkit_core::WorkspaceId;
use std::fmt;

/// Administration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    /// The workspace does not exist.
    WorkspaceNotFound { workspace_id: WorkspaceId },
    /// The credit amount cannot be represented as usage.
    InvalidCredits { credits: i64 },
    /// The ledger rejected a credit update (use as context wrapper).
    CreditUpdateFailed { workspace_id: WorkspaceId },
    /// Listing workspaces failed (use as context wrapper).
    WorkspaceQueryFailed,
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkspaceNotFound { workspace_id } => {
                write!(f, "workspace '{workspace_id}' not found")
            }
            Self::InvalidCredits { credits } => {
                write!(f, "invalid credit amount: {credits}")
            }
            Self::CreditUpdateFailed { workspace_id } => {
                write!(f, "credit update failed for workspace '{workspace_id}'")
            }
            Self::WorkspaceQueryFailed => write!(f, "workspace query failed"),
        }
    }
}

impl std::error::Error for AdminError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_error_display() {
        let err = AdminError::InvalidCredits { credits: i64::MIN };
        assert!(err.to_string().starts_with("invalid credit amount"));
        assert_eq!(
            AdminError::WorkspaceQueryFailed.to_string(),
            "workspace query failed"
        );
    }
}
