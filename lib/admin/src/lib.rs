//! Operator-facing administration for flowkit workspaces.
//!
//! The persistence layer stays behind two narrow traits:
//!
//! - [`CreditLedger`]: records credit usage against a workspace
//! - [`WorkspaceRepository`]: lists workspaces with their members, billing,
//!   usage and resource counts
//!
//! [`WorkspaceAdmin`] composes them into the operations a support console
//! needs. In-memory implementations back the tests and the catalog binary.

pub mod config;
pub mod credits;
pub mod error;
pub mod service;
pub mod workspace;

pub use config::AdminConfig;
pub use credits::{CreditBalance, CreditDetails, CreditLedger, InMemoryLedger, UpdateCredits};
pub use error::AdminError;
pub use service::{AdjustCredits, WorkspaceAdmin};
pub use workspace::{
    BillingSummary, InMemoryWorkspaces, MemberSummary, UsageSummary, WorkspaceCounts,
    WorkspaceFilter, WorkspaceRepository, WorkspaceSummary,
};
