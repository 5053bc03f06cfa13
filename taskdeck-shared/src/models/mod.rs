/// Database models for Taskdeck
///
/// This module contains all database models and their queries.
///
/// # Models
///
/// - `user`: User accounts, roles and profile counters
/// - `project`: Projects owned by a user, with status and priority
/// - `task`: Tasks inside a project, owned through the project's user
/// - `activity`: Append-only audit trail of project/task events
/// - `legacy`: Static dashboard metric and revenue source demo rows
///
/// Write operations accept any `PgExecutor` so that a mutation and its
/// activity row can share a transaction.

pub mod activity;
pub mod legacy;
pub mod project;
pub mod task;
pub mod user;

/// Error returned when a query-string value does not name an enum variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enum was being parsed (e.g. "status")
    pub kind: &'static str,

    /// The rejected input
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
