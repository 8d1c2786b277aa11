//! Workflow error taxonomy.
//!
//! Every variant is recoverable: callers retry with fresh state or surface a
//! validation message. A rejected mutation never leaves partial state behind;
//! all checks run before anything is written.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The edit would make a task its own ancestor (parent chain or
    /// predecessor graph).
    #[error("cycle detected: {0}")]
    Cycle(String),

    /// Reparenting would orphan descendants into a cycle.
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("task '{0}' already has an open blocking record")]
    AlreadyBlocked(String),

    #[error("task '{0}' has no open blocking record")]
    NotBlocked(String),

    #[error("user '{user_id}' is not assigned to task '{task_id}'")]
    NotAssigned { task_id: String, user_id: String },

    #[error("task '{0}' does not require joint signature")]
    NotJointTask(String),

    /// Optimistic-concurrency check failed: someone else committed first.
    #[error("task '{task_id}' was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        task_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("role {role} may not perform '{action}'")]
    NotAuthorized { role: String, action: String },

    #[error("unknown task '{0}'")]
    UnknownTask(String),

    #[error("task '{0}' already exists")]
    DuplicateTask(String),

    #[error("task '{task_id}' cannot go from {from} via '{action}'")]
    InvalidTransition {
        task_id: String,
        from: String,
        action: String,
    },

    #[error("task '{task_id}' is not ready to start: {reason}")]
    NotStartable { task_id: String, reason: String },

    #[error("task '{task_id}' is missing approvals from: {}", .missing.join(", "))]
    NotCompletable {
        task_id: String,
        missing: Vec<String>,
    },
}
