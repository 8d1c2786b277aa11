//! Signature ledger: per-user approval/rejection records on a task.
//!
//! The ledger holds at most one signature per (task, user). Submitting again
//! replaces the prior record, so a rejection can later be superseded by an
//! approval — the original system seeds exactly that flow on live tasks.

use chrono::{DateTime, Utc};

use crate::error::WorkflowError;
use crate::task::{Signature, Task};

/// Whether a signature is meant to gate completion or is merely on record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScope {
    /// Load-bearing: counts toward joint-signature completion. Only valid on
    /// tasks that require joint signature.
    CompletionGate,
    /// Permitted on any task; never consulted by the evaluator.
    Informational,
}

/// A user's decision as submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureDecision {
    pub approved: bool,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
}

impl SignatureDecision {
    pub fn approve() -> Self {
        Self {
            approved: true,
            notes: None,
            rejection_reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            notes: None,
            rejection_reason: Some(reason.into()),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Upsert `user_id`'s signature on `task`.
///
/// Fails with `NotAssigned` when the user is not on the task, and with
/// `NotJointTask` when a completion-gating signature is submitted on a task
/// that does not require joint signature.
pub fn sign(
    task: &mut Task,
    user_id: &str,
    decision: SignatureDecision,
    scope: SignatureScope,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    if !task.is_assigned(user_id) {
        return Err(WorkflowError::NotAssigned {
            task_id: task.id.clone(),
            user_id: user_id.to_string(),
        });
    }
    if scope == SignatureScope::CompletionGate && !task.requires_joint_signature {
        return Err(WorkflowError::NotJointTask(task.id.clone()));
    }

    let record = Signature {
        user_id: user_id.to_string(),
        signed_at: now,
        approved: decision.approved,
        rejection_reason: decision.rejection_reason,
        notes: decision.notes,
    };

    match task.signatures.iter_mut().find(|s| s.user_id == user_id) {
        Some(existing) => *existing = record,
        None => task.signatures.push(record),
    }
    Ok(())
}
