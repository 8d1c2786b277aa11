//! Blocking register: open/resolve halt records on a task.
//!
//! A task carries its full incident history; at most one record may be open.
//! The record does not remember the pre-block status, so `resolve` takes the
//! reversion target from the caller.

use chrono::{DateTime, Utc};

use crate::error::WorkflowError;
use crate::task::{BlockCause, Blocking, Task, TaskStatus};

/// Status a resolved task returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeTarget {
    Pending,
    InProgress,
}

impl From<ResumeTarget> for TaskStatus {
    fn from(r: ResumeTarget) -> Self {
        match r {
            ResumeTarget::Pending => TaskStatus::Pending,
            ResumeTarget::InProgress => TaskStatus::InProgress,
        }
    }
}

/// Open a blocking record and move the task to Blocked.
pub fn block(
    task: &mut Task,
    cause: BlockCause,
    justification: impl Into<String>,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    if task.open_blocking().is_some() {
        return Err(WorkflowError::AlreadyBlocked(task.id.clone()));
    }
    if task.status == TaskStatus::Finished {
        return Err(WorkflowError::InvalidTransition {
            task_id: task.id.clone(),
            from: task.status.as_str().to_string(),
            action: "block".to_string(),
        });
    }

    task.blockings.push(Blocking {
        cause,
        justification: justification.into(),
        opened_at: now,
        resolved_at: None,
    });
    task.status = TaskStatus::Blocked;
    Ok(())
}

/// Close the open blocking record and revert the task to `resume_to`.
pub fn resolve(
    task: &mut Task,
    resume_to: ResumeTarget,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    let open = task
        .blockings
        .iter_mut()
        .find(|b| b.is_open())
        .ok_or_else(|| WorkflowError::NotBlocked(task.id.clone()))?;
    open.resolved_at = Some(now);
    task.status = resume_to.into();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 2, 7, 30, 0).unwrap()
    }

    #[test]
    fn block_then_second_block_fails() {
        let mut t = Task::new("instalaciones", "Instalaciones técnicas");
        block(&mut t, BlockCause::MaterialShortage, "sin bandejas BT", now()).unwrap();
        assert_eq!(t.status, TaskStatus::Blocked);

        let err = block(&mut t, BlockCause::Weather, "lluvia", now()).unwrap_err();
        assert_eq!(err, WorkflowError::AlreadyBlocked("instalaciones".to_string()));
        assert_eq!(t.blockings.len(), 1);
    }

    #[test]
    fn resolve_reverts_to_supplied_status() {
        let mut t = Task::new("t", "t");
        block(&mut t, BlockCause::ExecutionError, "incompatibilidad de trazado", now()).unwrap();

        let later = now() + chrono::Duration::days(2);
        resolve(&mut t, ResumeTarget::Pending, later).unwrap();
        assert_eq!(t.status, TaskStatus::Pending);
        assert_eq!(t.blockings[0].resolved_at, Some(later));
        assert!(t.open_blocking().is_none());
    }

    #[test]
    fn resolve_without_open_record_fails() {
        let mut t = Task::new("t", "t");
        let err = resolve(&mut t, ResumeTarget::InProgress, now()).unwrap_err();
        assert_eq!(err, WorkflowError::NotBlocked("t".to_string()));
    }

    #[test]
    fn reblocking_after_resolution_opens_a_second_record() {
        let mut t = Task::new("t", "t");
        block(&mut t, BlockCause::Weather, "temporal", now()).unwrap();
        resolve(&mut t, ResumeTarget::InProgress, now() + chrono::Duration::days(1)).unwrap();
        block(
            &mut t,
            BlockCause::RegulatoryIssue,
            "requerimiento municipal",
            now() + chrono::Duration::days(3),
        )
        .unwrap();

        assert_eq!(t.blockings.len(), 2);
        assert_eq!(t.open_blocking().map(|b| b.cause), Some(BlockCause::RegulatoryIssue));
    }

    #[test]
    fn finished_task_cannot_be_blocked() {
        let mut t = Task::new("t", "t");
        t.status = TaskStatus::Finished;
        let err = block(&mut t, BlockCause::Other, "tarde", now()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        assert!(t.blockings.is_empty());
    }
}
