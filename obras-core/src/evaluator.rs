//! Completion evaluator: derives whether a task may start or close.
//!
//! Both checks are pure predicates — they never error and never mutate. The
//! workflow engine turns a `false` into a typed rejection with detail.

use chrono::{DateTime, Utc};

use crate::graph::TaskGraph;
use crate::task::{Task, TaskStatus};

/// Live view onto employee PRL (risk-prevention) certification.
///
/// Implementations query the employee registry directly; validity is never
/// cached because certifications lapse between evaluations.
pub trait CertificationProvider {
    fn is_certification_valid(&self, employee_id: &str, as_of: DateTime<Utc>) -> bool;
}

/// True iff every predecessor of `task` is finished and every assignee holds
/// a currently-valid certification. Unknown predecessor ids count as
/// unfinished rather than erroring.
pub fn can_start(
    graph: &TaskGraph,
    task: &Task,
    certs: &dyn CertificationProvider,
    now: DateTime<Utc>,
) -> bool {
    let predecessors_done = task.predecessors.iter().all(|p| {
        graph
            .get(p)
            .map(|t| t.status == TaskStatus::Finished)
            .unwrap_or(false)
    });
    if !predecessors_done {
        return false;
    }
    task.assignees
        .iter()
        .all(|u| certs.is_certification_valid(u, now))
}

/// True iff the task may close: non-joint tasks always can, joint tasks once
/// every assignee has an approved signature on record.
pub fn can_complete(task: &Task) -> bool {
    missing_approvals(task).is_empty()
}

/// Assignees of a joint task still lacking an approved signature. Empty for
/// non-joint tasks.
pub fn missing_approvals(task: &Task) -> Vec<String> {
    if !task.requires_joint_signature {
        return Vec::new();
    }
    let approved = task.approved_signers();
    task.assignees
        .iter()
        .filter(|u| !approved.contains(&u.as_str()))
        .cloned()
        .collect()
}
