//! Task model for the construction-project workflow.
//!
//! A task is one node of a project's work breakdown: it carries its own
//! budget/actuals, its place in the parent/child tree, its predecessor edges,
//! and the signature and blocking records that gate its lifecycle.
//!
//! Relationships are stored as plain id strings; the owning arena lives in
//! `crate::graph`. Keeping the node serializable and free of references means
//! cycle checks are traversals over ids, not pointer chasing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Blocked,
    Finished,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Why a task is halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCause {
    MaterialShortage,
    ExecutionError,
    RegulatoryIssue,
    Weather,
    Other,
}

/// One user's recorded stance on a joint task.
///
/// At most one per (task, user); a resubmission replaces the prior record, so
/// a rejection is a stance that a later approval can supersede.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub user_id: String,
    pub signed_at: DateTime<Utc>,
    pub approved: bool,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
}

/// A blocking incident. Open while `resolved_at` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blocking {
    pub cause: BlockCause,
    pub justification: String,
    pub opened_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Blocking {
    pub fn is_open(&self) -> bool {
        self.resolved_at.is_none()
    }
}

/// Core task node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,

    pub status: TaskStatus,
    pub priority: Priority,

    /// Depth in the tree: 0 for roots, parent.level + 1 otherwise.
    /// Maintained by the graph, never set by hand after insertion.
    pub level: u32,

    pub estimated_budget: f64,
    pub actual_cost: f64,

    /// Weak back-reference; the parent owns this task through `children`.
    pub parent: Option<String>,
    pub children: Vec<String>,

    /// Dependency edges. May span siblings or cross subtrees.
    pub predecessors: Vec<String>,
    /// Derived inverse of `predecessors`, kept in sync by the graph.
    pub dependents: Vec<String>,

    pub assignees: Vec<String>,

    pub requires_joint_signature: bool,
    pub signatures: Vec<Signature>,

    /// Full incident history; at most one entry may be open.
    pub blockings: Vec<Blocking>,

    pub completed_by: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub closing_notes: Option<String>,

    /// Planned window, informational only.
    pub planned_start: Option<DateTime<Utc>>,
    pub planned_end: Option<DateTime<Utc>>,

    /// Attached documents live elsewhere; the node only carries the count.
    pub document_count: u32,

    /// Optimistic-concurrency counter, bumped on every committed mutation.
    pub version: u64,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            level: 0,
            estimated_budget: 0.0,
            actual_cost: 0.0,
            parent: None,
            children: Vec::new(),
            predecessors: Vec::new(),
            dependents: Vec::new(),
            assignees: Vec::new(),
            requires_joint_signature: false,
            signatures: Vec::new(),
            blockings: Vec::new(),
            completed_by: None,
            completed_at: None,
            closing_notes: None,
            planned_start: None,
            planned_end: None,
            document_count: 0,
            version: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimate(mut self, budget: f64) -> Self {
        self.estimated_budget = budget;
        self
    }

    pub fn with_actual_cost(mut self, cost: f64) -> Self {
        self.actual_cost = cost;
        self
    }

    pub fn with_assignees<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assignees = users.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_joint_signature(mut self) -> Self {
        self.requires_joint_signature = true;
        self
    }

    pub fn with_planned_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.planned_start = Some(start);
        self.planned_end = Some(end);
        self
    }

    pub fn is_assigned(&self, user_id: &str) -> bool {
        self.assignees.iter().any(|u| u == user_id)
    }

    pub fn open_blocking(&self) -> Option<&Blocking> {
        self.blockings.iter().find(|b| b.is_open())
    }

    pub fn signature_of(&self, user_id: &str) -> Option<&Signature> {
        self.signatures.iter().find(|s| s.user_id == user_id)
    }

    /// Users whose signature on record is an approval.
    pub fn approved_signers(&self) -> Vec<&str> {
        self.signatures
            .iter()
            .filter(|s| s.approved)
            .map(|s| s.user_id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sig(user: &str, approved: bool) -> Signature {
        Signature {
            user_id: user.to_string(),
            signed_at: Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap(),
            approved,
            rejection_reason: None,
            notes: None,
        }
    }

    #[test]
    fn new_task_is_pending_root() {
        let t = Task::new("t1", "Planificación y replanteo");
        assert_eq!(t.status, TaskStatus::Pending);
        assert_eq!(t.level, 0);
        assert!(t.parent.is_none());
        assert_eq!(t.version, 0);
    }

    #[test]
    fn approved_signers_skips_rejections() {
        let mut t = Task::new("t1", "Estructura").with_assignees(["ana", "bruno"]);
        t.signatures.push(sig("ana", true));
        t.signatures.push(sig("bruno", false));
        assert_eq!(t.approved_signers(), vec!["ana"]);
        assert!(t.signature_of("bruno").is_some());
    }

    #[test]
    fn open_blocking_ignores_resolved_records() {
        let mut t = Task::new("t1", "Instalaciones");
        let opened = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        t.blockings.push(Blocking {
            cause: BlockCause::Weather,
            justification: "temporal de levante".to_string(),
            opened_at: opened,
            resolved_at: Some(opened + chrono::Duration::days(2)),
        });
        assert!(t.open_blocking().is_none());

        t.blockings.push(Blocking {
            cause: BlockCause::MaterialShortage,
            justification: "sin acero B500S".to_string(),
            opened_at: opened + chrono::Duration::days(5),
            resolved_at: None,
        });
        assert_eq!(
            t.open_blocking().map(|b| b.cause),
            Some(BlockCause::MaterialShortage)
        );
    }

    #[test]
    fn task_json_shape_is_stable() {
        let t = Task::new("t1", "Cerramientos")
            .with_priority(Priority::High)
            .with_joint_signature();
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"id\":\"t1\""));
        assert!(json.contains("\"status\":\"Pending\""));
        assert!(json.contains("\"requires_joint_signature\":true"));

        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
