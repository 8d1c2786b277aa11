//! Workflow engine — the transactional façade over the task primitives.
//!
//! Every mutating operation runs the same discipline:
//! 1. capability check against the actor's role,
//! 2. optimistic-concurrency check against the expected task version,
//! 3. domain validation (evaluator / blocking register / signature ledger),
//! 4. mutation + version bump,
//! 5. event emission.
//!
//! Checks 1-3 all run before anything is written, so a rejected operation
//! leaves the project untouched. Two callers racing on the same task present
//! the same expected version; the loser gets `Conflict` and retries with
//! fresh state.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::blocking::{self, ResumeTarget};
use crate::error::WorkflowError;
use crate::evaluator::{self, CertificationProvider};
use crate::events::{EventSink, WorkflowEvent};
use crate::project::Project;
use crate::roles::{Actor, Capability};
use crate::signatures::{self, SignatureDecision, SignatureScope};
use crate::task::{BlockCause, Task, TaskStatus};

pub struct WorkflowEngine<C, S> {
    certs: C,
    sink: S,
}

impl<C: CertificationProvider, S: EventSink> WorkflowEngine<C, S> {
    pub fn new(certs: C, sink: S) -> Self {
        Self { certs, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Insert a new task into the project (optionally pre-parented). The
    /// record is new so there is no expected version; a pre-parented insert
    /// bumps the parent, whose child list changed.
    pub fn add_task(
        &self,
        project: &mut Project,
        actor: &Actor,
        task: Task,
    ) -> Result<(), WorkflowError> {
        actor.authorize(Capability::CreateTask)?;
        let task_id = task.id.clone();
        let parent_id = task.parent.clone();
        project.tasks.insert(task)?;
        if let Some(p) = parent_id {
            bump(project, &p);
        }
        debug!(task = %task_id, user = %actor.user_id, "task created");
        Ok(())
    }

    /// Re-wire `child_id` under `parent_id`. The edit is versioned against
    /// the child (the task being moved); every task whose edges change —
    /// child, new parent, old parent — gets a bump so stale readers conflict.
    pub fn attach_child(
        &self,
        project: &mut Project,
        actor: &Actor,
        parent_id: &str,
        child_id: &str,
        expected_version: u64,
    ) -> Result<(), WorkflowError> {
        actor.authorize(Capability::EditHierarchy)?;
        let child = require(project, child_id)?;
        check_version(child, expected_version)?;
        let old_parent = child.parent.clone();

        project.tasks.attach_child(parent_id, child_id)?;
        bump(project, child_id);
        bump(project, parent_id);
        if let Some(old) = old_parent {
            if old != parent_id {
                bump(project, &old);
            }
        }
        debug!(parent = %parent_id, child = %child_id, "hierarchy edited");
        Ok(())
    }

    /// Add a dependency edge, versioned against the dependent task. Both
    /// endpoints change (`predecessors` on one, `dependents` on the other),
    /// so both are bumped.
    pub fn add_predecessor(
        &self,
        project: &mut Project,
        actor: &Actor,
        task_id: &str,
        pred_id: &str,
        expected_version: u64,
    ) -> Result<(), WorkflowError> {
        actor.authorize(Capability::EditHierarchy)?;
        let task = require(project, task_id)?;
        check_version(task, expected_version)?;
        if task.predecessors.iter().any(|p| p == pred_id) {
            // Idempotent no-op; nothing changed, nothing bumps.
            return Ok(());
        }

        project.tasks.add_predecessor(task_id, pred_id)?;
        bump(project, task_id);
        bump(project, pred_id);
        debug!(task = %task_id, predecessor = %pred_id, "dependency added");
        Ok(())
    }

    /// Move a Pending task to InProgress, provided every predecessor is
    /// finished and the whole crew holds valid PRL certification.
    pub fn start_task(
        &self,
        project: &mut Project,
        actor: &Actor,
        task_id: &str,
        expected_version: u64,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        actor.authorize(Capability::StartTask)?;
        let task = require(project, task_id)?;
        check_version(task, expected_version)?;

        if task.status != TaskStatus::Pending {
            return Err(invalid_transition(task, "start"));
        }
        if !evaluator::can_start(&project.tasks, task, &self.certs, now) {
            let reason = self.start_refusal(project, task, now);
            return Err(WorkflowError::NotStartable {
                task_id: task_id.to_string(),
                reason,
            });
        }

        let task = project.tasks.get_mut(task_id).expect("checked above");
        task.status = TaskStatus::InProgress;
        task.version += 1;
        debug!(task = %task_id, user = %actor.user_id, "task started");
        self.sink.emit(WorkflowEvent::TaskStarted {
            task_id: task_id.to_string(),
            user_id: actor.user_id.clone(),
            at: now,
        });
        Ok(())
    }

    /// Open a blocking record; the task moves to Blocked.
    pub fn block_task(
        &self,
        project: &mut Project,
        actor: &Actor,
        task_id: &str,
        expected_version: u64,
        cause: BlockCause,
        justification: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        actor.authorize(Capability::BlockTask)?;
        let task = require(project, task_id)?;
        check_version(task, expected_version)?;

        let task = project.tasks.get_mut(task_id).expect("checked above");
        blocking::block(task, cause, justification, now)?;
        task.version += 1;
        warn!(task = %task_id, ?cause, "task blocked");
        self.sink.emit(WorkflowEvent::TaskBlocked {
            task_id: task_id.to_string(),
            cause,
            at: now,
        });
        Ok(())
    }

    /// Close the open blocking record; the task reverts to `resume_to`.
    pub fn resolve_task(
        &self,
        project: &mut Project,
        actor: &Actor,
        task_id: &str,
        expected_version: u64,
        resume_to: ResumeTarget,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        actor.authorize(Capability::ResolveBlock)?;
        let task = require(project, task_id)?;
        check_version(task, expected_version)?;

        let task = project.tasks.get_mut(task_id).expect("checked above");
        blocking::resolve(task, resume_to, now)?;
        task.version += 1;
        debug!(task = %task_id, "block resolved");
        self.sink.emit(WorkflowEvent::TaskUnblocked {
            task_id: task_id.to_string(),
            at: now,
        });
        Ok(())
    }

    /// Record (or replace) the actor's signature on the task.
    pub fn sign_task(
        &self,
        project: &mut Project,
        actor: &Actor,
        task_id: &str,
        expected_version: u64,
        decision: SignatureDecision,
        scope: SignatureScope,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        actor.authorize(Capability::SignTask)?;
        let task = require(project, task_id)?;
        check_version(task, expected_version)?;
        if task.status == TaskStatus::Finished {
            return Err(invalid_transition(task, "sign"));
        }

        let approved = decision.approved;
        let task = project.tasks.get_mut(task_id).expect("checked above");
        signatures::sign(task, &actor.user_id, decision, scope, now)?;
        task.version += 1;
        if approved {
            debug!(task = %task_id, user = %actor.user_id, "signature recorded");
        } else {
            warn!(task = %task_id, user = %actor.user_id, "task rejected by signer");
        }
        self.sink.emit(WorkflowEvent::SignatureRecorded {
            task_id: task_id.to_string(),
            user_id: actor.user_id.clone(),
            approved,
            at: now,
        });
        Ok(())
    }

    /// Finish an InProgress task. Joint tasks need an approved signature from
    /// every assignee; non-joint tasks close unconditionally for any
    /// assignee.
    pub fn complete_task(
        &self,
        project: &mut Project,
        actor: &Actor,
        task_id: &str,
        expected_version: u64,
        closing_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        actor.authorize(Capability::CompleteTask)?;
        let task = require(project, task_id)?;
        check_version(task, expected_version)?;

        if task.status != TaskStatus::InProgress {
            return Err(invalid_transition(task, "complete"));
        }
        if !task.is_assigned(&actor.user_id) && !actor.role.allows(Capability::CloseAnyTask) {
            return Err(WorkflowError::NotAssigned {
                task_id: task_id.to_string(),
                user_id: actor.user_id.clone(),
            });
        }
        let missing = evaluator::missing_approvals(task);
        if !missing.is_empty() {
            return Err(WorkflowError::NotCompletable {
                task_id: task_id.to_string(),
                missing,
            });
        }

        let task = project.tasks.get_mut(task_id).expect("checked above");
        task.status = TaskStatus::Finished;
        task.completed_by = Some(actor.user_id.clone());
        task.completed_at = Some(now);
        task.closing_notes = closing_notes;
        task.version += 1;
        debug!(task = %task_id, user = %actor.user_id, "task completed");
        self.sink.emit(WorkflowEvent::TaskCompleted {
            task_id: task_id.to_string(),
            user_id: actor.user_id.clone(),
            at: now,
        });
        Ok(())
    }

    /// Human-readable reason why `can_start` came back false.
    fn start_refusal(&self, project: &Project, task: &Task, now: DateTime<Utc>) -> String {
        for p in &task.predecessors {
            let finished = project
                .tasks
                .get(p)
                .map(|t| t.status == TaskStatus::Finished)
                .unwrap_or(false);
            if !finished {
                return format!("predecessor '{p}' is not finished");
            }
        }
        for u in &task.assignees {
            if !self.certs.is_certification_valid(u, now) {
                return format!("assignee '{u}' has no valid PRL certification");
            }
        }
        "start preconditions not met".to_string()
    }
}

fn require<'p>(project: &'p Project, task_id: &str) -> Result<&'p Task, WorkflowError> {
    project
        .tasks
        .get(task_id)
        .ok_or_else(|| WorkflowError::UnknownTask(task_id.to_string()))
}

fn bump(project: &mut Project, task_id: &str) {
    if let Some(t) = project.tasks.get_mut(task_id) {
        t.version += 1;
    }
}

fn check_version(task: &Task, expected: u64) -> Result<(), WorkflowError> {
    if task.version != expected {
        return Err(WorkflowError::Conflict {
            task_id: task.id.clone(),
            expected,
            actual: task.version,
        });
    }
    Ok(())
}

fn invalid_transition(task: &Task, action: &str) -> WorkflowError {
    WorkflowError::InvalidTransition {
        task_id: task.id.clone(),
        from: task.status.as_str().to_string(),
        action: action.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use crate::roles::Role;
    use crate::task::Priority;
    use chrono::TimeZone;
    use std::collections::HashMap;

    struct FixedCerts(HashMap<String, DateTime<Utc>>);

    impl FixedCerts {
        fn valid_for(users: &[&str], expires: DateTime<Utc>) -> Self {
            Self(users.iter().map(|u| (u.to_string(), expires)).collect())
        }
    }

    impl CertificationProvider for FixedCerts {
        fn is_certification_valid(&self, employee_id: &str, as_of: DateTime<Utc>) -> bool {
            self.0.get(employee_id).map(|exp| *exp > as_of).unwrap_or(false)
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 9, 0, 0).unwrap()
    }

    fn engine(users: &[&str]) -> WorkflowEngine<FixedCerts, MemorySink> {
        WorkflowEngine::new(
            FixedCerts::valid_for(users, now() + chrono::Duration::days(180)),
            MemorySink::new(),
        )
    }

    fn manager() -> Actor {
        Actor::new("jefe", Role::ProjectManager)
    }

    /// Plan finished, Estructura pending behind it, joint-signed by both
    /// assignees.
    fn demo_project() -> Project {
        let mut p = Project::new("p1", "Residencial Azahar").with_budget(1_250_000.0);
        let mut plan = Task::new("planificacion", "Planificación y replanteo");
        plan.status = TaskStatus::Finished;
        p.tasks.insert(plan).unwrap();
        p.tasks
            .insert(
                Task::new("estructura", "Estructura y cimentación")
                    .with_priority(Priority::Critical)
                    .with_assignees(["jefe", "oficina"])
                    .with_joint_signature(),
            )
            .unwrap();
        p.tasks.add_predecessor("estructura", "planificacion").unwrap();
        p
    }

    #[test]
    fn start_requires_finished_predecessors() {
        let eng = engine(&["jefe", "oficina"]);
        let mut p = demo_project();
        p.tasks
            .insert(Task::new("cerramientos", "Cerramientos").with_assignees(["jefe"]))
            .unwrap();
        p.tasks.add_predecessor("cerramientos", "estructura").unwrap();

        let err = eng
            .start_task(&mut p, &manager(), "cerramientos", 0, now())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotStartable { ref reason, .. }
            if reason.contains("estructura")));
        assert_eq!(p.tasks.get("cerramientos").unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn start_requires_valid_certifications() {
        let eng = engine(&["jefe"]); // oficina has no certification on file
        let mut p = demo_project();

        let err = eng
            .start_task(&mut p, &manager(), "estructura", 0, now())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotStartable { ref reason, .. }
            if reason.contains("oficina")));
    }

    #[test]
    fn start_happy_path_bumps_version_and_emits() {
        let eng = engine(&["jefe", "oficina"]);
        let mut p = demo_project();

        eng.start_task(&mut p, &manager(), "estructura", 0, now()).unwrap();
        let t = p.tasks.get("estructura").unwrap();
        assert_eq!(t.status, TaskStatus::InProgress);
        assert_eq!(t.version, 1);

        let events = eng.sink().events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], WorkflowEvent::TaskStarted { .. }));
    }

    #[test]
    fn stale_version_conflicts_and_leaves_state_alone() {
        let eng = engine(&["jefe", "oficina"]);
        let mut p = demo_project();
        eng.start_task(&mut p, &manager(), "estructura", 0, now()).unwrap();

        // A second caller still holding version 0 loses the race.
        let err = eng
            .block_task(
                &mut p,
                &manager(),
                "estructura",
                0,
                BlockCause::Weather,
                "temporal",
                now(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::Conflict {
                task_id: "estructura".to_string(),
                expected: 0,
                actual: 1,
            }
        );
        assert_eq!(p.tasks.get("estructura").unwrap().status, TaskStatus::InProgress);
        assert!(p.tasks.get("estructura").unwrap().blockings.is_empty());
    }

    #[test]
    fn joint_completion_needs_all_approvals_rejection_supersedable() {
        let eng = engine(&["jefe", "oficina"]);
        let mut p = demo_project();
        eng.start_task(&mut p, &manager(), "estructura", 0, now()).unwrap();

        let oficina = Actor::new("oficina", Role::TechnicalOffice);
        eng.sign_task(
            &mut p,
            &manager(),
            "estructura",
            1,
            SignatureDecision::approve(),
            SignatureScope::CompletionGate,
            now(),
        )
        .unwrap();
        eng.sign_task(
            &mut p,
            &oficina,
            "estructura",
            2,
            SignatureDecision::reject("incompatibilidades con trazado"),
            SignatureScope::CompletionGate,
            now(),
        )
        .unwrap();

        let err = eng
            .complete_task(&mut p, &manager(), "estructura", 3, None, now())
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::NotCompletable {
                task_id: "estructura".to_string(),
                missing: vec!["oficina".to_string()],
            }
        );

        // The rejection is a stance, not a veto: a later approval replaces it.
        eng.sign_task(
            &mut p,
            &oficina,
            "estructura",
            3,
            SignatureDecision::approve(),
            SignatureScope::CompletionGate,
            now() + chrono::Duration::days(2),
        )
        .unwrap();
        eng.complete_task(
            &mut p,
            &manager(),
            "estructura",
            4,
            Some("conforme a control de calidad".to_string()),
            now() + chrono::Duration::days(2),
        )
        .unwrap();

        let t = p.tasks.get("estructura").unwrap();
        assert_eq!(t.status, TaskStatus::Finished);
        assert_eq!(t.completed_by.as_deref(), Some("jefe"));
        assert_eq!(t.signatures.len(), 2);
    }

    #[test]
    fn non_joint_task_completes_without_signatures() {
        let eng = engine(&["op-1"]);
        let mut p = Project::new("p", "demo");
        p.tasks
            .insert(Task::new("acopio", "Acopio de material").with_assignees(["op-1"]))
            .unwrap();
        let worker = Actor::new("op-1", Role::Worker);

        eng.start_task(&mut p, &worker, "acopio", 0, now()).unwrap();
        eng.complete_task(&mut p, &worker, "acopio", 1, None, now()).unwrap();
        assert_eq!(p.tasks.get("acopio").unwrap().status, TaskStatus::Finished);
    }

    #[test]
    fn non_assignee_without_override_cannot_complete() {
        let eng = engine(&["op-1", "op-2"]);
        let mut p = Project::new("p", "demo");
        p.tasks
            .insert(Task::new("t", "t").with_assignees(["op-1"]))
            .unwrap();
        let owner = Actor::new("op-1", Role::Worker);
        let other = Actor::new("op-2", Role::Worker);

        eng.start_task(&mut p, &owner, "t", 0, now()).unwrap();
        let err = eng.complete_task(&mut p, &other, "t", 1, None, now()).unwrap_err();
        assert!(matches!(err, WorkflowError::NotAssigned { .. }));

        // A project manager may close anyone's task.
        eng.complete_task(&mut p, &manager(), "t", 1, None, now()).unwrap();
    }

    #[test]
    fn worker_cannot_resolve_a_block() {
        let eng = engine(&["op-1"]);
        let mut p = Project::new("p", "demo");
        p.tasks.insert(Task::new("t", "t")).unwrap();
        let worker = Actor::new("op-1", Role::Worker);

        eng.block_task(&mut p, &worker, "t", 0, BlockCause::MaterialShortage, "sin acero", now())
            .unwrap();
        let err = eng
            .resolve_task(&mut p, &worker, "t", 1, ResumeTarget::Pending, now())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotAuthorized { .. }));
        assert_eq!(p.tasks.get("t").unwrap().status, TaskStatus::Blocked);
    }

    #[test]
    fn block_resolve_scenario_reverts_to_pending() {
        let eng = engine(&[]);
        let mut p = Project::new("p", "demo");
        p.tasks.insert(Task::new("t", "t")).unwrap();

        eng.block_task(&mut p, &manager(), "t", 0, BlockCause::MaterialShortage, "sin acero", now())
            .unwrap();
        let err = eng
            .block_task(&mut p, &manager(), "t", 1, BlockCause::Weather, "lluvia", now())
            .unwrap_err();
        assert_eq!(err, WorkflowError::AlreadyBlocked("t".to_string()));

        eng.resolve_task(&mut p, &manager(), "t", 1, ResumeTarget::Pending, now())
            .unwrap();
        assert_eq!(p.tasks.get("t").unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn events_follow_commit_order() {
        let eng = engine(&["jefe", "oficina"]);
        let mut p = demo_project();

        eng.start_task(&mut p, &manager(), "estructura", 0, now()).unwrap();
        eng.block_task(&mut p, &manager(), "estructura", 1, BlockCause::Weather, "temporal", now())
            .unwrap();
        eng.resolve_task(&mut p, &manager(), "estructura", 2, ResumeTarget::InProgress, now())
            .unwrap();

        let kinds: Vec<&str> = eng
            .sink()
            .events()
            .iter()
            .map(|e| match e {
                WorkflowEvent::TaskStarted { .. } => "started",
                WorkflowEvent::TaskBlocked { .. } => "blocked",
                WorkflowEvent::TaskUnblocked { .. } => "unblocked",
                WorkflowEvent::TaskCompleted { .. } => "completed",
                WorkflowEvent::SignatureRecorded { .. } => "signed",
            })
            .collect();
        assert_eq!(kinds, vec!["started", "blocked", "unblocked"]);
    }

    #[test]
    fn completing_a_blocked_task_is_refused() {
        let eng = engine(&["op-1"]);
        let mut p = Project::new("p", "demo");
        p.tasks
            .insert(Task::new("t", "t").with_assignees(["op-1"]))
            .unwrap();
        let worker = Actor::new("op-1", Role::Worker);
        eng.start_task(&mut p, &worker, "t", 0, now()).unwrap();
        eng.block_task(&mut p, &worker, "t", 1, BlockCause::Other, "parada", now())
            .unwrap();

        let err = eng.complete_task(&mut p, &worker, "t", 2, None, now()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[test]
    fn signing_a_finished_task_is_refused() {
        let eng = engine(&["op-1"]);
        let mut p = Project::new("p", "demo");
        p.tasks
            .insert(Task::new("t", "t").with_assignees(["op-1"]))
            .unwrap();
        let worker = Actor::new("op-1", Role::Worker);
        eng.start_task(&mut p, &worker, "t", 0, now()).unwrap();
        eng.complete_task(&mut p, &worker, "t", 1, None, now()).unwrap();

        let err = eng
            .sign_task(
                &mut p,
                &worker,
                "t",
                2,
                SignatureDecision::approve(),
                SignatureScope::Informational,
                now(),
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[test]
    fn hierarchy_edits_respect_capabilities() {
        let eng = engine(&[]);
        let mut p = Project::new("p", "demo");
        let oficina = Actor::new("oficina", Role::TechnicalOffice);
        eng.add_task(&mut p, &oficina, Task::new("a", "a")).unwrap();
        eng.add_task(&mut p, &oficina, Task::new("b", "b")).unwrap();
        eng.attach_child(&mut p, &oficina, "a", "b", 0).unwrap();

        let worker = Actor::new("op-1", Role::Worker);
        let err = eng.add_task(&mut p, &worker, Task::new("c", "c")).unwrap_err();
        assert!(matches!(err, WorkflowError::NotAuthorized { .. }));
    }

    #[test]
    fn hierarchy_edits_are_versioned_like_any_other_write() {
        let eng = engine(&[]);
        let mut p = Project::new("p", "demo");
        let oficina = Actor::new("oficina", Role::TechnicalOffice);
        eng.add_task(&mut p, &oficina, Task::new("a", "a")).unwrap();
        eng.add_task(&mut p, &oficina, Task::new("b", "b")).unwrap();

        // Stale view of the task being moved loses the race.
        let err = eng.attach_child(&mut p, &oficina, "a", "b", 7).unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict { .. }));
        assert!(p.tasks.get("b").unwrap().parent.is_none());

        eng.attach_child(&mut p, &oficina, "a", "b", 0).unwrap();
        // Both endpoints moved on, so stale readers of either now conflict.
        assert_eq!(p.tasks.get("a").unwrap().version, 1);
        assert_eq!(p.tasks.get("b").unwrap().version, 1);

        let err = eng
            .add_predecessor(&mut p, &oficina, "b", "a", 0)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict { .. }));
        eng.add_predecessor(&mut p, &oficina, "b", "a", 1).unwrap();
        assert_eq!(p.tasks.get("a").unwrap().version, 2);
        assert_eq!(p.tasks.get("b").unwrap().version, 2);

        // Repeating the same edge is a no-op and does not bump.
        eng.add_predecessor(&mut p, &oficina, "b", "a", 2).unwrap();
        assert_eq!(p.tasks.get("b").unwrap().version, 2);
    }

    #[test]
    fn rewire_conflicts_a_stale_status_change() {
        let eng = engine(&["op-1"]);
        let mut p = Project::new("p", "demo");
        let oficina = Actor::new("oficina", Role::TechnicalOffice);
        eng.add_task(
            &mut p,
            &oficina,
            Task::new("t", "t").with_assignees(["op-1"]),
        )
        .unwrap();
        eng.add_task(&mut p, &oficina, Task::new("gate", "gate")).unwrap();

        // A worker reads version 0, then the office wires a dependency in.
        eng.add_predecessor(&mut p, &oficina, "t", "gate", 0).unwrap();

        let worker = Actor::new("op-1", Role::Worker);
        let err = eng.start_task(&mut p, &worker, "t", 0, now()).unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict { .. }));
    }

    #[test]
    fn pre_parented_add_task_bumps_the_parent() {
        let eng = engine(&[]);
        let mut p = Project::new("p", "demo");
        let oficina = Actor::new("oficina", Role::TechnicalOffice);
        eng.add_task(&mut p, &oficina, Task::new("root", "root")).unwrap();

        let mut child = Task::new("child", "child");
        child.parent = Some("root".to_string());
        eng.add_task(&mut p, &oficina, child).unwrap();

        assert_eq!(p.tasks.get("root").unwrap().version, 1);
        assert_eq!(p.tasks.get("child").unwrap().level, 1);
    }
}
