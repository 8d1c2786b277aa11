//! Roles and the capability table consulted by every engine operation.
//!
//! The original system dispatched on role strings scattered through the UI;
//! here the roles are a closed enumeration and the table lives in one place.

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    ProjectManager,
    TechnicalOffice,
    Worker,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::ProjectManager => "project-manager",
            Role::TechnicalOffice => "technical-office",
            Role::Worker => "worker",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CreateTask,
    EditHierarchy,
    StartTask,
    BlockTask,
    ResolveBlock,
    SignTask,
    CompleteTask,
    /// Close a task one is not assigned to (site management prerogative).
    CloseAnyTask,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::CreateTask => "create-task",
            Capability::EditHierarchy => "edit-hierarchy",
            Capability::StartTask => "start-task",
            Capability::BlockTask => "block-task",
            Capability::ResolveBlock => "resolve-block",
            Capability::SignTask => "sign-task",
            Capability::CompleteTask => "complete-task",
            Capability::CloseAnyTask => "close-any-task",
        }
    }
}

impl Role {
    /// The capability table. Workers report blocks but cannot lift them;
    /// the technical office plans but does not close other people's work.
    pub fn allows(self, cap: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Administrator | Role::ProjectManager => true,
            Role::TechnicalOffice => matches!(
                cap,
                CreateTask
                    | EditHierarchy
                    | StartTask
                    | BlockTask
                    | ResolveBlock
                    | SignTask
                    | CompleteTask
            ),
            Role::Worker => matches!(cap, StartTask | BlockTask | SignTask | CompleteTask),
        }
    }
}

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub(crate) fn authorize(&self, cap: Capability) -> Result<(), WorkflowError> {
        if self.role.allows(cap) {
            Ok(())
        } else {
            Err(WorkflowError::NotAuthorized {
                role: self.role.as_str().to_string(),
                action: cap.as_str().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managers_can_do_everything() {
        for cap in [
            Capability::CreateTask,
            Capability::ResolveBlock,
            Capability::CloseAnyTask,
        ] {
            assert!(Role::Administrator.allows(cap));
            assert!(Role::ProjectManager.allows(cap));
        }
    }

    #[test]
    fn workers_report_blocks_but_cannot_resolve() {
        assert!(Role::Worker.allows(Capability::BlockTask));
        assert!(!Role::Worker.allows(Capability::ResolveBlock));
        assert!(!Role::Worker.allows(Capability::CreateTask));
    }

    #[test]
    fn technical_office_does_not_close_others_work() {
        assert!(Role::TechnicalOffice.allows(Capability::EditHierarchy));
        assert!(Role::TechnicalOffice.allows(Capability::CompleteTask));
        assert!(!Role::TechnicalOffice.allows(Capability::CloseAnyTask));
    }

    #[test]
    fn authorize_rejection_names_role_and_action() {
        let actor = Actor::new("op-1", Role::Worker);
        let err = actor.authorize(Capability::ResolveBlock).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::NotAuthorized {
                role: "worker".to_string(),
                action: "resolve-block".to_string(),
            }
        );
    }
}
