//! Workflow event contracts.
//!
//! Emitted fire-and-forget after each committed mutation; sinks must not be
//! able to fail the operation, so `emit` returns nothing. serde-ready for
//! JSON transport (notification feeds, audit log, websocket).

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::BlockCause;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    TaskStarted {
        task_id: String,
        user_id: String,
        at: DateTime<Utc>,
    },
    TaskBlocked {
        task_id: String,
        cause: BlockCause,
        at: DateTime<Utc>,
    },
    TaskUnblocked {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        user_id: String,
        at: DateTime<Utc>,
    },
    SignatureRecorded {
        task_id: String,
        user_id: String,
        approved: bool,
        at: DateTime<Utc>,
    },
}

impl WorkflowEvent {
    pub fn task_id(&self) -> &str {
        match self {
            WorkflowEvent::TaskStarted { task_id, .. }
            | WorkflowEvent::TaskBlocked { task_id, .. }
            | WorkflowEvent::TaskUnblocked { task_id, .. }
            | WorkflowEvent::TaskCompleted { task_id, .. }
            | WorkflowEvent::SignatureRecorded { task_id, .. } => task_id,
        }
    }
}

/// Delivery target for workflow events. Fire-and-forget: no ordering
/// guarantee across sinks, no error channel back into the engine.
pub trait EventSink {
    fn emit(&self, event: WorkflowEvent);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: WorkflowEvent) {}
}

/// Collects events in memory, in commit order. Meant for tests and the CLI.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<WorkflowEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WorkflowEvent> {
        self.events.lock().expect("sink poisoned").clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: WorkflowEvent) {
        self.events.lock().expect("sink poisoned").push(event);
    }
}
