//! obras-core: task hierarchy and completion workflow for construction projects.

pub mod blocking;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod graph;
pub mod project;
pub mod roles;
pub mod signatures;
pub mod task;
pub mod workflow;

pub use blocking::ResumeTarget;
pub use error::WorkflowError;
pub use evaluator::{can_complete, can_start, missing_approvals, CertificationProvider};
pub use events::{EventSink, MemorySink, NullSink, WorkflowEvent};
pub use graph::TaskGraph;
pub use project::{ClimateZone, LandType, Project, ProjectStatus};
pub use roles::{Actor, Capability, Role};
pub use signatures::{SignatureDecision, SignatureScope};
pub use task::{BlockCause, Blocking, Priority, Signature, Task, TaskStatus};
pub use workflow::WorkflowEngine;
