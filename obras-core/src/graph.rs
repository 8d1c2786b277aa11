//! TaskGraph — arena storage for a project's tasks.
//!
//! Design:
//! - Canonical `Task` nodes live in a map (id -> Task); insertion order is
//!   kept separately so listings are deterministic.
//! - Parent/child and predecessor/dependent edges are id pairs stored on the
//!   nodes themselves, so integrity checks are traversals over ids.
//! - Hierarchy invariants are enforced at write time: levels always equal
//!   parent.level + 1, and neither the parent chain nor the dependency graph
//!   can be made cyclic. A rejected edit changes nothing.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::task::Task;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskGraph {
    tasks: HashMap<String, Task>,
    order: Vec<String>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Crate-only: external callers mutate tasks through the workflow
    /// engine, never behind the hierarchy checks.
    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    /// Tasks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    /// Root tasks (no parent), in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &Task> {
        self.iter().filter(|t| t.parent.is_none())
    }

    /// Insert a new task. If `task.parent` is set, the parent must already
    /// exist; the child is registered under it and its level derived.
    ///
    /// Relational edges may only enter through `attach_child` and
    /// `add_predecessor`, where they are mirrored and cycle-checked; a task
    /// arriving with pre-filled `children`/`predecessors`/`dependents` is
    /// rejected outright.
    pub fn insert(&mut self, mut task: Task) -> Result<(), WorkflowError> {
        if self.tasks.contains_key(&task.id) {
            return Err(WorkflowError::DuplicateTask(task.id));
        }
        if !task.children.is_empty()
            || !task.predecessors.is_empty()
            || !task.dependents.is_empty()
        {
            return Err(WorkflowError::InvalidHierarchy(format!(
                "task '{}' must be inserted without relational edges",
                task.id
            )));
        }

        match task.parent.clone() {
            Some(parent_id) => {
                let parent = self
                    .tasks
                    .get_mut(&parent_id)
                    .ok_or_else(|| WorkflowError::UnknownTask(parent_id.clone()))?;
                task.level = parent.level + 1;
                parent.children.push(task.id.clone());
            }
            None => task.level = 0,
        }

        self.order.push(task.id.clone());
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Make `child_id` a child of `parent_id`.
    ///
    /// Fails with `Cycle` when attaching a root whose subtree already contains
    /// the parent, and with `InvalidHierarchy` when moving an already-parented
    /// task under one of its own descendants.
    pub fn attach_child(&mut self, parent_id: &str, child_id: &str) -> Result<(), WorkflowError> {
        self.require(parent_id)?;
        self.require(child_id)?;

        if parent_id == child_id {
            return Err(WorkflowError::Cycle(format!(
                "task '{child_id}' cannot be its own parent"
            )));
        }

        // "child is an ancestor of parent" is exactly "parent sits inside
        // child's subtree"; which error we raise depends on whether this is a
        // fresh attach or a move.
        let was_parented = self.tasks[child_id].parent.is_some();
        if self.is_ancestor(child_id, parent_id) {
            let msg = format!("'{child_id}' is an ancestor of '{parent_id}'");
            return Err(if was_parented {
                WorkflowError::InvalidHierarchy(msg)
            } else {
                WorkflowError::Cycle(msg)
            });
        }

        if let Some(old_parent) = self.tasks[child_id].parent.clone() {
            if old_parent == parent_id {
                return Ok(());
            }
            if let Some(old) = self.tasks.get_mut(&old_parent) {
                old.children.retain(|c| c != child_id);
            }
        }

        self.tasks
            .get_mut(parent_id)
            .expect("checked above")
            .children
            .push(child_id.to_string());
        self.tasks.get_mut(child_id).expect("checked above").parent =
            Some(parent_id.to_string());

        self.recompute_levels(child_id);
        Ok(())
    }

    /// Add a dependency edge: `task_id` may not start until `pred_id` is
    /// finished. Idempotent for an existing edge; fails with `Cycle` if the
    /// edge would close a loop in the dependency graph.
    pub fn add_predecessor(&mut self, task_id: &str, pred_id: &str) -> Result<(), WorkflowError> {
        self.require(task_id)?;
        self.require(pred_id)?;

        if task_id == pred_id {
            return Err(WorkflowError::Cycle(format!(
                "task '{task_id}' cannot depend on itself"
            )));
        }
        if self.tasks[task_id].predecessors.iter().any(|p| p == pred_id) {
            return Ok(());
        }
        // The edge pred -> task closes a loop iff pred is already downstream
        // of task through dependent edges.
        if self.reachable_via_dependents(task_id, pred_id) {
            return Err(WorkflowError::Cycle(format!(
                "'{pred_id}' already depends on '{task_id}'"
            )));
        }

        self.tasks
            .get_mut(task_id)
            .expect("checked above")
            .predecessors
            .push(pred_id.to_string());
        self.tasks
            .get_mut(pred_id)
            .expect("checked above")
            .dependents
            .push(task_id.to_string());
        Ok(())
    }

    /// Ids of the subtree rooted at `id`, excluding `id` itself.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut queue: VecDeque<String> = match self.tasks.get(id) {
            Some(t) => t.children.iter().cloned().collect(),
            None => return out,
        };
        while let Some(next) = queue.pop_front() {
            if let Some(t) = self.tasks.get(&next) {
                queue.extend(t.children.iter().cloned());
            }
            out.push(next);
        }
        out
    }

    /// True when `ancestor_id` appears on the parent chain above `id`.
    pub fn is_ancestor(&self, ancestor_id: &str, id: &str) -> bool {
        let mut current = self.tasks.get(id).and_then(|t| t.parent.clone());
        while let Some(p) = current {
            if p == ancestor_id {
                return true;
            }
            current = self.tasks.get(&p).and_then(|t| t.parent.clone());
        }
        false
    }

    fn require(&self, id: &str) -> Result<(), WorkflowError> {
        if self.tasks.contains_key(id) {
            Ok(())
        } else {
            Err(WorkflowError::UnknownTask(id.to_string()))
        }
    }

    /// Forward reachability over dependent edges.
    fn reachable_via_dependents(&self, from: &str, target: &str) -> bool {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(from);
        while let Some(next) = queue.pop_front() {
            if next == target {
                return true;
            }
            if !seen.insert(next) {
                continue;
            }
            if let Some(t) = self.tasks.get(next) {
                for d in &t.dependents {
                    queue.push_back(d);
                }
            }
        }
        false
    }

    /// Re-derive levels for the subtree rooted at `root_id`.
    fn recompute_levels(&mut self, root_id: &str) {
        let base = match self.tasks.get(root_id).and_then(|t| t.parent.clone()) {
            Some(p) => self.tasks.get(&p).map(|t| t.level + 1).unwrap_or(0),
            None => 0,
        };
        let mut queue: VecDeque<(String, u32)> = VecDeque::new();
        queue.push_back((root_id.to_string(), base));
        while let Some((id, level)) = queue.pop_front() {
            if let Some(t) = self.tasks.get_mut(&id) {
                t.level = level;
                for c in &t.children {
                    queue.push_back((c.clone(), level + 1));
                }
            }
        }
    }
}
