//! Project aggregate: owns the task graph and rolls up budget vs. actuals.

use serde::{Deserialize, Serialize};

use crate::graph::TaskGraph;
use crate::task::TaskStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Planning,
    InProgress,
    Blocked,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandType {
    Urban,
    Rustic,
}

/// CTE climate zone of the site (drives envelope requirements elsewhere;
/// informational here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimateZone {
    A3,
    B3,
    C3,
    D3,
    E1,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub status: ProjectStatus,
    pub province: String,
    pub municipality: String,
    pub land_type: LandType,
    pub climate_zone: ClimateZone,

    /// Approved budget total. Not required to cover the sum of task
    /// estimates; that is a soft constraint surfaced in reporting only.
    pub budget_total: Option<f64>,

    pub tasks: TaskGraph,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: ProjectStatus::Planning,
            province: String::new(),
            municipality: String::new(),
            land_type: LandType::Urban,
            climate_zone: ClimateZone::B3,
            budget_total: None,
            tasks: TaskGraph::new(),
        }
    }

    pub fn with_location(
        mut self,
        province: impl Into<String>,
        municipality: impl Into<String>,
    ) -> Self {
        self.province = province.into();
        self.municipality = municipality.into();
        self
    }

    pub fn with_climate_zone(mut self, zone: ClimateZone) -> Self {
        self.climate_zone = zone;
        self
    }

    pub fn with_budget(mut self, total: f64) -> Self {
        self.budget_total = Some(total);
        self
    }

    /// Flat sum of actual cost over every task node. Each node tracks its own
    /// spend, so there is no double counting across tree levels.
    pub fn total_actual_cost(&self) -> f64 {
        self.tasks.iter().map(|t| t.actual_cost).sum()
    }

    /// Projected ROI in percent: (budget - cost) / cost * 100.
    /// 0 when no budget is set or nothing has been spent yet.
    pub fn roi(&self) -> f64 {
        let Some(budget) = self.budget_total else {
            return 0.0;
        };
        let cost = self.total_actual_cost();
        if cost == 0.0 {
            return 0.0;
        }
        (budget - cost) / cost * 100.0
    }

    pub fn open_task_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::InProgress))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    #[test]
    fn actual_cost_sums_all_nodes_flat() {
        let mut p = Project::new("p1", "Residencial Azahar").with_budget(1_250_000.0);
        p.tasks
            .insert(Task::new("estructura", "Estructura").with_actual_cost(298_000.0))
            .unwrap();
        let mut sub = Task::new("cimentacion", "Cimentación").with_actual_cost(118_000.0);
        sub.parent = Some("estructura".to_string());
        p.tasks.insert(sub).unwrap();

        // Subtask spend is its own, not inherited into the parent.
        assert_eq!(p.total_actual_cost(), 416_000.0);
    }

    #[test]
    fn roi_guards_divide_by_zero() {
        let mut p = Project::new("p1", "demo").with_budget(1000.0);
        p.tasks.insert(Task::new("t", "t")).unwrap();
        assert_eq!(p.roi(), 0.0);
    }

    #[test]
    fn roi_without_budget_is_zero() {
        let mut p = Project::new("p1", "demo");
        p.tasks
            .insert(Task::new("t", "t").with_actual_cost(500.0))
            .unwrap();
        assert_eq!(p.roi(), 0.0);
    }

    #[test]
    fn roi_fifty_percent() {
        let mut p = Project::new("p1", "demo").with_budget(1500.0);
        p.tasks
            .insert(Task::new("t", "t").with_actual_cost(1000.0))
            .unwrap();
        assert_eq!(p.roi(), 50.0);
    }

    #[test]
    fn open_task_count_excludes_blocked_and_finished() {
        let mut p = Project::new("p1", "demo");
        for (id, status) in [
            ("a", crate::task::TaskStatus::Pending),
            ("b", crate::task::TaskStatus::InProgress),
            ("c", crate::task::TaskStatus::Blocked),
            ("d", crate::task::TaskStatus::Finished),
        ] {
            let mut t = Task::new(id, id);
            t.status = status;
            p.tasks.insert(t).unwrap();
        }
        assert_eq!(p.open_task_count(), 2);
    }
}
