//! In-memory entity store.
//!
//! # Responsibility
//! - Hold every collection the planner persists, as plain data.
//!
//! # Invariants
//! - `markers` are control state for at-most-once daily effects, not domain
//!   data; they are persisted apart from the main bundle.

use crate::model::checklist::ChecklistItem;
use crate::model::project::{Project, ProjectId};
use crate::model::settings::Settings;
use crate::model::task::{Task, TaskId};
use chrono::NaiveDate;

/// Calendar-day markers used for idempotency of daily effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayMarkers {
    /// Last calendar day the planner was seen active (streak tracking).
    pub last_active_day: Option<NaiveDate>,
    /// Day whose reset has already fired.
    pub last_reset_day: Option<NaiveDate>,
    /// Day whose pre-reset reminder has already fired.
    pub last_notify_day: Option<NaiveDate>,
}

/// Whole planner state; mutated only through whole-object replacement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannerState {
    pub projects: Vec<Project>,
    /// Ordered; the order is the user's manual sort order.
    pub tasks: Vec<Task>,
    pub streak: u32,
    pub settings: Settings,
    pub markers: DayMarkers,
    pub checklist: Vec<ChecklistItem>,
}

impl PlannerState {
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Tasks belonging to `project_id`, in list order.
    pub fn project_tasks(&self, project_id: ProjectId) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |task| task.belongs_to(project_id))
    }

    /// Unscoped quick tasks, in list order.
    pub fn quick_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| task.project_id.is_none())
    }

    /// Incomplete today-tasks, in list order.
    pub fn today_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| task.occupies_slot())
    }

    /// Replaces the task with the same id. Returns `false` when absent.
    pub fn replace_task(&mut self, updated: Task) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    /// Replaces the project with the same id. Returns `false` when absent.
    pub fn replace_project(&mut self, updated: Project) -> bool {
        match self.projects.iter_mut().find(|project| project.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }
}
