//! Task domain model.
//!
//! # Responsibility
//! - Define the sized task record and its completion/today transitions.
//!
//! # Invariants
//! - `project_id == None` is the unscoped quick bucket; such tasks are quick.
//! - A completed task never has `is_today == true`.
//! - `project_name` is a display cache only. Membership is `project_id`.

use crate::model::project::{Project, ProjectId};
use crate::model::sizing::TaskSize;
use crate::model::validation::ValidationError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Owning project, or `None` for the quick bucket.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    pub title: String,
    pub size: TaskSize,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_today: bool,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    /// Project name captured at creation. May be stale after rename/delete.
    #[serde(default)]
    pub project_name: Option<String>,
}

impl Task {
    /// Creates a task inside `project`, snapshotting its name for display.
    pub fn for_project(project: &Project, title: impl Into<String>, size: TaskSize) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id: Some(project.id),
            title: title.into(),
            size,
            completed: false,
            is_today: false,
            completed_at: None,
            project_name: Some(project.name.clone()),
        }
    }

    /// Creates a standalone quick task.
    pub fn quick(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id: None,
            title: title.into(),
            size: TaskSize::Quick,
            completed: false,
            is_today: false,
            completed_at: None,
            project_name: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTaskTitle);
        }
        match (self.project_id, self.size) {
            (Some(_), TaskSize::Quick) => return Err(ValidationError::QuickTaskInProject),
            (None, size) if size.is_slotted() => {
                return Err(ValidationError::UnscopedTaskNotQuick)
            }
            _ => {}
        }
        if self.completed && self.is_today {
            return Err(ValidationError::CompletedTaskMarkedToday);
        }
        Ok(())
    }

    /// Returns whether this task currently occupies a daily slot.
    pub fn occupies_slot(&self) -> bool {
        self.is_today && !self.completed && self.size.is_slotted()
    }

    /// Returns whether this task counts as remaining work for its project.
    pub fn is_remaining_work(&self) -> bool {
        !self.completed && self.size.is_slotted()
    }

    pub fn belongs_to(&self, project_id: ProjectId) -> bool {
        self.project_id == Some(project_id)
    }

    /// Returns the completed form of this task; the today flag is dropped.
    pub fn as_completed(&self, at: NaiveDateTime) -> Self {
        Self {
            completed: true,
            is_today: false,
            completed_at: Some(at),
            ..self.clone()
        }
    }

    /// Display label for the owning project.
    ///
    /// Prefers the live project's name and falls back to the cached snapshot.
    /// The fallback may be stale and is never used for membership.
    pub fn project_label<'a>(&'a self, projects: &'a [Project]) -> &'a str {
        let Some(project_id) = self.project_id else {
            return "";
        };
        projects
            .iter()
            .find(|project| project.id == project_id)
            .map(|project| project.name.as_str())
            .or(self.project_name.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::Task;
    use crate::model::project::Project;
    use crate::model::sizing::TaskSize;
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    fn project(name: &str) -> Project {
        let created = NaiveDate::from_ymd_opt(2026, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid timestamp");
        let deadline = NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date");
        Project::new(name, "", deadline, created)
    }

    #[test]
    fn validate_rejects_mis_scoped_sizes() {
        let p = project("Thesis");
        let mut scoped_quick = Task::for_project(&p, "x", TaskSize::Medium);
        scoped_quick.size = TaskSize::Quick;
        assert_eq!(
            scoped_quick.validate(),
            Err(ValidationError::QuickTaskInProject)
        );

        let mut unscoped_large = Task::quick("y");
        unscoped_large.size = TaskSize::Large;
        assert_eq!(
            unscoped_large.validate(),
            Err(ValidationError::UnscopedTaskNotQuick)
        );
    }

    #[test]
    fn completing_clears_today_flag() {
        let p = project("Thesis");
        let mut task = Task::for_project(&p, "outline", TaskSize::Large);
        task.is_today = true;
        let at = NaiveDate::from_ymd_opt(2026, 3, 2)
            .and_then(|d| d.and_hms_opt(18, 30, 0))
            .expect("valid timestamp");

        let done = task.as_completed(at);
        assert!(done.completed);
        assert!(!done.is_today);
        assert_eq!(done.completed_at, Some(at));
        assert!(done.validate().is_ok());
    }

    #[test]
    fn project_label_prefers_live_name_over_snapshot() {
        let mut p = project("Old name");
        let task = Task::for_project(&p, "draft", TaskSize::Small);
        p.name = "New name".to_string();

        assert_eq!(task.project_label(std::slice::from_ref(&p)), "New name");
        assert_eq!(task.project_label(&[]), "Old name");
        assert_eq!(Task::quick("milk").project_label(&[p]), "");
    }
}
