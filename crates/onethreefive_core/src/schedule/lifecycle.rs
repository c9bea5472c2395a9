//! Project completion detection and acknowledgment.
//!
//! # Invariants
//! - A completion event needs an existing, non-archived project with at
//!   least one slotted task and none remaining.
//! - Acknowledging only archives; task records stay for history.

use crate::model::project::{Project, ProjectId};
use crate::model::sizing::SizeTable;
use crate::model::task::Task;
use crate::schedule::urgency::project_load;

/// Emitted when the last remaining task of a project is completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCompleted {
    pub project_id: ProjectId,
    pub name: String,
    /// Planned minutes over all the project's tasks, completed or not.
    pub planned_minutes: u32,
}

/// Checks whether `project` has just become complete.
///
/// Call after the completing task has been committed to `tasks`.
pub fn detect_completion(
    project: Option<&Project>,
    tasks: &[Task],
    table: &SizeTable,
) -> Option<ProjectCompleted> {
    let project = project.filter(|project| project.is_active())?;
    let load = project_load(project.id, tasks, table);
    if load.total_tasks == 0 || load.remaining_tasks > 0 {
        return None;
    }
    Some(ProjectCompleted {
        project_id: project.id,
        name: project.name.clone(),
        planned_minutes: load.planned_minutes,
    })
}

/// Returns the archived form of `project`.
pub fn acknowledge(project: &Project) -> Project {
    Project {
        archived: true,
        ..project.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{acknowledge, detect_completion};
    use crate::model::project::Project;
    use crate::model::sizing::{SizeTable, TaskSize};
    use crate::model::task::Task;
    use chrono::NaiveDate;

    fn project() -> Project {
        let created = NaiveDate::from_ymd_opt(2026, 2, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid timestamp");
        let deadline = NaiveDate::from_ymd_opt(2026, 2, 20).expect("valid date");
        Project::new("Garden", "plant beds", deadline, created)
    }

    fn done(task: Task) -> Task {
        Task {
            completed: true,
            ..task
        }
    }

    #[test]
    fn fires_when_nothing_remains() {
        let p = project();
        let tasks = vec![
            done(Task::for_project(&p, "dig", TaskSize::Large)),
            done(Task::for_project(&p, "seed", TaskSize::Small)),
        ];
        let event = detect_completion(Some(&p), &tasks, &SizeTable::STANDARD)
            .expect("project should complete");
        assert_eq!(event.project_id, p.id);
        assert_eq!(event.name, "Garden");
        assert_eq!(event.planned_minutes, 100);
    }

    #[test]
    fn stays_silent_with_remaining_or_no_tasks() {
        let p = project();
        let tasks = vec![
            done(Task::for_project(&p, "dig", TaskSize::Large)),
            Task::for_project(&p, "seed", TaskSize::Small),
        ];
        assert!(detect_completion(Some(&p), &tasks, &SizeTable::STANDARD).is_none());
        assert!(detect_completion(Some(&p), &[], &SizeTable::STANDARD).is_none());
        assert!(detect_completion(None, &tasks, &SizeTable::STANDARD).is_none());
    }

    #[test]
    fn archived_project_never_fires() {
        let p = acknowledge(&project());
        let tasks = vec![done(Task::for_project(&p, "dig", TaskSize::Large))];
        assert!(p.archived);
        assert!(detect_completion(Some(&p), &tasks, &SizeTable::STANDARD).is_none());
    }
}
