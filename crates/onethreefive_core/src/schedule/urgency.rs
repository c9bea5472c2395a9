//! Project urgency scoring.
//!
//! Urgency is the daily focus time, in hours, needed to finish a project's
//! remaining work by its deadline:
//! `(remaining_minutes / 60) / max(MIN_DAYS_LEFT, days_left)`.
//!
//! # Invariants
//! - Zero remaining minutes means zero urgency, whatever the deadline.
//! - Quick tasks never contribute.
//! - The scorer does not know about archival. `rank_projects` is the only
//!   list builder and it drops archived projects before scoring.

use crate::model::project::{Project, ProjectId};
use crate::model::sizing::SizeTable;
use crate::model::task::Task;
use chrono::NaiveDateTime;

/// Floor on days left, so same-day and past-due deadlines stay finite.
pub const MIN_DAYS_LEFT: f64 = 0.1;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Discrete presentation tier for an urgency score.
///
/// Boundaries are presentation policy and may be tuned freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Relaxed,
    Normal,
    Elevated,
    Urgent,
    Critical,
}

impl Severity {
    pub fn classify(urgency: f64) -> Self {
        if urgency >= 3.0 {
            Self::Critical
        } else if urgency >= 1.5 {
            Self::Urgent
        } else if urgency >= 0.8 {
            Self::Elevated
        } else if urgency >= 0.3 {
            Self::Normal
        } else {
            Self::Relaxed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Normal => "normal",
            Self::Elevated => "elevated",
            Self::Urgent => "urgent",
            Self::Critical => "critical",
        }
    }
}

/// Remaining work of one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectLoad {
    /// Incomplete slotted tasks.
    pub remaining_tasks: usize,
    pub remaining_minutes: u32,
    /// All slotted tasks, completed or not.
    pub planned_minutes: u32,
    pub total_tasks: usize,
}

/// Sums remaining and planned minutes for `project_id` over `tasks`.
pub fn project_load<'a>(
    project_id: ProjectId,
    tasks: impl IntoIterator<Item = &'a Task>,
    table: &SizeTable,
) -> ProjectLoad {
    tasks
        .into_iter()
        .filter(|task| task.belongs_to(project_id) && task.size.is_slotted())
        .fold(ProjectLoad::default(), |mut load, task| {
            let minutes = table.minutes(task.size);
            load.total_tasks += 1;
            load.planned_minutes += minutes;
            if task.is_remaining_work() {
                load.remaining_tasks += 1;
                load.remaining_minutes += minutes;
            }
            load
        })
}

/// Fractional days from `now` until the start of the deadline day, floored
/// at `MIN_DAYS_LEFT`.
pub fn days_left(project: &Project, now: NaiveDateTime) -> f64 {
    let deadline = project.deadline.and_time(chrono::NaiveTime::MIN);
    let millis = (deadline - now).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).max(MIN_DAYS_LEFT)
}

/// Urgency from already-computed inputs.
pub fn urgency_from(remaining_minutes: u32, days_left: f64) -> f64 {
    if remaining_minutes == 0 {
        return 0.0;
    }
    (f64::from(remaining_minutes) / 60.0) / days_left.max(MIN_DAYS_LEFT)
}

/// Scores one project. Does not check archival.
pub fn score(project: &Project, tasks: &[Task], now: NaiveDateTime, table: &SizeTable) -> f64 {
    let load = project_load(project.id, tasks, table);
    urgency_from(load.remaining_minutes, days_left(project, now))
}

/// One entry of the ranked project list.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedProject {
    pub project_id: ProjectId,
    pub urgency: f64,
    pub severity: Severity,
    pub load: ProjectLoad,
}

/// Ranks active projects by urgency, most urgent first.
///
/// Archived projects are excluded here. Ties keep project list order.
pub fn rank_projects(
    projects: &[Project],
    tasks: &[Task],
    now: NaiveDateTime,
    table: &SizeTable,
) -> Vec<RankedProject> {
    let mut ranked = projects
        .iter()
        .filter(|project| project.is_active())
        .map(|project| {
            let load = project_load(project.id, tasks, table);
            let urgency = urgency_from(load.remaining_minutes, days_left(project, now));
            RankedProject {
                project_id: project.id,
                urgency,
                severity: Severity::classify(urgency),
                load,
            }
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.urgency.total_cmp(&a.urgency));
    ranked
}

#[cfg(test)]
mod tests {
    use super::{rank_projects, score, urgency_from, Severity, MIN_DAYS_LEFT};
    use crate::model::project::Project;
    use crate::model::sizing::{SizeTable, TaskSize};
    use crate::model::task::Task;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid timestamp")
    }

    fn project_due(day: u32) -> Project {
        let deadline = NaiveDate::from_ymd_opt(2026, 5, day).expect("valid date");
        Project::new("p", "", deadline, at(2026, 5, 1, 8, 0))
    }

    #[test]
    fn zero_remaining_is_never_urgent() {
        assert_eq!(urgency_from(0, MIN_DAYS_LEFT), 0.0);

        let project = project_due(1);
        let mut done = Task::for_project(&project, "done", TaskSize::Large);
        done.completed = true;
        let now = at(2026, 5, 3, 12, 0);
        assert_eq!(score(&project, &[done], now, &SizeTable::STANDARD), 0.0);
    }

    #[test]
    fn one_large_task_due_tomorrow_is_urgent() {
        let project = project_due(11);
        let tasks = vec![Task::for_project(&project, "write", TaskSize::Large)];
        let urgency = score(&project, &tasks, at(2026, 5, 10, 0, 0), &SizeTable::STANDARD);
        assert!((urgency - 1.5).abs() < 1e-9);
        assert_eq!(Severity::classify(urgency), Severity::Urgent);
    }

    #[test]
    fn past_due_deadline_uses_floor() {
        let project = project_due(2);
        let tasks = vec![Task::for_project(&project, "late", TaskSize::Small)];
        let urgency = score(&project, &tasks, at(2026, 5, 9, 0, 0), &SizeTable::STANDARD);
        assert!((urgency - (10.0 / 60.0) / MIN_DAYS_LEFT).abs() < 1e-9);
    }

    #[test]
    fn urgency_is_monotonic_in_minutes_and_days() {
        assert!(urgency_from(60, 2.0) <= urgency_from(90, 2.0));
        assert!(urgency_from(90, 3.0) <= urgency_from(90, 2.0));
        assert!(urgency_from(90, 0.01) <= urgency_from(90, MIN_DAYS_LEFT) + 1e-12);
    }

    #[test]
    fn quick_tasks_carry_no_weight() {
        let project = project_due(20);
        let mut stray = Task::quick("milk");
        stray.project_id = Some(project.id);
        let urgency = score(&project, &[stray], at(2026, 5, 10, 0, 0), &SizeTable::STANDARD);
        assert_eq!(urgency, 0.0);
    }

    #[test]
    fn ranking_skips_archived_and_sorts_descending() {
        let soon = project_due(11);
        let later = project_due(20);
        let mut archived = project_due(10);
        archived.archived = true;
        let tasks = vec![
            Task::for_project(&later, "a", TaskSize::Large),
            Task::for_project(&soon, "b", TaskSize::Large),
            Task::for_project(&archived, "c", TaskSize::Large),
        ];

        let ranked = rank_projects(
            &[later.clone(), archived.clone(), soon.clone()],
            &tasks,
            at(2026, 5, 10, 0, 0),
            &SizeTable::STANDARD,
        );
        let ids = ranked.iter().map(|r| r.project_id).collect::<Vec<_>>();
        assert_eq!(ids, vec![soon.id, later.id]);
        assert_eq!(ranked[0].load.remaining_minutes, 90);
    }
}
