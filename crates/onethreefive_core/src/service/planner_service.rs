//! Planner use-case service.
//!
//! # Responsibility
//! - Apply user actions and clock ticks to the in-memory planner state.
//! - Persist the state after every mutation through `StateRepository`.
//!
//! # Invariants
//! - Every mutation decides against one snapshot and commits by
//!   whole-object replacement.
//! - Persistence and reminder delivery are fire-and-forget: failures are
//!   logged and never undo or fail the action that caused them.
//! - Project deletion cascades unconditionally; confirmation is the
//!   caller's job.

use crate::model::checklist::{ChecklistItem, ChecklistItemId};
use crate::model::project::{Project, ProjectId};
use crate::model::settings::{ResetTime, Settings, SettingsError};
use crate::model::sizing::{SizeTable, TaskSize};
use crate::model::state::{DayMarkers, PlannerState};
use crate::model::task::{Task, TaskId};
use crate::model::validation::ValidationError;
use crate::repo::state_repo::{RepoError, StateRepository};
use crate::schedule::clock::{self, ClockEffect, ClockTick};
use crate::schedule::lifecycle::{self, ProjectCompleted};
use crate::schedule::slots::{self, SlotError, SlotOccupancy, TodayBoard};
use crate::schedule::streak;
use crate::schedule::urgency::{self, ProjectLoad, RankedProject};
use crate::service::notify::{Notifier, REMINDER_MESSAGE};
use crate::service::transfer::{self, ImportError, ImportPayload};
use chrono::{NaiveDate, NaiveDateTime};
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from planner service operations.
#[derive(Debug)]
pub enum PlannerError {
    Validation(ValidationError),
    /// Task could not enter today; state is unchanged.
    Slot(SlotError),
    Settings(SettingsError),
    /// Import rejected; state is unchanged.
    Import(ImportError),
    ProjectNotFound(ProjectId),
    TaskNotFound(TaskId),
    ChecklistItemNotFound(ChecklistItemId),
    /// Reorder ids are not exactly the scope's task set.
    InvalidReorder,
    /// State could not be serialized for export.
    Export(serde_json::Error),
    Repo(RepoError),
}

impl Display for PlannerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Slot(err) => write!(f, "{err}"),
            Self::Settings(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ChecklistItemNotFound(id) => write!(f, "checklist item not found: {id}"),
            Self::InvalidReorder => {
                write!(f, "reorder must list every task of the scope exactly once")
            }
            Self::Export(err) => write!(f, "failed to export planner state: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlannerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Slot(err) => Some(err),
            Self::Settings(err) => Some(err),
            Self::Import(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for PlannerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SlotError> for PlannerError {
    fn from(value: SlotError) -> Self {
        Self::Slot(value)
    }
}

impl From<SettingsError> for PlannerError {
    fn from(value: SettingsError) -> Self {
        Self::Settings(value)
    }
}

impl From<ImportError> for PlannerError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<RepoError> for PlannerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// What an accepted import replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub projects: usize,
    pub tasks: usize,
    /// Today flags dropped to keep slot capacity.
    pub demoted_today: usize,
}

/// Planner facade over a state repository and a notification host.
pub struct PlannerService<R: StateRepository, N: Notifier> {
    repo: R,
    notifier: N,
    table: SizeTable,
    state: PlannerState,
}

impl<R: StateRepository, N: Notifier> PlannerService<R, N> {
    /// Loads persisted state and builds the service with the standard table.
    pub fn load(repo: R, notifier: N) -> Result<Self, PlannerError> {
        let state = repo.load_state()?;
        info!(
            "event=state_load module=service status=ok projects={} tasks={} streak={}",
            state.projects.len(),
            state.tasks.len(),
            state.streak
        );
        Ok(Self {
            repo,
            notifier,
            table: SizeTable::STANDARD,
            state,
        })
    }

    /// Replaces the size table used for slots and urgency.
    pub fn with_size_table(mut self, table: SizeTable) -> Self {
        self.table = table;
        self
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn size_table(&self) -> &SizeTable {
        &self.table
    }

    // Projects

    /// Creates an active project.
    pub fn add_project(
        &mut self,
        name: impl Into<String>,
        goal: impl Into<String>,
        deadline: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Project, PlannerError> {
        let project = Project::new(name.into().trim(), goal.into().trim(), deadline, now);
        project.validate()?;
        self.state.projects.push(project.clone());
        self.persist();
        Ok(project)
    }

    /// Hard-deletes a project and every task referencing it.
    ///
    /// Returns the number of tasks removed.
    pub fn delete_project(&mut self, project_id: ProjectId) -> Result<usize, PlannerError> {
        self.require_project(project_id)?;
        let before = self.state.tasks.len();
        self.state.projects.retain(|project| project.id != project_id);
        self.state.tasks.retain(|task| !task.belongs_to(project_id));
        let removed = before - self.state.tasks.len();
        info!(
            "event=project_delete module=service status=ok project_id={} removed_tasks={}",
            project_id, removed
        );
        self.persist();
        Ok(removed)
    }

    /// Archives a completed project. Tasks and history are kept.
    pub fn acknowledge_completion(
        &mut self,
        project_id: ProjectId,
    ) -> Result<Project, PlannerError> {
        let archived = lifecycle::acknowledge(self.require_project(project_id)?);
        self.state.replace_project(archived.clone());
        info!(
            "event=project_archive module=service status=ok project_id={}",
            project_id
        );
        self.persist();
        Ok(archived)
    }

    /// Remaining and planned work of one project.
    pub fn project_load(&self, project_id: ProjectId) -> Result<ProjectLoad, PlannerError> {
        self.require_project(project_id)?;
        Ok(urgency::project_load(project_id, &self.state.tasks, &self.table))
    }

    /// Active projects ranked by urgency at `now`; archived ones are excluded.
    pub fn ranked_projects(&self, now: NaiveDateTime) -> Vec<RankedProject> {
        urgency::rank_projects(&self.state.projects, &self.state.tasks, now, &self.table)
    }

    // Tasks

    /// Adds a sized task to a project.
    pub fn add_task(
        &mut self,
        project_id: ProjectId,
        title: impl Into<String>,
        size: TaskSize,
    ) -> Result<Task, PlannerError> {
        let project = self.require_project(project_id)?;
        let task = Task::for_project(project, title.into().trim(), size);
        task.validate()?;
        self.state.tasks.push(task.clone());
        self.persist();
        Ok(task)
    }

    /// Adds a standalone quick task.
    pub fn add_quick_task(&mut self, title: impl Into<String>) -> Result<Task, PlannerError> {
        let task = Task::quick(title.into().trim());
        task.validate()?;
        self.state.tasks.push(task.clone());
        self.persist();
        Ok(task)
    }

    pub fn delete_task(&mut self, task_id: TaskId) -> Result<(), PlannerError> {
        self.require_task(task_id)?;
        self.state.tasks.retain(|task| task.id != task_id);
        self.persist();
        Ok(())
    }

    /// Marks a task for today, subject to slot capacity.
    ///
    /// # Errors
    /// - `PlannerError::Slot` when the size is full, the task is quick, or it
    ///   is completed. The task is left unchanged.
    pub fn mark_today(&mut self, task_id: TaskId) -> Result<Task, PlannerError> {
        let task = self.require_task(task_id)?;
        let occupancy = SlotOccupancy::from_tasks(&self.state.tasks);
        let updated = match slots::try_mark_today(task, &occupancy, &self.table) {
            Ok(updated) => updated,
            Err(err) => {
                info!(
                    "event=task_today module=service status=rejected task_id={} size={} reason={:?}",
                    task_id,
                    task.size.as_str(),
                    err
                );
                return Err(err.into());
            }
        };
        self.commit_task(updated)
    }

    /// Releases a task's today slot. Always succeeds for existing tasks.
    pub fn unmark_today(&mut self, task_id: TaskId) -> Result<Task, PlannerError> {
        let updated = slots::unmark_today(self.require_task(task_id)?);
        self.commit_task(updated)
    }

    /// Flips the today flag, checking capacity only when marking.
    pub fn toggle_today(&mut self, task_id: TaskId) -> Result<Task, PlannerError> {
        if self.require_task(task_id)?.is_today {
            self.unmark_today(task_id)
        } else {
            self.mark_today(task_id)
        }
    }

    /// Completes a task and reports project completion, if any.
    ///
    /// Completing an already completed task changes nothing and reports no
    /// event.
    pub fn complete_task(
        &mut self,
        task_id: TaskId,
        now: NaiveDateTime,
    ) -> Result<Option<ProjectCompleted>, PlannerError> {
        let task = self.require_task(task_id)?;
        if task.completed {
            return Ok(None);
        }
        let completed = task.as_completed(now);
        let project_id = completed.project_id;
        self.state.replace_task(completed);
        info!("event=task_complete module=service status=ok task_id={}", task_id);

        let event = project_id.and_then(|project_id| {
            lifecycle::detect_completion(
                self.state.project(project_id),
                &self.state.tasks,
                &self.table,
            )
        });
        if let Some(event) = &event {
            info!(
                "event=project_completed module=service status=ok project_id={} planned_minutes={}",
                event.project_id, event.planned_minutes
            );
        }
        self.persist();
        Ok(event)
    }

    /// Reorders one scope's tasks (a project, or the quick bucket for
    /// `None`).
    ///
    /// The scope's tasks move to the front in the given order; all other
    /// tasks follow in their previous order.
    pub fn reorder_tasks(
        &mut self,
        scope: Option<ProjectId>,
        ordered_ids: &[TaskId],
    ) -> Result<(), PlannerError> {
        let scope_ids = self
            .state
            .tasks
            .iter()
            .filter(|task| task.project_id == scope)
            .map(|task| task.id)
            .collect::<HashSet<_>>();
        let requested = ordered_ids.iter().copied().collect::<HashSet<_>>();
        if requested.len() != ordered_ids.len() || requested != scope_ids {
            return Err(PlannerError::InvalidReorder);
        }

        let mut reordered = Vec::with_capacity(self.state.tasks.len());
        for id in ordered_ids {
            if let Some(task) = self.state.task(*id) {
                reordered.push(task.clone());
            }
        }
        reordered.extend(
            self.state
                .tasks
                .iter()
                .filter(|task| task.project_id != scope)
                .cloned(),
        );
        self.state.tasks = reordered;
        self.persist();
        Ok(())
    }

    /// Today board for the current state.
    pub fn today_board(&self) -> TodayBoard {
        slots::today_board(&self.state.tasks, &self.table)
    }

    // Settings

    /// Replaces settings after validating the reset time.
    ///
    /// Enabling notifications without host permission stores them disabled.
    pub fn update_settings(&mut self, settings: Settings) -> Result<Settings, PlannerError> {
        let reset = ResetTime::parse(&settings.reset_time)?;
        let mut next = Settings {
            reset_time: reset.to_string(),
            enable_notify: settings.enable_notify,
        };
        if next.enable_notify && !self.notifier.permission_granted() {
            warn!("event=notify_permission module=service status=denied");
            next.enable_notify = false;
        }
        self.state.settings = next.clone();
        self.persist();
        Ok(next)
    }

    /// Turns reminders on or off. Returns the stored flag.
    pub fn set_notifications(&mut self, enabled: bool) -> bool {
        let granted = !enabled || self.notifier.permission_granted();
        if !granted {
            warn!("event=notify_permission module=service status=denied");
        }
        self.state.settings.enable_notify = enabled && granted;
        self.persist();
        self.state.settings.enable_notify
    }

    // Clock

    /// Runs one clock tick at `now` and applies its effects.
    pub fn tick(&mut self, now: NaiveDateTime) -> ClockTick {
        let outcome = clock::tick(
            now,
            &self.state.settings,
            self.state.markers,
            &self.state.tasks,
        );
        if let Some(err) = &outcome.settings_error {
            warn!(
                "event=clock_tick module=service status=skipped reason=invalid_settings error={}",
                err
            );
        }

        let mut state_changed =
            outcome.markers.last_active_day != self.state.markers.last_active_day;
        for effect in &outcome.effects {
            match effect {
                ClockEffect::DayRollover { transition } => {
                    let before = self.state.streak;
                    self.state.streak = streak::advance(before, *transition);
                    info!(
                        "event=day_rollover module=service status=ok transition={:?} streak_before={} streak_after={}",
                        transition, before, self.state.streak
                    );
                }
                ClockEffect::ResetToday { task_ids } => {
                    for task_id in task_ids {
                        if let Some(task) = self.state.task(*task_id) {
                            let released = slots::unmark_today(task);
                            self.state.replace_task(released);
                        }
                    }
                    info!(
                        "event=clock_tick module=service status=ok action=reset cleared={}",
                        task_ids.len()
                    );
                    state_changed = true;
                }
                ClockEffect::Remind { pending } => {
                    if self.notifier.permission_granted() {
                        self.notifier.show_reminder(REMINDER_MESSAGE);
                        info!(
                            "event=clock_tick module=service status=ok action=remind pending={}",
                            pending
                        );
                    } else {
                        warn!("event=notify_permission module=service status=denied");
                        self.state.settings.enable_notify = false;
                        state_changed = true;
                    }
                }
            }
        }

        let markers_changed = !same_daily_markers(&outcome.markers, &self.state.markers);
        self.state.markers = outcome.markers;
        if state_changed {
            self.persist();
        }
        if markers_changed {
            self.persist_markers();
        }
        outcome
    }

    /// Runs one tick at the local wall-clock time.
    pub fn tick_now(&mut self) -> ClockTick {
        self.tick(chrono::Local::now().naive_local())
    }

    // Transfer

    /// Serializes projects, tasks, streak, settings and checklist.
    pub fn export(&self) -> Result<String, PlannerError> {
        transfer::export_state(&self.state).map_err(PlannerError::Export)
    }

    /// Replaces state from an export blob, all-or-nothing.
    pub fn import(&mut self, text: &str) -> Result<ImportSummary, PlannerError> {
        let (payload, demoted_today) = match self.prepare_import(text) {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(
                    "event=import module=service status=rejected reason={}",
                    err.reason()
                );
                return Err(err.into());
            }
        };
        let summary = ImportSummary {
            projects: payload.projects.len(),
            tasks: payload.tasks.len(),
            demoted_today,
        };

        self.state.projects = payload.projects;
        self.state.tasks = payload.tasks;
        if let Some(streak) = payload.streak {
            self.state.streak = streak;
        }
        if let Some(settings) = payload.settings {
            self.state.settings = settings;
        }
        if let Some(checklist) = payload.checklist {
            self.state.checklist = checklist;
        }
        info!(
            "event=import module=service status=ok projects={} tasks={} demoted_today={}",
            summary.projects, summary.tasks, summary.demoted_today
        );
        self.persist();
        Ok(summary)
    }

    fn prepare_import(&self, text: &str) -> Result<(ImportPayload, usize), ImportError> {
        let mut payload = transfer::parse_import(text)?;
        let demoted = transfer::normalize_today_flags(&mut payload.tasks, &self.table);
        transfer::validate_payload(&payload)?;
        Ok((payload, demoted))
    }

    // Checklist

    pub fn add_checklist_item(
        &mut self,
        text: impl Into<String>,
    ) -> Result<ChecklistItem, PlannerError> {
        let item = ChecklistItem::new(text.into().trim());
        item.validate()?;
        self.state.checklist.push(item.clone());
        self.persist();
        Ok(item)
    }

    pub fn toggle_checklist_item(
        &mut self,
        id: ChecklistItemId,
    ) -> Result<ChecklistItem, PlannerError> {
        let item = self
            .state
            .checklist
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(PlannerError::ChecklistItemNotFound(id))?;
        item.done = !item.done;
        let toggled = item.clone();
        self.persist();
        Ok(toggled)
    }

    pub fn remove_checklist_item(&mut self, id: ChecklistItemId) -> Result<(), PlannerError> {
        let before = self.state.checklist.len();
        self.state.checklist.retain(|item| item.id != id);
        if self.state.checklist.len() == before {
            return Err(PlannerError::ChecklistItemNotFound(id));
        }
        self.persist();
        Ok(())
    }

    fn require_project(&self, project_id: ProjectId) -> Result<&Project, PlannerError> {
        self.state
            .project(project_id)
            .ok_or(PlannerError::ProjectNotFound(project_id))
    }

    fn require_task(&self, task_id: TaskId) -> Result<&Task, PlannerError> {
        self.state
            .task(task_id)
            .ok_or(PlannerError::TaskNotFound(task_id))
    }

    fn commit_task(&mut self, updated: Task) -> Result<Task, PlannerError> {
        let task_id = updated.id;
        if !self.state.replace_task(updated.clone()) {
            return Err(PlannerError::TaskNotFound(task_id));
        }
        info!(
            "event=task_today module=service status=ok task_id={} is_today={}",
            task_id, updated.is_today
        );
        self.persist();
        Ok(updated)
    }

    fn persist(&self) {
        if let Err(err) = self.repo.save_state(&self.state) {
            error!("event=state_save module=service status=error error={}", err);
        }
    }

    fn persist_markers(&self) {
        if let Err(err) = self.repo.save_markers(&self.state.markers) {
            error!(
                "event=state_save module=service status=error target=day_markers error={}",
                err
            );
        }
    }
}

fn same_daily_markers(left: &DayMarkers, right: &DayMarkers) -> bool {
    left.last_reset_day == right.last_reset_day && left.last_notify_day == right.last_notify_day
}
