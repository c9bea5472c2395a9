//! Core domain logic for the 1-3-5 planner.
//! This crate is the single source of truth for slot, clock, urgency and
//! streak invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::checklist::{ChecklistItem, ChecklistItemId};
pub use model::project::{Project, ProjectId};
pub use model::settings::{ResetTime, Settings, SettingsError};
pub use model::sizing::{format_duration, SizeRule, SizeTable, TaskSize};
pub use model::state::{DayMarkers, PlannerState};
pub use model::task::{Task, TaskId};
pub use model::validation::ValidationError;
pub use repo::state_repo::{
    RepoError, RepoResult, SqliteStateRepository, StateKey, StateRepository,
};
pub use schedule::clock::{ClockEffect, ClockTick};
pub use schedule::lifecycle::ProjectCompleted;
pub use schedule::slots::{SlotError, SlotOccupancy, SlotUsage, TodayBoard};
pub use schedule::streak::DayTransition;
pub use schedule::urgency::{ProjectLoad, RankedProject, Severity};
pub use service::notify::{Notifier, REMINDER_MESSAGE};
pub use service::planner_service::{ImportSummary, PlannerError, PlannerService};
pub use service::transfer::{ImportError, ImportPayload};
