//! Slot allocator for the daily 1-3-5 capacity.
//!
//! # Responsibility
//! - Decide whether a task may become a today-task.
//! - Summarize current slot usage for the today board.
//!
//! # Invariants
//! - For every slotted size, incomplete today-tasks never exceed capacity.
//! - Quick tasks are rejected outright and never counted.
//! - Occupancy is computed once from a single snapshot; the decision and the
//!   commit both use that snapshot.

use crate::model::sizing::{SizeTable, TaskSize};
use crate::model::task::Task;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reason a task could not enter today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// Every slot for this size is taken.
    SlotFull { size: TaskSize, capacity: usize },
    /// Quick tasks live outside slot accounting.
    QuickTask,
    /// Completed tasks cannot be scheduled.
    Completed,
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SlotFull { size, capacity } => write!(
                f,
                "today's {} slots are full ({capacity}/{capacity})",
                size.as_str()
            ),
            Self::QuickTask => write!(f, "quick tasks do not use daily slots"),
            Self::Completed => write!(f, "completed tasks cannot be scheduled for today"),
        }
    }
}

impl Error for SlotError {}

/// Count of incomplete today-tasks per slotted size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotOccupancy {
    large: usize,
    medium: usize,
    small: usize,
}

impl SlotOccupancy {
    /// Counts occupying tasks in one pass over `tasks`.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut occupancy = Self::default();
        for task in tasks.into_iter().filter(|task| task.occupies_slot()) {
            match task.size {
                TaskSize::Large => occupancy.large += 1,
                TaskSize::Medium => occupancy.medium += 1,
                TaskSize::Small => occupancy.small += 1,
                TaskSize::Quick => {}
            }
        }
        occupancy
    }

    pub fn count(&self, size: TaskSize) -> usize {
        match size {
            TaskSize::Large => self.large,
            TaskSize::Medium => self.medium,
            TaskSize::Small => self.small,
            TaskSize::Quick => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.large + self.medium + self.small
    }
}

/// Attempts to mark `task` as a today-task against a pre-computed occupancy.
///
/// Returns the updated task; the input is never mutated. Marking a task that
/// is already today is a no-op and does not re-check capacity.
///
/// # Errors
/// - `SlotError::QuickTask` for quick tasks.
/// - `SlotError::Completed` for completed tasks.
/// - `SlotError::SlotFull` when the size is at capacity.
pub fn try_mark_today(
    task: &Task,
    occupancy: &SlotOccupancy,
    table: &SizeTable,
) -> Result<Task, SlotError> {
    let rule = table.rule(task.size).ok_or(SlotError::QuickTask)?;
    if task.completed {
        return Err(SlotError::Completed);
    }
    if task.is_today {
        return Ok(task.clone());
    }
    if occupancy.count(task.size) >= rule.capacity {
        return Err(SlotError::SlotFull {
            size: task.size,
            capacity: rule.capacity,
        });
    }
    Ok(Task {
        is_today: true,
        ..task.clone()
    })
}

/// Releases a task's slot. Always succeeds; unmarking twice is a no-op.
pub fn unmark_today(task: &Task) -> Task {
    Task {
        is_today: false,
        ..task.clone()
    }
}

/// Per-size usage row of the today board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotUsage {
    pub size: TaskSize,
    pub used: usize,
    pub capacity: usize,
}

/// Snapshot of the day's slot usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayBoard {
    pub rows: Vec<SlotUsage>,
    pub used: usize,
    pub capacity: usize,
    /// `round(used / capacity * 100)`.
    pub energy_percent: u32,
}

/// Builds the today board from a task snapshot.
pub fn today_board<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    table: &SizeTable,
) -> TodayBoard {
    let occupancy = SlotOccupancy::from_tasks(tasks);
    let rows = TaskSize::SLOTTED
        .iter()
        .filter_map(|&size| {
            table.rule(size).map(|rule| SlotUsage {
                size,
                used: occupancy.count(size),
                capacity: rule.capacity,
            })
        })
        .collect::<Vec<_>>();
    let capacity = table.total_capacity();
    let used = occupancy.total();
    let energy_percent = if capacity == 0 {
        0
    } else {
        ((used as f64 / capacity as f64) * 100.0).round() as u32
    };

    TodayBoard {
        rows,
        used,
        capacity,
        energy_percent,
    }
}
