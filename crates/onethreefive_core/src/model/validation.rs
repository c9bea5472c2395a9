//! Write-path validation errors for planner entities.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Entity invariant violated on a write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Project name is blank after trim.
    BlankProjectName,
    /// Task title is blank after trim.
    BlankTaskTitle,
    /// Quick tasks must live in the unscoped bucket.
    QuickTaskInProject,
    /// Project-bound tasks must be large, medium or small.
    UnscopedTaskNotQuick,
    /// A completed task must never carry the today flag.
    CompletedTaskMarkedToday,
    /// Checklist item text is blank after trim.
    BlankChecklistText,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankProjectName => write!(f, "project name must not be blank"),
            Self::BlankTaskTitle => write!(f, "task title must not be blank"),
            Self::QuickTaskInProject => write!(f, "quick tasks cannot belong to a project"),
            Self::UnscopedTaskNotQuick => {
                write!(f, "tasks outside a project must use the quick size")
            }
            Self::CompletedTaskMarkedToday => {
                write!(f, "completed task cannot be marked for today")
            }
            Self::BlankChecklistText => write!(f, "checklist item text must not be blank"),
        }
    }
}

impl Error for ValidationError {}
