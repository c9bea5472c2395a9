//! Project domain model.
//!
//! # Invariants
//! - `id` is stable for the project lifetime.
//! - Archiving never deletes tasks; only explicit deletion cascades.

use crate::model::validation::ValidationError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable project identifier.
pub type ProjectId = Uuid;

/// Deadline-bound container of sized tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Free-form goal statement.
    #[serde(default)]
    pub goal: String,
    /// Calendar day the project is due.
    pub deadline: NaiveDate,
    pub created_at: NaiveDateTime,
    /// Set once the user acknowledges completion.
    #[serde(default)]
    pub archived: bool,
}

impl Project {
    /// Creates an active project with a generated id.
    pub fn new(
        name: impl Into<String>,
        goal: impl Into<String>,
        deadline: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            goal: goal.into(),
            deadline,
            created_at,
            archived: false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankProjectName);
        }
        Ok(())
    }

    /// Returns whether this project takes part in urgency ranking.
    pub fn is_active(&self) -> bool {
        !self.archived
    }
}
