//! Export/import envelope.
//!
//! # Invariants
//! - Import is all-or-nothing: any parse failure or missing required key
//!   rejects the payload before state is touched.
//! - `projects` and `tasks` are required; `streak`, `settings` and
//!   `checklist` replace state only when present.
//! - Imported tasks are normalized so the slot invariant holds, then every
//!   entity is validated and ids must be unique per collection.

use crate::model::checklist::ChecklistItem;
use crate::model::project::Project;
use crate::model::settings::Settings;
use crate::model::sizing::{SizeTable, TaskSize};
use crate::model::state::PlannerState;
use crate::model::task::Task;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const REQUIRED_KEYS: [&str; 2] = ["projects", "tasks"];

#[derive(Debug, Serialize)]
struct ExportEnvelope<'a> {
    projects: &'a [Project],
    tasks: &'a [Task],
    streak: u32,
    settings: &'a Settings,
    checklist: &'a [ChecklistItem],
}

/// Import rejection reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Payload is not valid JSON, or a value has the wrong shape.
    Parse(String),
    /// Payload parsed but lacks required keys.
    MissingKeys(Vec<&'static str>),
    /// A project or task breaks an entity invariant.
    Invalid(ValidationError),
    /// Two entries of one collection share an id.
    DuplicateId(Uuid),
}

impl ImportError {
    /// Stable reason code for logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_failed",
            Self::MissingKeys(_) => "missing_keys",
            Self::Invalid(_) => "invalid_entity",
            Self::DuplicateId(_) => "duplicate_id",
        }
    }
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "import payload could not be parsed: {message}"),
            Self::MissingKeys(keys) => {
                write!(f, "import payload is missing keys: {}", keys.join(", "))
            }
            Self::Invalid(err) => write!(f, "import payload has an invalid entry: {err}"),
            Self::DuplicateId(id) => write!(f, "import payload repeats id {id}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ImportError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Parsed, not yet applied, import payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportPayload {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub streak: Option<u32>,
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub checklist: Option<Vec<ChecklistItem>>,
}

/// Serializes the exportable part of `state` to a text blob.
pub fn export_state(state: &PlannerState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ExportEnvelope {
        projects: &state.projects,
        tasks: &state.tasks,
        streak: state.streak,
        settings: &state.settings,
        checklist: &state.checklist,
    })
}

/// Parses an import blob.
///
/// # Errors
/// - `ImportError::Parse` when the text is not a JSON object or a present
///   key has the wrong shape.
/// - `ImportError::MissingKeys` when `projects` or `tasks` is absent.
pub fn parse_import(text: &str) -> Result<ImportPayload, ImportError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|err| ImportError::Parse(err.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ImportError::Parse("payload is not a JSON object".to_string()))?;

    let missing = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(ImportError::MissingKeys(missing));
    }

    serde_json::from_value(value).map_err(|err| ImportError::Parse(err.to_string()))
}

/// Validates every entity of a normalized payload.
///
/// # Errors
/// - `ImportError::Invalid` for the first project, task or checklist item
///   failing `validate()`.
/// - `ImportError::DuplicateId` when a project or task id repeats.
pub fn validate_payload(payload: &ImportPayload) -> Result<(), ImportError> {
    let mut project_ids = HashSet::with_capacity(payload.projects.len());
    for project in &payload.projects {
        project.validate()?;
        if !project_ids.insert(project.id) {
            return Err(ImportError::DuplicateId(project.id));
        }
    }

    let mut task_ids = HashSet::with_capacity(payload.tasks.len());
    for task in &payload.tasks {
        task.validate()?;
        if !task_ids.insert(task.id) {
            return Err(ImportError::DuplicateId(task.id));
        }
    }

    for item in payload.checklist.iter().flatten() {
        item.validate()?;
    }
    Ok(())
}

/// Drops today flags that would break the slot invariant.
///
/// Completed tasks lose the flag; beyond capacity, later tasks in list order
/// lose it. Returns the number of tasks demoted.
pub fn normalize_today_flags(tasks: &mut [Task], table: &SizeTable) -> usize {
    let mut taken: HashMap<TaskSize, usize> = HashMap::new();
    let mut demoted = 0;

    for task in tasks.iter_mut().filter(|task| task.is_today) {
        let keep = match table.rule(task.size) {
            Some(rule) if !task.completed => {
                let used = taken.entry(task.size).or_insert(0);
                if *used < rule.capacity {
                    *used += 1;
                    true
                } else {
                    false
                }
            }
            _ => false,
        };
        if !keep {
            task.is_today = false;
            demoted += 1;
        }
    }
    demoted
}

#[cfg(test)]
mod tests {
    use super::{normalize_today_flags, parse_import, validate_payload, ImportError};
    use crate::model::sizing::{SizeTable, TaskSize};
    use crate::model::task::Task;
    use crate::model::validation::ValidationError;
    use uuid::Uuid;

    #[test]
    fn distinguishes_parse_failure_from_missing_keys() {
        assert!(matches!(parse_import("{not json"), Err(ImportError::Parse(_))));
        assert!(matches!(parse_import("[1, 2]"), Err(ImportError::Parse(_))));
        assert_eq!(
            parse_import(r#"{"projects": []}"#),
            Err(ImportError::MissingKeys(vec!["tasks"]))
        );
        assert!(matches!(
            parse_import(r#"{"projects": 3, "tasks": []}"#),
            Err(ImportError::Parse(_))
        ));
    }

    #[test]
    fn optional_keys_may_be_absent() {
        let payload = parse_import(r#"{"projects": [], "tasks": []}"#).expect("minimal payload");
        assert!(payload.streak.is_none());
        assert!(payload.settings.is_none());
        assert!(payload.checklist.is_none());
    }

    #[test]
    fn normalization_enforces_capacity_in_list_order() {
        let project_id = Uuid::new_v4();
        let mut tasks = (0..3)
            .map(|i| {
                let mut task = Task::quick(format!("large {i}"));
                task.project_id = Some(project_id);
                task.size = TaskSize::Large;
                task.is_today = true;
                task
            })
            .collect::<Vec<_>>();
        tasks[0].completed = true;

        let demoted = normalize_today_flags(&mut tasks, &SizeTable::STANDARD);
        assert_eq!(demoted, 2);
        assert!(!tasks[0].is_today);
        assert!(tasks[1].is_today);
        assert!(!tasks[2].is_today);
    }

    #[test]
    fn validation_rejects_bad_scoping_and_repeated_ids() {
        let unscoped_large = r#"{"projects": [], "tasks": [
            {"id": "6f1c3a52-0d8e-4a55-9a36-2f6f0f2b7d01", "title": "stray", "size": "large"}
        ]}"#;
        let payload = parse_import(unscoped_large).expect("shape is valid");
        assert_eq!(
            validate_payload(&payload),
            Err(ImportError::Invalid(ValidationError::UnscopedTaskNotQuick))
        );

        let repeated = r#"{"projects": [], "tasks": [
            {"id": "6f1c3a52-0d8e-4a55-9a36-2f6f0f2b7d01", "title": "a", "size": "quick"},
            {"id": "6f1c3a52-0d8e-4a55-9a36-2f6f0f2b7d01", "title": "b", "size": "quick"}
        ]}"#;
        let payload = parse_import(repeated).expect("shape is valid");
        assert!(matches!(
            validate_payload(&payload),
            Err(ImportError::DuplicateId(_))
        ));

        let clean = parse_import(r#"{"projects": [], "tasks": []}"#).expect("minimal payload");
        assert_eq!(validate_payload(&clean), Ok(()));
    }
}
