//! Planner state repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Store the state bundle as one JSON value per key in `planner_state`.
//! - Store the reset/notify day markers apart, in `day_markers`.
//!
//! # Invariants
//! - An absent or unparseable key loads as its default and logs
//!   `event=state_load status=degraded`.
//! - `save_state` replaces every bundle key in one transaction.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::state::{DayMarkers, PlannerState};
use chrono::NaiveDate;
use log::warn;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DAY_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for planner state persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection has not been migrated to the expected schema.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// A value could not be encoded for storage.
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::Encode(err) => write!(f, "failed to encode planner state: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::UninitializedConnection { .. } | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Keys of the persisted state bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKey {
    Projects,
    Tasks,
    Streak,
    LastActiveDay,
    Settings,
    Checklist,
}

impl StateKey {
    pub const ALL: [StateKey; 6] = [
        StateKey::Projects,
        StateKey::Tasks,
        StateKey::Streak,
        StateKey::LastActiveDay,
        StateKey::Settings,
        StateKey::Checklist,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Tasks => "tasks",
            Self::Streak => "streak",
            Self::LastActiveDay => "lastActiveDay",
            Self::Settings => "settings",
            Self::Checklist => "checklist",
        }
    }
}

const LAST_RESET_DAY: &str = "lastResetDay";
const LAST_NOTIFY_DAY: &str = "lastNotifyDay";

/// Persistence contract for planner state.
pub trait StateRepository {
    /// Loads the whole state, degrading per key.
    fn load_state(&self) -> RepoResult<PlannerState>;
    /// Replaces the bundle keys (everything but reset/notify markers).
    fn save_state(&self, state: &PlannerState) -> RepoResult<()>;
    /// Replaces the reset/notify day markers.
    fn save_markers(&self, markers: &DayMarkers) -> RepoResult<()>;
}

/// SQLite-backed planner state repository.
pub struct SqliteStateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        for table in ["planner_state", "day_markers"] {
            ensure_table_exists(conn, table)?;
        }
        Ok(Self { conn })
    }

    fn load_key<T: DeserializeOwned>(&self, key: StateKey) -> RepoResult<Option<T>> {
        let raw = self
            .conn
            .query_row(
                "SELECT value FROM planner_state WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, Value>(0),
            )
            .optional()?;

        let text = match raw {
            None => return Ok(None),
            Some(Value::Text(text)) => text,
            Some(_) => {
                warn!(
                    "event=state_load module=repo status=degraded key={} reason=non_text_value",
                    key.as_str()
                );
                return Ok(None);
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(
                    "event=state_load module=repo status=degraded key={} reason=parse_failed line={} column={}",
                    key.as_str(),
                    err.line(),
                    err.column()
                );
                Ok(None)
            }
        }
    }

    fn load_marker(&self, name: &'static str) -> RepoResult<Option<NaiveDate>> {
        let raw = self
            .conn
            .query_row(
                "SELECT day FROM day_markers WHERE name = ?1;",
                [name],
                |row| row.get::<_, Value>(0),
            )
            .optional()?;

        match raw {
            Some(Value::Text(text)) => match NaiveDate::parse_from_str(&text, DAY_FORMAT) {
                Ok(day) => Ok(Some(day)),
                Err(_) => {
                    warn!(
                        "event=state_load module=repo status=degraded key={name} reason=invalid_day"
                    );
                    Ok(None)
                }
            },
            Some(Value::Null) | None => Ok(None),
            Some(_) => {
                warn!(
                    "event=state_load module=repo status=degraded key={name} reason=non_text_value"
                );
                Ok(None)
            }
        }
    }
}

impl StateRepository for SqliteStateRepository<'_> {
    fn load_state(&self) -> RepoResult<PlannerState> {
        Ok(PlannerState {
            projects: self.load_key(StateKey::Projects)?.unwrap_or_default(),
            tasks: self.load_key(StateKey::Tasks)?.unwrap_or_default(),
            streak: self.load_key(StateKey::Streak)?.unwrap_or_default(),
            settings: self.load_key(StateKey::Settings)?.unwrap_or_default(),
            checklist: self.load_key(StateKey::Checklist)?.unwrap_or_default(),
            markers: DayMarkers {
                last_active_day: self
                    .load_key::<Option<NaiveDate>>(StateKey::LastActiveDay)?
                    .flatten(),
                last_reset_day: self.load_marker(LAST_RESET_DAY)?,
                last_notify_day: self.load_marker(LAST_NOTIFY_DAY)?,
            },
        })
    }

    fn save_state(&self, state: &PlannerState) -> RepoResult<()> {
        let mut encoded = Vec::with_capacity(StateKey::ALL.len());
        for key in StateKey::ALL {
            encoded.push((key.as_str(), encode_key(state, key)?));
        }

        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in &encoded {
            tx.execute(
                "INSERT INTO planner_state (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn save_markers(&self, markers: &DayMarkers) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (name, day) in [
            (LAST_RESET_DAY, markers.last_reset_day),
            (LAST_NOTIFY_DAY, markers.last_notify_day),
        ] {
            tx.execute(
                "INSERT INTO day_markers (name, day) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET
                    day = excluded.day,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![name, day.map(|day| day.format(DAY_FORMAT).to_string())],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn encode_key(state: &PlannerState, key: StateKey) -> RepoResult<String> {
    let encoded = match key {
        StateKey::Projects => encode(&state.projects)?,
        StateKey::Tasks => encode(&state.tasks)?,
        StateKey::Streak => encode(&state.streak)?,
        StateKey::LastActiveDay => encode(&state.markers.last_active_day)?,
        StateKey::Settings => encode(&state.settings)?,
        StateKey::Checklist => encode(&state.checklist)?,
    };
    Ok(encoded)
}

fn encode<T: Serialize + ?Sized>(value: &T) -> RepoResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn ensure_table_exists(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::MissingRequiredTable(table));
    }
    Ok(())
}
