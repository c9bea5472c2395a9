//! Daily clock: one pure tick driving rollover, reset and reminder.
//!
//! # Responsibility
//! - Map `(now, settings, markers, tasks)` to the effects due at `now` and
//!   the updated day markers. The caller applies effects and persists.
//!
//! # Invariants
//! - Reset fires at most once per reset day, on the first tick inside
//!   `[reset, reset + RESET_TOLERANCE_MINUTES)`.
//! - Reminder fires at most once per reset day, inside the
//!   `NOTIFY_LEAD_MINUTES` before reset, and only with pending today-tasks.
//! - Windows that wrap midnight are keyed to one calendar day, so a wrapped
//!   window still fires once.
//! - Unparseable settings skip reset and reminder for the tick; rollover
//!   detection does not depend on settings and still runs.

use crate::model::settings::{Settings, SettingsError, MINUTES_PER_DAY};
use crate::model::state::DayMarkers;
use crate::model::task::{Task, TaskId};
use crate::schedule::streak::DayTransition;
use chrono::{NaiveDate, NaiveDateTime, Timelike};

pub const RESET_TOLERANCE_MINUTES: u32 = 5;
pub const NOTIFY_LEAD_MINUTES: u32 = 30;

/// Effect due at a tick, to be applied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockEffect {
    /// Calendar day changed since the last active day.
    DayRollover { transition: DayTransition },
    /// Clear the today flag of these incomplete tasks.
    ResetToday { task_ids: Vec<TaskId> },
    /// Show one reminder; `pending` today-tasks are still open.
    Remind { pending: usize },
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTick {
    pub effects: Vec<ClockEffect>,
    pub markers: DayMarkers,
    /// Set when reset/reminder were skipped because settings are malformed.
    pub settings_error: Option<SettingsError>,
}

/// Evaluates the clock at `now`.
pub fn tick(
    now: NaiveDateTime,
    settings: &Settings,
    markers: DayMarkers,
    tasks: &[Task],
) -> ClockTick {
    let today = now.date();
    let mut next = markers;
    let mut effects = Vec::new();

    let transition = DayTransition::between(markers.last_active_day, today);
    if transition.is_day_change() {
        effects.push(ClockEffect::DayRollover { transition });
    }
    next.last_active_day = Some(today);

    let reset = match settings.parsed_reset_time() {
        Ok(reset) => reset.minute_of_day(),
        Err(err) => {
            return ClockTick {
                effects,
                markers: next,
                settings_error: Some(err),
            };
        }
    };
    let minute = now.hour() * 60 + now.minute();
    let open_today = tasks
        .iter()
        .filter(|task| task.is_today && !task.completed)
        .collect::<Vec<_>>();

    if minutes_since(reset, minute) < RESET_TOLERANCE_MINUTES {
        // Window opened yesterday when it wraps past midnight.
        let reset_day = if minute >= reset {
            today
        } else {
            previous_day(today)
        };
        if markers.last_reset_day != Some(reset_day) {
            effects.push(ClockEffect::ResetToday {
                task_ids: open_today.iter().map(|task| task.id).collect(),
            });
            next.last_reset_day = Some(reset_day);
        }
    }

    let notify_start = (reset + MINUTES_PER_DAY - NOTIFY_LEAD_MINUTES) % MINUTES_PER_DAY;
    if settings.enable_notify && minutes_since(notify_start, minute) < NOTIFY_LEAD_MINUTES {
        // Keyed to the day of the reset this window leads up to.
        let reset_day = if minute < reset {
            today
        } else {
            next_day(today)
        };
        if !open_today.is_empty() && markers.last_notify_day != Some(reset_day) {
            effects.push(ClockEffect::Remind {
                pending: open_today.len(),
            });
            next.last_notify_day = Some(reset_day);
        }
    }

    ClockTick {
        effects,
        markers: next,
        settings_error: None,
    }
}

/// Minutes elapsed from `start` to `minute`, wrapping at midnight.
fn minutes_since(start: u32, minute: u32) -> u32 {
    (minute + MINUTES_PER_DAY - start) % MINUTES_PER_DAY
}

fn previous_day(day: NaiveDate) -> NaiveDate {
    day.pred_opt().unwrap_or(day)
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day.succ_opt().unwrap_or(day)
}

#[cfg(test)]
mod tests {
    use super::{tick, ClockEffect, ClockTick};
    use crate::model::project::Project;
    use crate::model::settings::Settings;
    use crate::model::sizing::TaskSize;
    use crate::model::state::DayMarkers;
    use crate::model::task::Task;
    use crate::schedule::streak::DayTransition;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).expect("valid date")
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, m, 0).expect("valid time")
    }

    fn settings(reset: &str, notify: bool) -> Settings {
        Settings {
            reset_time: reset.to_string(),
            enable_notify: notify,
        }
    }

    fn today_tasks() -> Vec<Task> {
        let project = Project::new("p", "", day(30), at(1, 8, 0));
        let mut open = Task::for_project(&project, "open", TaskSize::Medium);
        open.is_today = true;
        let idle = Task::for_project(&project, "idle", TaskSize::Small);
        vec![open, idle]
    }

    fn active(d: u32) -> DayMarkers {
        DayMarkers {
            last_active_day: Some(day(d)),
            ..DayMarkers::default()
        }
    }

    fn resets(outcome: &ClockTick) -> usize {
        outcome
            .effects
            .iter()
            .filter(|effect| matches!(effect, ClockEffect::ResetToday { .. }))
            .count()
    }

    fn reminders(outcome: &ClockTick) -> usize {
        outcome
            .effects
            .iter()
            .filter(|effect| matches!(effect, ClockEffect::Remind { .. }))
            .count()
    }

    #[test]
    fn reset_fires_once_inside_tolerance_window() {
        let tasks = today_tasks();
        let s = settings("23:00", false);

        let before = tick(at(10, 22, 59), &s, active(10), &tasks);
        assert_eq!(resets(&before), 0);

        let first = tick(at(10, 23, 2), &s, before.markers, &tasks);
        assert_eq!(
            first.effects,
            vec![ClockEffect::ResetToday {
                task_ids: vec![tasks[0].id]
            }]
        );
        assert_eq!(first.markers.last_reset_day, Some(day(10)));

        let second = tick(at(10, 23, 4), &s, first.markers, &tasks);
        assert_eq!(resets(&second), 0);

        let after_window = tick(at(10, 23, 5), &s, DayMarkers::default(), &tasks);
        assert_eq!(resets(&after_window), 0);
    }

    #[test]
    fn wrapped_reset_window_fires_once_across_midnight() {
        let tasks = today_tasks();
        let s = settings("23:58", false);

        let late = tick(at(10, 23, 59), &s, active(10), &tasks);
        assert_eq!(resets(&late), 1);
        assert_eq!(late.markers.last_reset_day, Some(day(10)));

        let past_midnight = tick(at(11, 0, 1), &s, late.markers, &tasks);
        assert_eq!(resets(&past_midnight), 0);
    }

    #[test]
    fn reminder_requires_enabled_window_and_pending_work() {
        let tasks = today_tasks();

        let disabled = tick(at(10, 22, 45), &settings("23:00", false), active(10), &tasks);
        assert_eq!(reminders(&disabled), 0);

        let enabled = settings("23:00", true);
        let early = tick(at(10, 22, 29), &enabled, active(10), &tasks);
        assert_eq!(reminders(&early), 0);

        let due = tick(at(10, 22, 30), &enabled, active(10), &tasks);
        assert_eq!(due.effects, vec![ClockEffect::Remind { pending: 1 }]);
        assert_eq!(due.markers.last_notify_day, Some(day(10)));

        let repeat = tick(at(10, 22, 50), &enabled, due.markers, &tasks);
        assert_eq!(reminders(&repeat), 0);

        let nothing_pending = tick(at(10, 22, 40), &enabled, active(10), &[]);
        assert_eq!(reminders(&nothing_pending), 0);
        assert_eq!(nothing_pending.markers.last_notify_day, None);
    }

    #[test]
    fn reminder_window_wraps_before_early_reset() {
        let tasks = today_tasks();
        let enabled = settings("00:10", true);

        let before_midnight = tick(at(10, 23, 50), &enabled, active(10), &tasks);
        assert_eq!(reminders(&before_midnight), 1);
        assert_eq!(before_midnight.markers.last_notify_day, Some(day(11)));

        let after_midnight = tick(at(11, 0, 5), &enabled, before_midnight.markers, &tasks);
        assert_eq!(reminders(&after_midnight), 0);
    }

    #[test]
    fn rollover_reports_transition_and_moves_marker() {
        let s = settings("23:00", false);

        let next = tick(at(11, 9, 0), &s, active(10), &[]);
        assert_eq!(
            next.effects,
            vec![ClockEffect::DayRollover {
                transition: DayTransition::NextDay
            }]
        );
        assert_eq!(next.markers.last_active_day, Some(day(11)));

        let gap = tick(at(14, 9, 0), &s, active(10), &[]);
        assert_eq!(
            gap.effects,
            vec![ClockEffect::DayRollover {
                transition: DayTransition::Gap
            }]
        );
        assert_eq!(gap.markers.last_active_day, Some(day(14)));

        let same = tick(at(10, 9, 0), &s, active(10), &[]);
        assert!(same.effects.is_empty());
    }

    #[test]
    fn malformed_settings_skip_destructive_effects() {
        let tasks = today_tasks();
        let outcome = tick(at(11, 23, 1), &settings("25:99", true), active(10), &tasks);

        assert!(outcome.settings_error.is_some());
        assert_eq!(resets(&outcome), 0);
        assert_eq!(reminders(&outcome), 0);
        assert_eq!(outcome.markers.last_active_day, Some(day(11)));
        assert_eq!(outcome.markers.last_reset_day, None);
    }
}
