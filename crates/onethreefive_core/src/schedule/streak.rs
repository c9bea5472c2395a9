//! Consecutive-day streak tracking.
//!
//! The counter advances only when the previous active day is exactly
//! yesterday. Any other gap leaves it unchanged; it is never reset to zero.

use chrono::NaiveDate;

/// Classification of a calendar-day change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayTransition {
    /// No previous active day recorded.
    FirstSeen,
    /// Still the same calendar day.
    SameDay,
    /// Previous active day was exactly yesterday.
    NextDay,
    /// One or more days skipped, or the clock moved backwards.
    Gap,
}

impl DayTransition {
    pub fn between(last_active: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(last_active) = last_active else {
            return Self::FirstSeen;
        };
        match (today - last_active).num_days() {
            0 => Self::SameDay,
            1 => Self::NextDay,
            _ => Self::Gap,
        }
    }

    pub fn is_day_change(self) -> bool {
        !matches!(self, Self::SameDay)
    }
}

/// Returns the streak after `transition`.
pub fn advance(streak: u32, transition: DayTransition) -> u32 {
    match transition {
        DayTransition::NextDay => streak.saturating_add(1),
        DayTransition::FirstSeen | DayTransition::SameDay | DayTransition::Gap => streak,
    }
}
