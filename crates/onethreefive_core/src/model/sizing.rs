//! Task sizes and the per-size capacity/duration table.
//!
//! # Responsibility
//! - Define the four task sizes, including the slot-exempt `quick` size.
//! - Hold the enumeration-keyed table consulted by slot allocation and
//!   urgency scoring.
//!
//! # Invariants
//! - `TaskSize::Quick` has no capacity and no duration weight.
//! - `SizeTable::STANDARD` is the 1/3/5 rule with 90/30/10 minute weights.

use serde::{Deserialize, Serialize};

/// Size class of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSize {
    /// One per day. Older exports spell this `big`.
    #[serde(alias = "big")]
    Large,
    /// Three per day.
    Medium,
    /// Five per day.
    Small,
    /// Standalone quick task, outside slot accounting.
    Quick,
}

impl TaskSize {
    /// Sizes that occupy daily slots, in display order.
    pub const SLOTTED: [TaskSize; 3] = [TaskSize::Large, TaskSize::Medium, TaskSize::Small];

    /// Returns whether tasks of this size take part in slot accounting.
    pub fn is_slotted(self) -> bool {
        !matches!(self, TaskSize::Quick)
    }

    /// Stable lowercase name used in logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskSize::Large => "large",
            TaskSize::Medium => "medium",
            TaskSize::Small => "small",
            TaskSize::Quick => "quick",
        }
    }
}

/// Capacity and planned duration for one slotted size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRule {
    /// Maximum simultaneous incomplete today-tasks of this size.
    pub capacity: usize,
    /// Planned focus minutes for one task of this size.
    pub minutes: u32,
}

/// Size-keyed capacity/duration table.
///
/// Injected into the slot allocator and urgency scorer so neither hard-codes
/// the literal numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeTable {
    pub large: SizeRule,
    pub medium: SizeRule,
    pub small: SizeRule,
}

impl SizeTable {
    /// The 1-3-5 rule.
    pub const STANDARD: SizeTable = SizeTable {
        large: SizeRule {
            capacity: 1,
            minutes: 90,
        },
        medium: SizeRule {
            capacity: 3,
            minutes: 30,
        },
        small: SizeRule {
            capacity: 5,
            minutes: 10,
        },
    };

    /// Returns the rule for a slotted size, `None` for `Quick`.
    pub fn rule(&self, size: TaskSize) -> Option<SizeRule> {
        match size {
            TaskSize::Large => Some(self.large),
            TaskSize::Medium => Some(self.medium),
            TaskSize::Small => Some(self.small),
            TaskSize::Quick => None,
        }
    }

    /// Planned minutes for one task of `size`. Quick tasks weigh nothing.
    pub fn minutes(&self, size: TaskSize) -> u32 {
        self.rule(size).map_or(0, |rule| rule.minutes)
    }

    /// Sum of all slotted capacities.
    pub fn total_capacity(&self) -> usize {
        self.large.capacity + self.medium.capacity + self.small.capacity
    }
}

impl Default for SizeTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Formats minutes as `1h 30m`, `2h` or `45m`.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_duration, SizeTable, TaskSize};

    #[test]
    fn standard_table_is_one_three_five() {
        let table = SizeTable::STANDARD;
        assert_eq!(table.rule(TaskSize::Large).map(|r| r.capacity), Some(1));
        assert_eq!(table.rule(TaskSize::Medium).map(|r| r.capacity), Some(3));
        assert_eq!(table.rule(TaskSize::Small).map(|r| r.capacity), Some(5));
        assert_eq!(table.total_capacity(), 9);
    }

    #[test]
    fn quick_size_has_no_rule_and_no_weight() {
        let table = SizeTable::STANDARD;
        assert!(table.rule(TaskSize::Quick).is_none());
        assert_eq!(table.minutes(TaskSize::Quick), 0);
        assert!(!TaskSize::Quick.is_slotted());
    }

    #[test]
    fn legacy_big_spelling_deserializes_as_large() {
        let size: TaskSize = serde_json::from_str("\"big\"").expect("legacy size should parse");
        assert_eq!(size, TaskSize::Large);
        let encoded = serde_json::to_string(&TaskSize::Large).expect("size should serialize");
        assert_eq!(encoded, "\"large\"");
    }

    #[test]
    fn format_duration_covers_hour_and_minute_forms() {
        assert_eq!(format_duration(10), "10m");
        assert_eq!(format_duration(120), "2h");
        assert_eq!(format_duration(130), "2h 10m");
    }
}
