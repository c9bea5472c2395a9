//! Planner scheduling rules.
//!
//! # Responsibility
//! - Slot allocation, urgency scoring, the daily clock, streak transitions
//!   and project completion, as pure functions over model snapshots.
//!
//! # Invariants
//! - Nothing here performs I/O or reads the wall clock; `now` is an input.

pub mod clock;
pub mod lifecycle;
pub mod slots;
pub mod streak;
pub mod urgency;
