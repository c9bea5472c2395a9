//! Planner domain model (the entity store).
//!
//! # Responsibility
//! - Define projects, sized tasks, settings, streak/day markers and the
//!   checklist as plain data.
//! - Keep the size capacity/duration table as one explicit value.
//!
//! # Invariants
//! - Model types carry no scheduling behavior; that lives in `schedule`.

pub mod checklist;
pub mod project;
pub mod settings;
pub mod sizing;
pub mod state;
pub mod task;
pub mod validation;
