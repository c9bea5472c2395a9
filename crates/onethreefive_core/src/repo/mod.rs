//! Repository layer for persisted planner state.
//!
//! # Responsibility
//! - Define the load/save contract consumed by the planner service.
//! - Keep SQLite and JSON encoding details behind that contract.
//!
//! # Invariants
//! - Loading degrades per key: one unreadable key never blocks the others.
//! - Repositories refuse connections without applied migrations.

pub mod state_repo;
