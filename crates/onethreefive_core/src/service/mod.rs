//! Planner use-case services.
//!
//! # Responsibility
//! - Orchestrate scheduling rules and repository calls into user actions.
//! - Own the host boundaries for notifications and export/import.

pub mod notify;
pub mod planner_service;
pub mod transfer;
