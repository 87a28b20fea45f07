//! Use-case services on top of the record stores.
//!
//! # Responsibility
//! - Expose typed entry points that UIs call instead of touching stores.
//! - Keep presentation concerns (markup, styling) out of core.

pub mod notice;
pub mod planner_service;
pub mod preferences;
pub mod task_service;
