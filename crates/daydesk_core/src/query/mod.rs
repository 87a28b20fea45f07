//! Read-only derivations over record collections.
//!
//! # Responsibility
//! - Turn a collection plus criteria into an ordered view.
//! - Compute counters shown next to the view.
//!
//! # Invariants
//! - Pure functions of their inputs; callers pass "today"/"now" explicitly.

pub mod event_query;
pub mod stats;
pub mod task_query;
