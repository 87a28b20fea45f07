//! Record stores and their persistence backends.
//!
//! # Responsibility
//! - Hold each application's authoritative record collection.
//! - Mirror every mutation to a backend as one full overwrite.
//!
//! # Invariants
//! - Stores are explicit values owned by the caller; there is no global state.
//! - Unknown ids surface as `StoreError::NotFound` instead of silent no-ops.

pub mod backend;
pub mod record_store;
pub mod task_store;

use crate::model::event::Event;

/// Record store over planner events.
pub type EventStore<B> = record_store::RecordStore<Event, B>;
