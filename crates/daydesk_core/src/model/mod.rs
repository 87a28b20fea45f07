//! Domain records owned by the record stores.
//!
//! # Responsibility
//! - Define the task and event shapes and their JSON wire format.
//! - Define the `Record` contract the generic store relies on.
//!
//! # Invariants
//! - Every record carries a stable, opaque string id.
//! - Edits replace the mutable fields only; id and creation data survive.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod event;
pub mod task;

/// Rejected record input. No state changes when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Another record already uses this id.
    DuplicateId(String),
    /// `completed` and `completed_at` disagree.
    CompletionMismatch,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title cannot be empty"),
            Self::DuplicateId(id) => write!(f, "record id already exists: {id}"),
            Self::CompletionMismatch => {
                write!(f, "completion timestamp must be set exactly when completed")
            }
        }
    }
}

impl Error for ValidationError {}

/// Contract between a record type and the generic record store.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Replacement values for the mutable fields.
    type Changes;

    /// Short name used in log events (`task`, `event`).
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Checks required fields before the record enters a store.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Replaces the mutable fields.
    ///
    /// Implementations validate `changes` first and leave `self` untouched
    /// on error.
    fn apply_changes(&mut self, changes: Self::Changes) -> Result<(), ValidationError>;
}

pub(crate) fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}
