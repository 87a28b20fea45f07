//! User-facing notifications produced by commands.

use crate::model::ValidationError;
use crate::store::record_store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A dismissible message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Maps a task store failure to the message the task manager shows.
pub(crate) fn task_error_notice(err: &StoreError) -> Notice {
    match err {
        StoreError::Validation(ValidationError::EmptyTitle) => {
            Notice::error("Please enter a task title")
        }
        StoreError::Validation(ValidationError::DuplicateId(_)) => {
            Notice::error("Task already exists")
        }
        StoreError::Validation(ValidationError::CompletionMismatch) => {
            Notice::error("Invalid task state")
        }
        StoreError::PersistenceRead(_) => Notice::error("Error loading saved tasks"),
        StoreError::PersistenceWrite(_) => Notice::error("Error saving tasks"),
        StoreError::NotFound(_) => Notice::error("Task not found"),
    }
}
