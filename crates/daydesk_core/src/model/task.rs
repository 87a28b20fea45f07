//! Task record for the task manager.
//!
//! # Responsibility
//! - Define the task shape, its enumerations and its JSON wire format.
//! - Normalize loosely-shaped stored tasks into well-formed ones.
//!
//! # Invariants
//! - `completed_at.is_some() == completed` for every `Task` value this
//!   module produces.
//! - `id` and `created_at` never change after creation.

use super::{normalize_title, Record, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque task identity.
pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Personal,
    Work,
    Shopping,
    Health,
    Finance,
    Education,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Personal,
        Category::Work,
        Category::Shopping,
        Category::Health,
        Category::Finance,
        Category::Education,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Work => "work",
            Self::Shopping => "shopping",
            Self::Health => "health",
            Self::Finance => "finance",
            Self::Education => "education",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Sort rank; higher is more pressing.
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Urgent => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// A single to-do item.
///
/// Deserialization is lenient (see [`StoredTask`]); serialization always
/// writes every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredTask")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    /// Calendar deadline; `None` means no deadline.
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Replacement values for a task edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Creates a pending task with form-entry defaults (`personal`, `medium`).
    ///
    /// The title is trimmed but not validated; stores validate on insert.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title, Utc::now())
    }

    /// Creates a pending task with caller-provided identity and creation time.
    pub fn with_id(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into().trim().to_string(),
            category: Category::Personal,
            priority: Priority::Medium,
            due_date: None,
            completed: false,
            created_at,
            completed_at: None,
        }
    }

    /// Flips completion and keeps `completed_at` in sync.
    pub fn toggle_complete(&mut self, now: DateTime<Utc>) {
        if self.completed {
            self.completed = false;
            self.completed_at = None;
        } else {
            self.mark_complete(now);
        }
    }

    /// Marks the task completed. Already-completed tasks keep their timestamp.
    pub fn mark_complete(&mut self, now: DateTime<Utc>) {
        if !self.completed {
            self.completed = true;
            self.completed_at = Some(now);
        }
    }

    /// Incomplete and due strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => !self.completed && due < today,
            None => false,
        }
    }
}

impl Record for Task {
    type Changes = TaskChanges;

    const KIND: &'static str = "task";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        normalize_title(&self.title)?;
        if self.completed != self.completed_at.is_some() {
            return Err(ValidationError::CompletionMismatch);
        }
        Ok(())
    }

    fn apply_changes(&mut self, changes: TaskChanges) -> Result<(), ValidationError> {
        let title = normalize_title(&changes.title)?;
        self.title = title;
        self.category = changes.category;
        self.priority = changes.priority;
        self.due_date = changes.due_date;
        Ok(())
    }
}

/// Loose on-disk task shape.
///
/// Older or hand-edited blobs may miss fields or carry unknown enum values;
/// conversion fills defaults instead of rejecting the record.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredTask {
    id: Option<String>,
    title: Option<String>,
    category: Option<String>,
    priority: Option<String>,
    due_date: Option<String>,
    completed: Option<bool>,
    created_at: Option<String>,
    completed_at: Option<String>,
}

impl From<StoredTask> for Task {
    fn from(stored: StoredTask) -> Self {
        let created_at = stored
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);
        let completed = stored.completed.unwrap_or(false);
        let completed_at = if completed {
            Some(
                stored
                    .completed_at
                    .as_deref()
                    .and_then(parse_timestamp)
                    .unwrap_or(created_at),
            )
        } else {
            None
        };

        Self {
            id: stored
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: stored.title.unwrap_or_default(),
            category: stored
                .category
                .as_deref()
                .and_then(Category::parse)
                .unwrap_or(Category::Other),
            priority: stored
                .priority
                .as_deref()
                .and_then(Priority::parse)
                .unwrap_or_default(),
            due_date: stored.due_date.as_deref().and_then(parse_due_date),
            completed,
            created_at,
            completed_at,
        }
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

fn parse_due_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    // Date inputs are `YYYY-MM-DD`; full timestamps keep their date part.
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(value).map(|timestamp| timestamp.date_naive()))
}
