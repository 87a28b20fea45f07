//! Task query pipeline: text, category and status filters plus one sort key.
//!
//! # Invariants
//! - The pipeline borrows its input and never mutates it.
//! - Steps run in a fixed order: text, category, status, sort.
//! - Sorting is stable; equal keys keep their input (newest-first) order.

use crate::model::task::{Category, Task};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Completion-state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    /// Pending and due strictly before today.
    Overdue,
}

impl StatusFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }

    fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
            Self::Overdue => task.is_overdue(today),
        }
    }
}

/// Sort key for the task view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// Case-folded title, ascending.
    Title,
    Category,
    /// Most pressing first.
    Priority,
    /// Earliest first; tasks without a due date last.
    DueDate,
    /// Newest first.
    #[default]
    Created,
}

impl TaskSort {
    /// Parses a sort option name; unknown names fall back to `Created`.
    pub fn parse(value: &str) -> Self {
        match value {
            "title" => Self::Title,
            "category" => Self::Category,
            "priority" => Self::Priority,
            "dueDate" | "due_date" => Self::DueDate,
            _ => Self::Created,
        }
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Title => locale_cmp(&a.title, &b.title),
            Self::Category => a.category.as_str().cmp(b.category.as_str()),
            Self::Priority => b.priority.rank().cmp(&a.priority.rank()),
            Self::DueDate => match (a.due_date, b.due_date) {
                (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Created => b.created_at.cmp(&a.created_at),
        }
    }
}

/// Criteria for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCriteria {
    /// Free-text term; blank means no text filtering.
    pub search: String,
    /// `None` means every category.
    pub category: Option<Category>,
    pub status: StatusFilter,
    pub sort: TaskSort,
}

impl TaskCriteria {
    /// Builds criteria from the UI's string form (`"all"` is the wildcard).
    pub fn from_options(search: &str, category: &str, status: &str, sort: &str) -> Self {
        Self {
            search: search.to_string(),
            category: Category::parse(category),
            status: StatusFilter::parse(status).unwrap_or_default(),
            sort: TaskSort::parse(sort),
        }
    }
}

/// Runs the pipeline and returns the ordered view.
///
/// `today` is the local calendar day used for overdue checks.
pub fn filter_and_sort<'a>(
    tasks: &'a [Task],
    criteria: &TaskCriteria,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let term = criteria.search.trim().to_lowercase();

    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|task| term.is_empty() || task.title.to_lowercase().contains(&term))
        .filter(|task| criteria.category.map_or(true, |category| task.category == category))
        .filter(|task| criteria.status.matches(task, today))
        .collect();

    view.sort_by(|a, b| criteria.sort.compare(a, b));
    view
}

/// Case-insensitive ordering; on a tie lowercase sorts before uppercase.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| b.cmp(a))
}
