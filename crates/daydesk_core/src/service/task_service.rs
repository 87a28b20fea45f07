//! Task manager use-case service.
//!
//! # Responsibility
//! - Accept typed commands from any UI and apply them to the task store.
//! - Turn every outcome into exactly one `Notice`.
//! - Produce the filtered view, counters and empty-state marker.
//!
//! # Invariants
//! - Commands never panic; every failure becomes an `Error` notice.
//! - Confirmation prompts are the caller's job and happen before dispatch.

use crate::model::task::{Category, Priority, Task, TaskChanges, TaskId};
use crate::query::stats::TaskStats;
use crate::query::task_query::{filter_and_sort, TaskCriteria};
use crate::service::notice::{task_error_notice, Notice};
use crate::store::backend::StorageBackend;
use crate::store::record_store::StoreResult;
use crate::store::task_store::TaskStore;
use chrono::NaiveDate;
use log::{info, warn};

/// Input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    /// Form defaults: `personal`, `medium`, no due date.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: Category::Personal,
            priority: Priority::Medium,
            due_date: None,
        }
    }
}

/// UI-to-store command contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    Add(NewTask),
    Update { id: TaskId, changes: TaskChanges },
    Remove { id: TaskId },
    ToggleComplete { id: TaskId },
    CompleteAll,
    ClearCompleted,
}

impl TaskCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Update { .. } => "update",
            Self::Remove { .. } => "remove",
            Self::ToggleComplete { .. } => "toggle_complete",
            Self::CompleteAll => "complete_all",
            Self::ClearCompleted => "clear_completed",
        }
    }
}

/// Which placeholder the task list should show, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The view has tasks.
    None,
    /// The store itself is empty.
    NoTasks,
    /// Tasks exist but none match the criteria.
    NoResults,
}

/// Everything the task list renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView<'a> {
    pub tasks: Vec<&'a Task>,
    pub stats: TaskStats,
    pub empty_state: EmptyState,
}

pub struct TaskService<B: StorageBackend> {
    store: TaskStore<B>,
}

impl<B: StorageBackend> TaskService<B> {
    /// Loads tasks from `backend`.
    ///
    /// Returns an error notice alongside the service when saved tasks could
    /// not be loaded; the service then starts empty.
    pub fn open(backend: B) -> (Self, Option<Notice>) {
        let (store, warning) = TaskStore::load(backend);
        let notice = warning.as_ref().map(task_error_notice);
        (Self { store }, notice)
    }

    pub fn store(&self) -> &TaskStore<B> {
        &self.store
    }

    /// Applies one command and reports its outcome.
    pub fn dispatch(&mut self, command: TaskCommand) -> Notice {
        let name = command.name();
        match self.apply(command) {
            Ok(notice) => {
                info!(
                    "event=task_command module=service status=ok command={name} tasks={}",
                    self.store.len()
                );
                notice
            }
            Err(err) => {
                warn!("event=task_command module=service status=error command={name} error={err}");
                task_error_notice(&err)
            }
        }
    }

    fn apply(&mut self, command: TaskCommand) -> StoreResult<Notice> {
        match command {
            TaskCommand::Add(new_task) => {
                let mut task = Task::new(new_task.title);
                task.category = new_task.category;
                task.priority = new_task.priority;
                task.due_date = new_task.due_date;
                self.store.add(task)?;
                Ok(Notice::success("Task added successfully!"))
            }
            TaskCommand::Update { id, changes } => {
                self.store.update(&id, changes)?;
                Ok(Notice::success("Task updated successfully!"))
            }
            TaskCommand::Remove { id } => {
                self.store.remove(&id)?;
                Ok(Notice::success("Task deleted successfully"))
            }
            TaskCommand::ToggleComplete { id } => {
                if self.store.toggle_complete(&id)? {
                    Ok(Notice::success("Task marked as completed!"))
                } else {
                    Ok(Notice::success("Task marked as pending"))
                }
            }
            TaskCommand::CompleteAll => match self.store.complete_all()? {
                0 => Ok(Notice::info("No pending tasks to complete")),
                count => Ok(Notice::success(format!("Marked {count} tasks as complete!"))),
            },
            TaskCommand::ClearCompleted => match self.store.clear_completed()? {
                0 => Ok(Notice::info("No completed tasks to clear")),
                count => Ok(Notice::success(format!("Cleared {count} completed tasks"))),
            },
        }
    }

    /// Runs the query pipeline and derives counters for the whole store.
    pub fn view(&self, criteria: &TaskCriteria, today: NaiveDate) -> TaskView<'_> {
        let records = self.store.records();
        let tasks = filter_and_sort(records, criteria, today);
        let empty_state = if records.is_empty() {
            EmptyState::NoTasks
        } else if tasks.is_empty() {
            EmptyState::NoResults
        } else {
            EmptyState::None
        };

        TaskView {
            tasks,
            stats: TaskStats::compute(records, today),
            empty_state,
        }
    }

    /// Window title with progress, e.g. `Pro Task Manager (50% Complete)`.
    pub fn progress_title(&self, today: NaiveDate) -> String {
        let stats = TaskStats::compute(self.store.records(), today);
        if stats.total == 0 {
            "Pro Task Manager".to_string()
        } else {
            format!("Pro Task Manager ({}% Complete)", stats.completion_percent)
        }
    }
}
