//! Core domain logic for the daydesk task manager and day planner.
//! UIs own presentation; this crate owns records, persistence and derived views.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod periodic;
pub mod query;
pub mod service;
pub mod store;

pub use api::{inventory_resource, schedule_resource, ApiResponse, JsonArrayResource};
pub use config::{AppConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::event::{Event, EventChanges, EventId};
pub use model::task::{Category, Priority, Task, TaskChanges, TaskId};
pub use model::{Record, ValidationError};
pub use periodic::PeriodicTask;
pub use query::event_query::{EventCriteria, EventSort};
pub use query::stats::TaskStats;
pub use query::task_query::{filter_and_sort, StatusFilter, TaskCriteria, TaskSort};
pub use service::notice::{Notice, NoticeLevel};
pub use service::planner_service::{PlannerService, SharedPlanner};
pub use service::preferences::{Preferences, Theme};
pub use service::task_service::{EmptyState, NewTask, TaskCommand, TaskService, TaskView};
pub use store::backend::{
    BackendError, JsonFileBackend, MemoryBackend, SqliteKvBackend, StorageBackend,
};
pub use store::record_store::{RecordStore, StoreError, StoreResult};
pub use store::task_store::TaskStore;
pub use store::EventStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
