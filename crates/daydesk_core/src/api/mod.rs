//! Transport-agnostic request handlers.
//!
//! Any HTTP layer can route GET/POST/PUT/DELETE to these and send back the
//! returned status and body.

pub mod json_resource;

use crate::config::AppConfig;

pub use json_resource::{ApiResponse, JsonArrayResource};

/// Planner events file (`/api/schedule`).
pub fn schedule_resource(config: &AppConfig) -> JsonArrayResource {
    JsonArrayResource::new("schedule", &config.schedule_path)
}

/// Shop inventory file (`/api/inventory`); quantities change via `{id, field, delta}`.
pub fn inventory_resource(config: &AppConfig) -> JsonArrayResource {
    JsonArrayResource::new("inventory", &config.inventory_path)
}

#[cfg(test)]
mod tests {
    use super::{inventory_resource, schedule_resource};
    use crate::config::AppConfig;
    use serde_json::json;

    #[test]
    fn resources_use_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            schedule_path: dir.path().join("data/schedule.json"),
            inventory_path: dir.path().join("data/inventory.json"),
            ..AppConfig::default()
        };

        assert!(inventory_resource(&config)
            .post(json!({"id": "linen", "quantity": 4}))
            .is_success());
        assert!(config.inventory_path.exists());
        assert_eq!(schedule_resource(&config).get().body, json!([]));
    }
}
