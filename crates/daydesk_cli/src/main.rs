//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `daydesk_core` linkage.
//! - Load the app config and start file logging from it.
//! - Optionally summarize the tasks and preferences stored in a database file.
//! - Open the configured schedule and start then stop its periodic tasks.
//!
//! Usage: `daydesk_cli [DB_PATH] [CONFIG_PATH]`

use daydesk_core::service::planner_service::{
    calendar_export_url, spawn_refresh, spawn_reminder_scan,
};
use daydesk_core::{
    init_logging, open_db, AppConfig, JsonFileBackend, PlannerService, Preferences,
    SqliteKvBackend, TaskService, TaskStats,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

fn main() -> ExitCode {
    println!("daydesk_core ping={}", daydesk_core::ping());
    println!("daydesk_core version={}", daydesk_core::core_version());

    let mut args = std::env::args().skip(1);
    let db_path = args.next();
    let config = match args.next() {
        Some(path) => AppConfig::load(Path::new(&path)),
        None => Ok(AppConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            eprintln!("daydesk_core config_error={err}");
            return ExitCode::FAILURE;
        }
    };

    let log_dir = std::env::temp_dir().join("daydesk-logs");
    match init_logging(&config.log_level, &log_dir) {
        Ok(()) => println!(
            "daydesk_core logging level={} dir={}",
            config.log_level,
            log_dir.display()
        ),
        Err(err) => eprintln!("daydesk_core logging_error={err}"),
    }

    if let Some(db_path) = db_path {
        if let Err(code) = summarize_db(&db_path, &config) {
            return code;
        }
    }

    match summarize_schedule(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

fn summarize_db(db_path: &str, config: &AppConfig) -> Result<(), ExitCode> {
    let conn = open_db(db_path).map_err(|err| {
        eprintln!("daydesk_core db_error={err}");
        ExitCode::FAILURE
    })?;

    let (service, notice) = TaskService::open(SqliteKvBackend::new(&conn, &config.storage_key));
    if let Some(notice) = notice {
        eprintln!("daydesk_core notice={}", notice.message);
    }

    let today = chrono::Local::now().date_naive();
    let stats = TaskStats::compute(service.store().records(), today);
    println!(
        "daydesk_core tasks total={} completed={} pending={} overdue={} percent={}",
        stats.total, stats.completed, stats.pending, stats.overdue, stats.completion_percent
    );

    let preferences = Preferences::new(&conn, &config.theme_key, &config.welcomed_key);
    match (preferences.theme(), preferences.is_welcomed()) {
        (Ok(theme), Ok(welcomed)) => println!(
            "daydesk_core preferences theme={} welcomed={welcomed}",
            theme.as_str()
        ),
        (Err(err), _) | (_, Err(err)) => eprintln!("daydesk_core preferences_error={err}"),
    }
    Ok(())
}

fn summarize_schedule(config: &AppConfig) -> Result<(), ExitCode> {
    let (planner, warning) = PlannerService::open(JsonFileBackend::new(&config.schedule_path));
    if let Some(warning) = warning {
        eprintln!("daydesk_core schedule_warning={warning}");
    }

    let today = chrono::Local::now().date_naive();
    println!(
        "daydesk_core schedule path={} events={}",
        config.schedule_path.display(),
        planner.events().len()
    );
    for suggestion in planner.suggestions(today) {
        println!("daydesk_core suggestion={suggestion}");
    }
    if let Some(event) = planner.events().first() {
        println!("daydesk_core export={}", calendar_export_url(event));
    }

    let planner = Arc::new(Mutex::new(planner));
    let refresh = spawn_refresh(Arc::clone(&planner), config.refresh_interval());
    let reminders = spawn_reminder_scan(planner, config.reminder_interval(), |due| {
        for event in due {
            println!("daydesk_core reminder title={}", event.title);
        }
    });
    match (refresh, reminders) {
        (Ok(refresh), Ok(reminders)) => {
            println!(
                "daydesk_core periodic refresh_secs={} reminder_secs={}",
                config.refresh_interval_secs, config.reminder_interval_secs
            );
            refresh.cancel();
            reminders.cancel();
            Ok(())
        }
        (Err(err), _) | (_, Err(err)) => {
            eprintln!("daydesk_core periodic_error={err}");
            Err(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{summarize_db, summarize_schedule};
    use chrono::{NaiveDate, NaiveTime};
    use daydesk_core::{open_db, AppConfig, JsonFileBackend, PlannerService, Preferences, Theme};

    #[test]
    fn configured_paths_and_keys_drive_the_summaries() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let schedule_path = dir.path().join("shop/schedule.json");
        std::fs::write(
            &config_path,
            format!(
                r#"{{"schedule_path": {:?}, "theme_key": "shopTheme", "refresh_interval_secs": 1}}"#,
                schedule_path.to_str().unwrap()
            ),
        )
        .unwrap();
        let config = AppConfig::load(&config_path).unwrap();
        assert_eq!(config.schedule_path, schedule_path);

        let (mut planner, _) = PlannerService::open(JsonFileBackend::new(&schedule_path));
        planner
            .add_event(
                NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                "Stock count",
                None,
            )
            .unwrap();
        assert!(summarize_schedule(&config).is_ok());

        let db_path = dir.path().join("daydesk.db");
        {
            let conn = open_db(&db_path).unwrap();
            Preferences::new(&conn, "shopTheme", &config.welcomed_key)
                .set_theme(Theme::Dark)
                .unwrap();
        }
        assert!(summarize_db(db_path.to_str().unwrap(), &config).is_ok());
    }
}
