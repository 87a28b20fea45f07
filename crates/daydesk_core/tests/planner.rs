use chrono::{NaiveDate, NaiveTime};
use crossbeam::channel::unbounded;
use daydesk_core::query::event_query::{filter_events, upcoming, week_view, UPCOMING_LIMIT};
use daydesk_core::service::planner_service::{
    spawn_refresh, spawn_reminder_scan_with_clock, INVENTORY_SUGGESTION,
};
use daydesk_core::{EventCriteria, EventSort, JsonArrayResource, JsonFileBackend, PlannerService};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn oct(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn created_sort_reverses_insertion_regardless_of_time() {
    let dir = tempfile::tempdir().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("schedule.json"));
    let (mut planner, _) = PlannerService::open(backend);

    planner.add_event(oct(18), hm(9, 0), "Open shop", None).unwrap();
    planner.add_event(oct(18), hm(14, 0), "Fitting", None).unwrap();

    let created: Vec<_> = filter_events(planner.events(), &EventCriteria::default())
        .into_iter()
        .map(|event| event.title.as_str())
        .collect();
    assert_eq!(created, ["Fitting", "Open shop"]);

    let chronological = EventCriteria {
        sort: EventSort::Chronological,
        ..EventCriteria::default()
    };
    let ordered: Vec<_> = filter_events(planner.events(), &chronological)
        .into_iter()
        .map(|event| event.title.as_str())
        .collect();
    assert_eq!(ordered, ["Open shop", "Fitting"]);
}

#[test]
fn events_written_through_the_resource_are_readable_by_the_planner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.json");
    let resource = JsonArrayResource::new("schedule", &path);

    let response = resource.post(json!({
        "id": "e1",
        "date": "Sun Oct 18 2026",
        "time": "10:30",
        "title": "Fabric inventory"
    }));
    assert!(response.is_success());

    let (planner, warning) = PlannerService::open(JsonFileBackend::new(&path));
    assert!(warning.is_none());
    assert_eq!(planner.events()[0].date, oct(18));
    assert_eq!(planner.events()[0].time, hm(10, 30));
    assert!(!planner.suggestions(oct(18)).contains(&INVENTORY_SUGGESTION));

    let week = week_view(planner.events(), oct(16));
    assert_eq!(week.len(), 7);
    assert_eq!(week[2].events.len(), 1);

    let morning = oct(18).and_hms_opt(8, 0, 0).unwrap();
    let soon = upcoming(planner.events(), morning, UPCOMING_LIMIT);
    assert_eq!(soon.len(), 1);
}

#[test]
fn periodic_refresh_picks_up_external_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.json");
    let (planner, _) = PlannerService::open(JsonFileBackend::new(&path));
    let planner = Arc::new(Mutex::new(planner));

    let task = spawn_refresh(Arc::clone(&planner), Duration::from_millis(10)).unwrap();

    let resource = JsonArrayResource::new("schedule", &path);
    resource.post(json!({"id": "e1", "date": "2026-10-18", "time": "09:00", "title": "Open"}));

    let deadline = Instant::now() + Duration::from_secs(2);
    while planner.lock().unwrap().events().is_empty() {
        assert!(Instant::now() < deadline, "refresh never observed the write");
        std::thread::sleep(Duration::from_millis(5));
    }
    task.cancel();
}

#[test]
fn reminder_scan_fires_once_per_minute() {
    let dir = tempfile::tempdir().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("schedule.json"));
    let (mut planner, _) = PlannerService::open(backend);
    planner.add_event(oct(18), hm(9, 30), "Open shop", None).unwrap();
    planner.add_event(oct(18), hm(11, 0), "Lunch", None).unwrap();
    let planner = Arc::new(Mutex::new(planner));

    let (tx, rx) = unbounded();
    let now = oct(18).and_hms_opt(9, 30, 15).unwrap();
    let task = spawn_reminder_scan_with_clock(
        planner,
        Duration::from_millis(5),
        move || now,
        move |due| {
            let titles: Vec<String> = due.into_iter().map(|event| event.title).collect();
            let _ = tx.send(titles);
        },
    )
    .unwrap();

    let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(first, ["Open shop"]);

    // The clock never leaves 09:30, so no second notification arrives.
    std::thread::sleep(Duration::from_millis(50));
    task.cancel();
    assert!(rx.try_recv().is_err());
}

#[test]
fn teardown_while_holding_the_planner_does_not_block() {
    let dir = tempfile::tempdir().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("s.json"));
    let (mut planner, _) = PlannerService::open(backend);
    planner.add_event(oct(18), hm(9, 30), "Open shop", None).unwrap();
    let planner = Arc::new(Mutex::new(planner));

    let refresh = spawn_refresh(Arc::clone(&planner), Duration::from_millis(5)).unwrap();
    let now = oct(18).and_hms_opt(9, 30, 0).unwrap();
    let reminders = spawn_reminder_scan_with_clock(
        Arc::clone(&planner),
        Duration::from_millis(5),
        move || now,
        |_| {},
    )
    .unwrap();

    let (done_tx, done_rx) = unbounded();
    let owner = Arc::clone(&planner);
    std::thread::spawn(move || {
        let _guard = owner.lock().unwrap();
        // Let both tasks tick against the held lock before tearing down.
        std::thread::sleep(Duration::from_millis(30));
        drop(refresh);
        reminders.cancel();
        let _ = done_tx.send(());
    });

    assert!(
        done_rx.recv_timeout(Duration::from_secs(3)).is_ok(),
        "teardown blocked while the planner was held"
    );
}
