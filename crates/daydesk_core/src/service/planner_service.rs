//! Day planner use-case service.
//!
//! # Responsibility
//! - Add, edit, delete and refresh planner events through the event store.
//! - Derive advisory suggestions, due reminders and calendar export links.
//!
//! # Invariants
//! - Suggestions and reminders are pure functions of events plus "now".
//! - Refresh replaces the whole collection or leaves it untouched.

use crate::model::event::{Event, EventChanges, EventId};
use crate::periodic::PeriodicTask;
use crate::query::event_query::events_on;
use crate::store::backend::StorageBackend;
use crate::store::record_store::{StoreError, StoreResult};
use crate::store::EventStore;
use chrono::{
    DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use log::{debug, info, warn};
use std::io;
use std::sync::{Arc, Mutex, TryLockError};

pub const NO_EVENTS_SUGGESTION: &str = "No events today - consider adding shop opening tasks.";
pub const INVENTORY_SUGGESTION: &str = "Suggest checking fabric inventory.";

const CALENDAR_RENDER_URL: &str = "https://calendar.google.com/calendar/render";
const CALENDAR_SLOT_MINUTES: i64 = 60;

pub struct PlannerService<B: StorageBackend> {
    store: EventStore<B>,
}

impl<B: StorageBackend> PlannerService<B> {
    /// Loads events; unreadable data yields an empty planner plus the warning.
    pub fn open(backend: B) -> (Self, Option<StoreError>) {
        let (store, warning) = EventStore::load(backend);
        (Self { store }, warning)
    }

    pub fn events(&self) -> &[Event] {
        self.store.records()
    }

    pub fn store(&self) -> &EventStore<B> {
        &self.store
    }

    /// Adds an event on `date`; returns its id.
    pub fn add_event(
        &mut self,
        date: NaiveDate,
        time: NaiveTime,
        title: &str,
        description: Option<&str>,
    ) -> StoreResult<EventId> {
        let mut event = Event::new(date, time, title);
        if let Some(description) = description {
            event = event.with_description(description);
        }
        let id = event.id.clone();
        self.store.add(event)?;
        Ok(id)
    }

    pub fn edit_event(&mut self, id: &str, changes: EventChanges) -> StoreResult<()> {
        self.store.update(id, changes)
    }

    pub fn delete_event(&mut self, id: &str) -> StoreResult<Event> {
        self.store.remove(id)
    }

    /// Re-reads the backend; on failure the current events stay visible.
    pub fn refresh(&mut self) -> StoreResult<()> {
        match self.store.reload() {
            Ok(()) => {
                info!(
                    "event=planner_refresh module=service status=ok events={}",
                    self.store.len()
                );
                Ok(())
            }
            Err(err) => {
                warn!("event=planner_refresh module=service status=error error={err}");
                Err(err)
            }
        }
    }

    pub fn suggestions(&self, today: NaiveDate) -> Vec<&'static str> {
        suggestions(self.store.records(), today)
    }
}

/// Planner shared between the UI and its periodic tasks.
pub type SharedPlanner<B> = Arc<Mutex<PlannerService<B>>>;

/// Re-reads the planner's backend every `interval` until the task is dropped.
pub fn spawn_refresh<B>(
    planner: SharedPlanner<B>,
    interval: std::time::Duration,
) -> io::Result<PeriodicTask>
where
    B: StorageBackend + Send + 'static,
{
    PeriodicTask::spawn("planner-refresh", interval, move || match planner.try_lock() {
        Ok(mut planner) => {
            // Failures are logged by `refresh`; the previous events stay.
            let _ = planner.refresh();
        }
        // The owner holds the planner (possibly while cancelling this task).
        Err(TryLockError::WouldBlock) => {
            debug!("event=planner_refresh module=service status=skip reason=planner_busy")
        }
        Err(TryLockError::Poisoned(_)) => {
            warn!("event=planner_refresh module=service status=error error_code=lock_poisoned")
        }
    })
}

/// Scans for due reminders every `interval` using the local wall clock.
///
/// `on_due` receives the events due in the current minute, at most once per
/// minute.
pub fn spawn_reminder_scan<B, F>(
    planner: SharedPlanner<B>,
    interval: std::time::Duration,
    on_due: F,
) -> io::Result<PeriodicTask>
where
    B: StorageBackend + Send + 'static,
    F: FnMut(Vec<Event>) + Send + 'static,
{
    spawn_reminder_scan_with_clock(planner, interval, || Local::now().naive_local(), on_due)
}

/// Same as [`spawn_reminder_scan`] with an explicit clock.
pub fn spawn_reminder_scan_with_clock<B, C, F>(
    planner: SharedPlanner<B>,
    interval: std::time::Duration,
    clock: C,
    mut on_due: F,
) -> io::Result<PeriodicTask>
where
    B: StorageBackend + Send + 'static,
    C: Fn() -> NaiveDateTime + Send + 'static,
    F: FnMut(Vec<Event>) + Send + 'static,
{
    let mut last_scanned: Option<NaiveDateTime> = None;
    PeriodicTask::spawn("planner-reminders", interval, move || {
        let now = clock();
        let minute = truncate_to_minute(now);
        if last_scanned == Some(minute) {
            return;
        }

        // A busy planner skips the tick; the next one retries this minute.
        let due: Vec<Event> = match planner.try_lock() {
            Ok(planner) => due_reminders(planner.events(), now)
                .into_iter()
                .cloned()
                .collect(),
            Err(TryLockError::WouldBlock) => return,
            Err(TryLockError::Poisoned(_)) => {
                warn!(
                    "event=planner_reminders module=service status=error error_code=lock_poisoned"
                );
                return;
            }
        };
        last_scanned = Some(minute);

        if !due.is_empty() {
            info!(
                "event=planner_reminders module=service status=ok due={}",
                due.len()
            );
            on_due(due);
        }
    })
}

fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|value| value.with_nanosecond(0))
        .unwrap_or(value)
}

/// Rule-based hints over today's events.
pub fn suggestions(events: &[Event], today: NaiveDate) -> Vec<&'static str> {
    let todays = events_on(events, today);
    let mut hints = Vec::new();
    if todays.is_empty() {
        hints.push(NO_EVENTS_SUGGESTION);
    }
    if !todays
        .iter()
        .any(|event| event.title.to_lowercase().contains("inventory"))
    {
        hints.push(INVENTORY_SUGGESTION);
    }
    hints
}

/// Events scheduled today at the current minute.
pub fn due_reminders(events: &[Event], now: NaiveDateTime) -> Vec<&Event> {
    let minute = truncate_to_minute(now);
    events
        .iter()
        .filter(|event| event.starts_at() == minute)
        .collect()
}

/// Google Calendar template link for a one-hour slot at the event's start.
///
/// The event's wall-clock start is read in the local timezone.
pub fn calendar_export_url(event: &Event) -> String {
    calendar_export_url_in(event, &Local)
}

/// Same as [`calendar_export_url`], reading the start in `tz`.
pub fn calendar_export_url_in<Tz: TimeZone>(event: &Event, tz: &Tz) -> String {
    let start = to_utc(event.starts_at(), tz);
    let end = start + Duration::minutes(CALENDAR_SLOT_MINUTES);
    format!(
        "{CALENDAR_RENDER_URL}?action=TEMPLATE&text={}&dates={}/{}&details={}",
        encode_uri_component(&event.title),
        start.format("%Y%m%dT%H%M%SZ"),
        end.format("%Y%m%dT%H%M%SZ"),
        encode_uri_component(event.description.as_deref().unwrap_or_default()),
    )
}

/// Ambiguous local times take the earlier instant; times inside a DST gap
/// move forward by an hour.
fn to_utc<Tz: TimeZone>(local: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
        })
        .map(|instant| instant.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
fn encode_uri_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(char::from(byte)),
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}
