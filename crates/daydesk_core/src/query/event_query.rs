//! Planner event views.
//!
//! # Invariants
//! - Every function borrows the event slice and never mutates it.
//! - Store order is newest-first, so "created" ordering is store order.

use crate::model::event::Event;
use chrono::{Days, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// Default number of entries on the upcoming-events dashboard.
pub const UPCOMING_LIMIT: usize = 5;
const WEEK_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventSort {
    /// Newest first.
    #[default]
    Created,
    /// By date, then time of day.
    Chronological,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCriteria {
    /// Free-text term matched against titles; blank means no filtering.
    pub search: String,
    pub date: Option<NaiveDate>,
    pub sort: EventSort,
}

/// Filters and orders events; stable on equal keys.
pub fn filter_events<'a>(events: &'a [Event], criteria: &EventCriteria) -> Vec<&'a Event> {
    let term = criteria.search.trim().to_lowercase();

    let mut view: Vec<&Event> = events
        .iter()
        .filter(|event| term.is_empty() || event.title.to_lowercase().contains(&term))
        .filter(|event| criteria.date.map_or(true, |date| event.date == date))
        .collect();

    if criteria.sort == EventSort::Chronological {
        view.sort_by_key(|event| event.starts_at());
    }
    view
}

/// Events on one calendar day, in store order.
pub fn events_on(events: &[Event], date: NaiveDate) -> Vec<&Event> {
    filter_events(
        events,
        &EventCriteria {
            date: Some(date),
            ..EventCriteria::default()
        },
    )
}

/// Events starting strictly after `now`, soonest first, at most `limit`.
pub fn upcoming(events: &[Event], now: NaiveDateTime, limit: usize) -> Vec<&Event> {
    let mut view: Vec<&Event> = events
        .iter()
        .filter(|event| event.starts_at() > now)
        .collect();
    view.sort_by_key(|event| event.starts_at());
    view.truncate(limit);
    view
}

/// One day of the weekly overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAgenda<'a> {
    pub date: NaiveDate,
    pub events: Vec<&'a Event>,
}

/// The seven days starting at `today`, each with its events in store order.
pub fn week_view(events: &[Event], today: NaiveDate) -> Vec<DayAgenda<'_>> {
    (0..WEEK_DAYS)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .map(|date| DayAgenda {
            date,
            events: events_on(events, date),
        })
        .collect()
}

/// Number of events per date, for calendar badges.
pub fn day_counts(events: &[Event]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(event.date).or_insert(0) += 1;
    }
    counts
}
