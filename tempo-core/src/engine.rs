//! Request-level facade over a store.
//!
//! Ties the store's snapshot reads to the pure computations: expansion,
//! conflict detection, free-slot search, stats and wake preview. An
//! `Engine` is constructed per request over a store reference; it holds
//! no state of its own.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::availability;
use crate::error::EngineResult;
use crate::event::{DurationSecs, Event, TimeSlot};
use crate::expand::expand;
use crate::stats::{aggregate, EventStats};
use crate::store::EventStore;
use crate::timefmt::Window;
use crate::wake::{preview, WakeConfig, WakePreview};

/// How far ahead "next event" looks.
const NEXT_EVENT_HORIZON_DAYS: i64 = 366;
/// How many days forward the next-available-slot search scans.
const SLOT_SEARCH_DAYS: i64 = 30;

pub struct Engine<'a, S: EventStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: EventStore + ?Sized> Engine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Engine { store }
    }

    /// Events in the window, ordered by start time.
    ///
    /// With `expanded`, recurrence rules are materialized into their
    /// occurrences (excluded instants skipped) and merged with the
    /// one-off events. Without it, the raw master records are returned
    /// alongside the one-offs.
    pub fn events_in_window(&self, window: &Window, expanded: bool) -> EngineResult<Vec<Event>> {
        let mut events = self.store.events_overlapping(window)?;
        for rule in self.store.rules_overlapping(window)? {
            if expanded {
                for occ in expand(&rule.pattern, rule.event.time, window)? {
                    if rule.exclusions.contains(&occ.time) {
                        continue;
                    }
                    events.push(rule.occurrence_at(occ.time));
                }
            } else {
                events.push(rule.event);
            }
        }
        events.sort_by_key(|e| e.time);
        Ok(events)
    }

    /// The next occurrence strictly after `after`, expanding rules.
    pub fn next_event(&self, after: DateTime<Utc>) -> EngineResult<Option<Event>> {
        let window = Window::new(after, after + Duration::days(NEXT_EVENT_HORIZON_DAYS))?;
        let events = self.events_in_window(&window, true)?;
        Ok(events.into_iter().find(|e| e.time > after))
    }

    /// Occurrences conflicting with `[start, start + duration)`.
    pub fn conflicts_at(
        &self,
        start: DateTime<Utc>,
        duration: DurationSecs,
    ) -> EngineResult<Vec<Event>> {
        let day = self.day_occurrences(start.date_naive())?;
        Ok(availability::conflicts(start, duration, &day))
    }

    /// Free slots on `date` within working hours.
    pub fn free_slots_on(
        &self,
        date: NaiveDate,
        work_start_hour: u32,
        work_end_hour: u32,
        min_duration_minutes: i64,
    ) -> EngineResult<Vec<TimeSlot>> {
        let day = self.day_occurrences(date)?;
        Ok(availability::free_slots(
            date,
            work_start_hour,
            work_end_hour,
            min_duration_minutes,
            &day,
        ))
    }

    /// First slot of at least `duration_minutes` after `after`, scanning
    /// up to 30 days forward. Falls back to a slot at the scan horizon
    /// when every day is full.
    pub fn next_available_slot(
        &self,
        duration_minutes: i64,
        after: DateTime<Utc>,
        work_start_hour: u32,
        work_end_hour: u32,
    ) -> EngineResult<TimeSlot> {
        let duration = Duration::minutes(duration_minutes);
        for offset in 0..SLOT_SEARCH_DAYS {
            let date = (after + Duration::days(offset)).date_naive();
            let slots =
                self.free_slots_on(date, work_start_hour, work_end_hour, duration_minutes)?;
            if let Some(slot) = slots.iter().find(|s| s.start >= after) {
                return Ok(TimeSlot::new(slot.start, slot.start + duration));
            }
        }
        let start = after + Duration::days(SLOT_SEARCH_DAYS);
        Ok(TimeSlot::new(start, start + duration))
    }

    /// Aggregate stats over the expanded event set in the window.
    pub fn stats(&self, window: &Window) -> EngineResult<EventStats> {
        let events = self.events_in_window(window, true)?;
        Ok(aggregate(&events, window))
    }

    /// Wake preview for a calendar day.
    pub fn wake_preview(&self, date: NaiveDate, config: &WakeConfig) -> EngineResult<WakePreview> {
        let day = self.day_occurrences(date)?;
        Ok(preview(date, &day, config))
    }

    fn day_occurrences(&self, date: NaiveDate) -> EngineResult<Vec<Event>> {
        self.events_in_window(&Window::for_day(date), true)
    }
}
