//! Aggregate statistics over an expanded event set.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::timefmt::Window;

/// How many top buckets the busiest-day/hour histograms keep.
const TOP_BUCKETS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourCount {
    pub hour: u32,
    pub count: u64,
}

/// Aggregate stats for one query window. Derived and read-only,
/// recomputed per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventStats {
    pub total_events: u64,
    pub total_minutes: i64,
    /// Counts keyed by the category string verbatim; unknown or empty
    /// categories keep their literal value.
    pub events_by_category: BTreeMap<String, u64>,
    pub busiest_days: Vec<DayCount>,
    pub busiest_hours: Vec<HourCount>,
}

/// Compute stats over the events whose start instant falls in `window`.
///
/// Histograms bucket by calendar day / hour-of-day of the start instant
/// and keep the top entries by count, ties broken by the earlier
/// day/hour (BTreeMap iteration order plus a stable sort).
pub fn aggregate(events: &[Event], window: &Window) -> EventStats {
    let mut stats = EventStats::default();
    let mut by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut by_hour: BTreeMap<u32, u64> = BTreeMap::new();

    for event in events.iter().filter(|e| window.contains(e.time)) {
        stats.total_events += 1;
        stats.total_minutes += event.duration.as_minutes();
        *stats
            .events_by_category
            .entry(event.category.clone())
            .or_insert(0) += 1;
        *by_day.entry(event.time.date_naive()).or_insert(0) += 1;
        *by_hour.entry(event.time.hour()).or_insert(0) += 1;
    }

    stats.busiest_days = top_buckets(by_day)
        .map(|(date, count)| DayCount { date, count })
        .collect();
    stats.busiest_hours = top_buckets(by_hour)
        .map(|(hour, count)| HourCount { hour, count })
        .collect();
    stats
}

fn top_buckets<K: Ord>(buckets: BTreeMap<K, u64>) -> impl Iterator<Item = (K, u64)> {
    let mut pairs: Vec<(K, u64)> = buckets.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
    pairs.into_iter().take(TOP_BUCKETS)
}
