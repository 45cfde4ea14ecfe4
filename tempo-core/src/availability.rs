//! Conflict detection and free-slot search over a day's occurrences.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::event::{DurationSecs, Event, TimeSlot};
use crate::timefmt::day_bounds;

/// Occurrences whose interval overlaps `[start, start + duration)`.
///
/// Half-open intersection: touching endpoints do not conflict. Returns
/// the empty vec, never an error, when nothing overlaps.
pub fn conflicts(start: DateTime<Utc>, duration: DurationSecs, occurrences: &[Event]) -> Vec<Event> {
    let end = start + duration.to_chrono();
    occurrences
        .iter()
        .filter(|e| start < e.end() && e.time < end)
        .cloned()
        .collect()
}

/// Free slots of at least `min_duration_minutes` between `work_start_hour`
/// and `work_end_hour` on `date`, given the day's occurrences.
///
/// Overlapping occurrences are merged into single covered intervals
/// before gap computation, so double-booked time is not counted free.
pub fn free_slots(
    date: NaiveDate,
    work_start_hour: u32,
    work_end_hour: u32,
    min_duration_minutes: i64,
    occurrences: &[Event],
) -> Vec<TimeSlot> {
    let (day_start, _) = day_bounds(date);
    let work_start = day_start + Duration::hours(i64::from(work_start_hour));
    let work_end = day_start + Duration::hours(i64::from(work_end_hour));
    if work_end <= work_start {
        return Vec::new();
    }

    // Busy intervals clipped to working hours, merged where they overlap
    // or touch.
    let mut busy: Vec<(DateTime<Utc>, DateTime<Utc>)> = occurrences
        .iter()
        .map(|e| (e.time.max(work_start), e.end().min(work_end)))
        .filter(|(s, e)| s < e)
        .collect();
    busy.sort_by_key(|&(s, _)| s);

    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    for (s, e) in busy {
        match merged.last_mut() {
            Some((_, last_end)) if s <= *last_end => {
                if e > *last_end {
                    *last_end = e;
                }
            }
            _ => merged.push((s, e)),
        }
    }

    let min_gap = Duration::minutes(min_duration_minutes);
    let mut slots = Vec::new();
    let mut cursor = work_start;
    for (s, e) in merged {
        if s > cursor && s - cursor >= min_gap {
            slots.push(TimeSlot::new(cursor, s));
        }
        cursor = e;
    }
    if work_end > cursor && work_end - cursor >= min_gap {
        slots.push(TimeSlot::new(cursor, work_end));
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(h: u32, m: u32, mins: i64) -> Event {
        Event {
            id: format!("{h}:{m}"),
            title: "busy".to_string(),
            description: None,
            time: Utc.with_ymd_and_hms(2025, 3, 20, h, m, 0).unwrap(),
            duration: DurationSecs::new(mins * 60).unwrap(),
            category: "work".to_string(),
            recurring: false,
            rule_id: None,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
    }

    #[test]
    fn test_touching_boundary_is_not_a_conflict() {
        let existing = vec![event(10, 30, 30)]; // 10:30-11:00
        let found = conflicts(
            Utc.with_ymd_and_hms(2025, 3, 20, 10, 0, 0).unwrap(),
            DurationSecs::new(30 * 60).unwrap(), // candidate 10:00-10:30
            &existing,
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_overlap_reported() {
        let existing = vec![event(10, 0, 60), event(12, 0, 30)];
        let found = conflicts(
            Utc.with_ymd_and_hms(2025, 3, 20, 10, 30, 0).unwrap(),
            DurationSecs::new(3600).unwrap(),
            &existing,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "10:0");
    }

    #[test]
    fn test_conflict_is_symmetric() {
        let a = event(10, 0, 60);
        let b = event(10, 45, 60);
        assert_eq!(
            conflicts(a.time, a.duration, std::slice::from_ref(&b)).len(),
            conflicts(b.time, b.duration, std::slice::from_ref(&a)).len()
        );
    }

    #[test]
    fn test_free_day_is_one_slot() {
        let slots = free_slots(day(), 9, 17, 30, &[]);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap());
        assert_eq!(slots[0].end, Utc.with_ymd_and_hms(2025, 3, 20, 17, 0, 0).unwrap());
        assert_eq!(slots[0].duration.as_minutes(), 480);
    }

    #[test]
    fn test_gaps_around_events() {
        // 10:00-11:00 and 13:00-14:00 busy within 9-17
        let slots = free_slots(day(), 9, 17, 30, &[event(10, 0, 60), event(13, 0, 60)]);
        let bounds: Vec<(u32, u32)> = slots
            .iter()
            .map(|s| (s.start.format("%H").to_string().parse().unwrap(),
                      s.end.format("%H").to_string().parse().unwrap()))
            .collect();
        assert_eq!(bounds, vec![(9, 10), (11, 13), (14, 17)]);
    }

    #[test]
    fn test_short_gaps_dropped() {
        // 20-minute gap between events, below the 30-minute minimum
        let slots = free_slots(day(), 9, 12, 30, &[event(9, 0, 60), event(10, 20, 60)]);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, Utc.with_ymd_and_hms(2025, 3, 20, 11, 20, 0).unwrap());
    }

    #[test]
    fn test_overlapping_events_merged() {
        // 10:00-11:30 and 11:00-12:00 overlap; free time should not
        // reappear between them.
        let slots = free_slots(day(), 9, 17, 1, &[event(10, 0, 90), event(11, 0, 60)]);
        let free: i64 = slots.iter().map(|s| s.duration.as_minutes()).sum();
        // 8h working span minus 2h merged busy
        assert_eq!(free, 6 * 60);
    }

    #[test]
    fn test_free_plus_busy_covers_working_span() {
        let events = vec![event(9, 30, 45), event(9, 45, 90), event(14, 0, 60)];
        let slots = free_slots(day(), 9, 17, 1, &events);

        let mut busy: Vec<(DateTime<Utc>, DateTime<Utc>)> =
            events.iter().map(|e| (e.time, e.end())).collect();
        busy.sort_by_key(|&(s, _)| s);
        let mut merged_minutes = 0;
        let mut cursor: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
        for (s, e) in busy {
            match &mut cursor {
                Some((_, ce)) if s <= *ce => *ce = (*ce).max(e),
                _ => {
                    if let Some((cs, ce)) = cursor {
                        merged_minutes += (ce - cs).num_minutes();
                    }
                    cursor = Some((s, e));
                }
            }
        }
        if let Some((cs, ce)) = cursor {
            merged_minutes += (ce - cs).num_minutes();
        }

        let free: i64 = slots.iter().map(|s| s.duration.as_minutes()).sum();
        assert_eq!(free + merged_minutes, 8 * 60);
    }

    #[test]
    fn test_event_outside_working_hours_ignored() {
        let slots = free_slots(day(), 9, 17, 30, &[event(7, 0, 60), event(18, 0, 60)]);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].duration.as_minutes(), 480);
    }
}
