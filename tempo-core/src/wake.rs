//! Wake-time preview.
//!
//! Computes when a wake trigger should fire for a given day: the
//! configured baseline, or lead time before the day's earliest event,
//! whichever applies. Pure computation; scheduling the trigger itself
//! is a delivery concern outside the engine.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::timefmt::serde_opt_instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeConfig {
    /// Baseline wake time on event-free days.
    pub baseline_time: NaiveTime,
    /// Minutes of lead before the day's first event.
    pub lead_minutes: i64,
    /// Skip the wake entirely on days without events.
    pub only_when_events: bool,
    /// Skip the baseline wake on Saturday/Sunday.
    pub skip_weekends: bool,
}

impl Default for WakeConfig {
    fn default() -> Self {
        WakeConfig {
            baseline_time: NaiveTime::from_hms_opt(2, 0, 0).unwrap(),
            lead_minutes: 45,
            only_when_events: false,
            skip_weekends: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WakeReason {
    Baseline,
    EarliestMinusLead,
    NoEventsSkip,
    WeekendSkip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakePreview {
    /// `None` when the wake is skipped for the day.
    #[serde(rename = "wakeTime", with = "serde_opt_instant")]
    pub wake_time: Option<chrono::DateTime<chrono::Utc>>,
    pub reason: WakeReason,
    /// Up to the first three events motivating the wake.
    #[serde(rename = "firstEvents")]
    pub first_events: Vec<Event>,
}

/// Preview the wake decision for `date` given that day's occurrences.
pub fn preview(date: NaiveDate, occurrences: &[Event], config: &WakeConfig) -> WakePreview {
    let mut events = occurrences.to_vec();
    events.sort_by_key(|e| e.time);
    let first_events: Vec<Event> = events.iter().take(3).cloned().collect();

    let baseline = date.and_time(config.baseline_time).and_utc();

    if events.is_empty() {
        if config.only_when_events {
            return WakePreview {
                wake_time: None,
                reason: WakeReason::NoEventsSkip,
                first_events,
            };
        }
        if config.skip_weekends
            && matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
        {
            return WakePreview {
                wake_time: None,
                reason: WakeReason::WeekendSkip,
                first_events,
            };
        }
        return WakePreview {
            wake_time: Some(baseline),
            reason: WakeReason::Baseline,
            first_events,
        };
    }

    let candidate = events[0].time - Duration::minutes(config.lead_minutes);
    if config.only_when_events || candidate < baseline {
        return WakePreview {
            wake_time: Some(candidate),
            reason: WakeReason::EarliestMinusLead,
            first_events,
        };
    }
    WakePreview {
        wake_time: Some(baseline),
        reason: WakeReason::Baseline,
        first_events,
    }
}
