//! Event and time-slot types.
//!
//! An `Event` is one concrete scheduled item: either a stored one-off
//! event, the master record of a recurring rule, or a transient
//! occurrence materialized by expansion. Durations are carried in a
//! seconds newtype so that the seconds-on-the-wire rule is enforced by
//! the type system rather than by convention.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::timefmt::serde_instant;

/// A duration in whole seconds. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DurationSecs(i64);

impl<'de> Deserialize<'de> for DurationSecs {
    fn deserialize<D: serde::Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let secs = i64::deserialize(de)?;
        DurationSecs::new(secs).map_err(serde::de::Error::custom)
    }
}

impl DurationSecs {
    pub fn new(secs: i64) -> EngineResult<Self> {
        if secs <= 0 {
            return Err(EngineError::InvalidEvent(format!(
                "duration must be positive, got {secs}s"
            )));
        }
        Ok(DurationSecs(secs))
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    pub fn as_minutes(&self) -> i64 {
        self.0 / 60
    }

    pub fn to_chrono(&self) -> Duration {
        Duration::seconds(self.0)
    }
}

/// A scheduled event.
///
/// `rule_id` back-references the recurring rule a materialized
/// occurrence came from; it is `None` for one-off events and for the
/// master record itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "serde_instant")]
    pub time: DateTime<Utc>,
    /// Duration in seconds (wire unit; presentation layers convert).
    pub duration: DurationSecs,
    /// Free-form category tag. `work|personal|task|meeting` carry UI
    /// meaning but any string is accepted verbatim.
    pub category: String,
    pub recurring: bool,
    pub rule_id: Option<String>,
}

impl Event {
    /// End instant of the half-open interval `[time, time + duration)`.
    pub fn end(&self) -> DateTime<Utc> {
        self.time + self.duration.to_chrono()
    }

    /// Half-open interval overlap; touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Event) -> bool {
        self.time < other.end() && other.time < self.end()
    }
}

/// A free interval found by the slot finder. Derived output, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "serde_instant")]
    pub start: DateTime<Utc>,
    #[serde(with = "serde_instant")]
    pub end: DateTime<Utc>,
    /// Slot length in seconds.
    pub duration: DurationSecs,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimeSlot {
            start,
            end,
            duration: DurationSecs((end - start).num_seconds().max(1)),
        }
    }
}
