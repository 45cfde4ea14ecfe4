//! Timestamp parsing/formatting and query-window math.
//!
//! The wire format for instants is the local-style `YYYY-MM-DD HH:MM`
//! string; RFC 3339 is accepted on input for clients that send ISO
//! timestamps. All instants are interpreted against a single fixed UTC
//! reference (time-zone databases are out of scope).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{EngineError, EngineResult};

const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse an instant from either `YYYY-MM-DD HH:MM` or RFC 3339.
pub fn parse_instant(s: &str) -> EngineResult<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, WIRE_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| EngineError::InvalidTimestamp(s.to_string()))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| EngineError::InvalidDate(s.to_string()))
}

/// Format an instant for the wire (`YYYY-MM-DD HH:MM`).
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format(WIRE_FORMAT).to_string()
}

/// Start-of-day and end-of-day instants for a calendar date.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let end = date.and_hms_opt(23, 59, 59).unwrap().and_utc();
    (start, end)
}

/// Inclusive `[start, end]` query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Build a window, rejecting `end < start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::WindowOutOfRange {
                start: format_instant(start),
                end: format_instant(end),
            });
        }
        Ok(Window { start, end })
    }

    /// Window spanning a whole calendar day.
    pub fn for_day(date: NaiveDate) -> Self {
        let (start, end) = day_bounds(date);
        Window { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Serde adapter for `DateTime<Utc>` fields using the wire format.
pub mod serde_instant {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&super::format_instant(*dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(de)?;
        super::parse_instant(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional instants (e.g. a pattern's `end` cutoff).
pub mod serde_opt_instant {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, ser: S) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => ser.serialize_some(&super::format_instant(*dt)),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let s: Option<String> = Option::deserialize(de)?;
        match s.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => super::parse_instant(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
