//! Recurrence pattern model and validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::timefmt::serde_opt_instant;

/// Sentinel for "no occurrence cap".
pub const UNBOUNDED: i64 = -1;

/// Natural repetition unit of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A recurrence rule: "every `interval` units, on `days` (weekly only),
/// at most `max` occurrences, never past `end`".
///
/// When both `max` and `end` are set, whichever bound is reached first
/// stops generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrencePattern {
    #[serde(rename = "type")]
    pub frequency: Frequency,
    /// Repeat every N units. Must be >= 1.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Weekday ordinals 0-6 (Sunday = 0). Required non-empty for weekly.
    #[serde(default)]
    pub days: Vec<u8>,
    /// Maximum occurrence count, `-1` for unbounded.
    #[serde(default = "default_max")]
    pub max: i64,
    /// Optional absolute cutoff; no occurrence may fall after it.
    #[serde(default, with = "serde_opt_instant")]
    pub end: Option<DateTime<Utc>>,
}

fn default_interval() -> u32 {
    1
}

fn default_max() -> i64 {
    UNBOUNDED
}

impl RecurrencePattern {
    /// Check the pattern invariants. Never auto-corrects: a bad pattern
    /// is rejected before expansion and before persistence.
    pub fn validate(&self) -> EngineResult<()> {
        if self.interval < 1 {
            return Err(EngineError::InvalidPattern(
                "interval must be at least 1".to_string(),
            ));
        }
        if self.frequency == Frequency::Weekly && self.days.is_empty() {
            return Err(EngineError::InvalidPattern(
                "weekly pattern requires at least one weekday".to_string(),
            ));
        }
        if let Some(&bad) = self.days.iter().find(|&&d| d > 6) {
            return Err(EngineError::InvalidPattern(format!(
                "weekday ordinal {bad} is outside 0-6"
            )));
        }
        if self.max != UNBOUNDED && self.max <= 0 {
            return Err(EngineError::InvalidPattern(format!(
                "max must be positive or -1 for unbounded, got {}",
                self.max
            )));
        }
        Ok(())
    }
}

/// Step-by-step pattern construction, for callers that assemble a rule
/// incrementally (e.g. a wizard UI). `finish` validates the whole thing.
#[derive(Debug, Default, Clone)]
pub struct PatternBuilder {
    frequency: Option<Frequency>,
    interval: u32,
    days: Vec<u8>,
    max: Option<i64>,
    end: Option<DateTime<Utc>>,
}

impl PatternBuilder {
    pub fn new(frequency: Frequency) -> Self {
        PatternBuilder {
            frequency: Some(frequency),
            interval: 1,
            ..Default::default()
        }
    }

    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn days(mut self, days: Vec<u8>) -> Self {
        self.days = days;
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn finish(self) -> EngineResult<RecurrencePattern> {
        let frequency = self
            .frequency
            .ok_or_else(|| EngineError::InvalidPattern("missing frequency".to_string()))?;
        let pattern = RecurrencePattern {
            frequency,
            interval: self.interval,
            days: self.days,
            max: self.max.unwrap_or(UNBOUNDED),
            end: self.end,
        };
        pattern.validate()?;
        Ok(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily() -> RecurrencePattern {
        RecurrencePattern {
            frequency: Frequency::Daily,
            interval: 1,
            days: vec![],
            max: UNBOUNDED,
            end: None,
        }
    }

    #[test]
    fn test_valid_daily_pattern() {
        assert!(daily().validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let p = RecurrencePattern {
            interval: 0,
            ..daily()
        };
        assert!(matches!(p.validate(), Err(EngineError::InvalidPattern(_))));
    }

    #[test]
    fn test_weekly_requires_days() {
        let p = RecurrencePattern {
            frequency: Frequency::Weekly,
            ..daily()
        };
        assert!(p.validate().is_err());
        let p = RecurrencePattern {
            frequency: Frequency::Weekly,
            days: vec![1, 3],
            ..daily()
        };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_weekday_ordinal_out_of_range() {
        let p = RecurrencePattern {
            frequency: Frequency::Weekly,
            days: vec![1, 7],
            ..daily()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_max_zero_rejected_but_sentinel_allowed() {
        let p = RecurrencePattern { max: 0, ..daily() };
        assert!(p.validate().is_err());
        let p = RecurrencePattern { max: -1, ..daily() };
        assert!(p.validate().is_ok());
        let p = RecurrencePattern { max: -5, ..daily() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_pattern_deserializes_wire_shape() {
        let p: RecurrencePattern =
            serde_json::from_str(r#"{"type":"weekly","interval":2,"days":[1,3],"max":10}"#)
                .unwrap();
        assert_eq!(p.frequency, Frequency::Weekly);
        assert_eq!(p.interval, 2);
        assert_eq!(p.days, vec![1, 3]);
        assert_eq!(p.max, 10);
        assert!(p.end.is_none());
    }

    #[test]
    fn test_builder_validates_on_finish() {
        let err = PatternBuilder::new(Frequency::Weekly).finish();
        assert!(err.is_err());

        let p = PatternBuilder::new(Frequency::Weekly)
            .days(vec![1, 3])
            .interval(1)
            .max(4)
            .finish()
            .unwrap();
        assert_eq!(p.max, 4);
    }
}
