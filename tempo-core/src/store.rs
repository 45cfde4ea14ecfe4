//! Persistence seam for events and recurrence rules.
//!
//! The engine owns no persistent state; it only needs the narrow read
//! and write contract captured by `EventStore`. `MemoryStore` is the
//! in-process implementation; a database-backed store would implement
//! the same trait and surface its failures as `EngineError::Store`.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::event::{DurationSecs, Event};
use crate::pattern::RecurrencePattern;
use crate::timefmt::Window;

/// A recurring master event together with its rule and the occurrence
/// instants excluded by per-occurrence deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringRule {
    #[serde(flatten)]
    pub event: Event,
    pub pattern: RecurrencePattern,
    #[serde(skip)]
    pub exclusions: BTreeSet<DateTime<Utc>>,
}

impl RecurringRule {
    /// Materialize the occurrence of this rule at `time` as a transient
    /// event carrying a back-reference to the rule.
    pub fn occurrence_at(&self, time: DateTime<Utc>) -> Event {
        Event {
            id: self.event.id.clone(),
            title: self.event.title.clone(),
            description: self.event.description.clone(),
            time,
            duration: self.event.duration,
            category: self.event.category.clone(),
            recurring: true,
            rule_id: Some(self.event.id.clone()),
        }
    }
}

/// Partial update for a stored event. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "crate::timefmt::serde_opt_instant")]
    pub time: Option<DateTime<Utc>>,
    pub duration: Option<DurationSecs>,
    pub category: Option<String>,
}

/// Read/write contract the engine requires from persistence.
///
/// Reads must return a consistent snapshot per call; soft-deleted
/// records never surface in any read.
pub trait EventStore {
    /// Live one-off events whose span intersects the window.
    fn events_overlapping(&self, window: &Window) -> EngineResult<Vec<Event>>;
    /// Live recurring rules that could produce occurrences in the window.
    fn rules_overlapping(&self, window: &Window) -> EngineResult<Vec<RecurringRule>>;
    /// All live recurring rules.
    fn all_rules(&self) -> EngineResult<Vec<RecurringRule>>;

    fn get(&self, id: &str) -> EngineResult<Event>;

    fn create_event(&self, event: Event) -> EngineResult<()>;
    fn create_rule(&self, event: Event, pattern: RecurrencePattern) -> EngineResult<()>;
    fn update_event(&self, id: &str, patch: EventPatch) -> EngineResult<Event>;
    fn replace_rule(
        &self,
        id: &str,
        event: Event,
        pattern: RecurrencePattern,
    ) -> EngineResult<RecurringRule>;

    /// Delete a record: `soft` tombstones it (recoverable), otherwise it
    /// is removed for good.
    fn delete(&self, id: &str, soft: bool) -> EngineResult<()>;
    /// Record a per-occurrence exclusion against a recurring rule, so
    /// re-expansion no longer produces that instant.
    fn exclude_occurrence(&self, rule_id: &str, instant: DateTime<Utc>) -> EngineResult<()>;
}

#[derive(Debug, Clone)]
struct StoredRecord {
    event: Event,
    pattern: Option<RecurrencePattern>,
    exclusions: BTreeSet<DateTime<Utc>>,
    deleted: bool,
}

impl StoredRecord {
    fn live(&self) -> bool {
        !self.deleted
    }
}

/// In-memory store. Every read clones under a single lock acquisition,
/// which gives the snapshot consistency the engine requires.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, StoredRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn read(&self) -> EngineResult<std::sync::RwLockReadGuard<'_, HashMap<String, StoredRecord>>> {
        self.records
            .read()
            .map_err(|_| EngineError::Store("store lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> EngineResult<std::sync::RwLockWriteGuard<'_, HashMap<String, StoredRecord>>> {
        self.records
            .write()
            .map_err(|_| EngineError::Store("store lock poisoned".to_string()))
    }
}

impl EventStore for MemoryStore {
    fn events_overlapping(&self, window: &Window) -> EngineResult<Vec<Event>> {
        let records = self.read()?;
        Ok(records
            .values()
            .filter(|r| r.live() && r.pattern.is_none())
            .filter(|r| r.event.time <= window.end && r.event.end() > window.start)
            .map(|r| r.event.clone())
            .collect())
    }

    fn rules_overlapping(&self, window: &Window) -> EngineResult<Vec<RecurringRule>> {
        let records = self.read()?;
        Ok(records
            .values()
            .filter(|r| r.live() && r.pattern.is_some())
            .filter(|r| {
                // anchor past the window end can't produce anything;
                // a rule cutoff before the window start can't either
                r.event.time <= window.end
                    && r.pattern
                        .as_ref()
                        .and_then(|p| p.end)
                        .map_or(true, |end| end >= window.start)
            })
            .map(|r| RecurringRule {
                event: r.event.clone(),
                pattern: r.pattern.clone().unwrap(),
                exclusions: r.exclusions.clone(),
            })
            .collect())
    }

    fn all_rules(&self) -> EngineResult<Vec<RecurringRule>> {
        let records = self.read()?;
        let mut rules: Vec<RecurringRule> = records
            .values()
            .filter(|r| r.live() && r.pattern.is_some())
            .map(|r| RecurringRule {
                event: r.event.clone(),
                pattern: r.pattern.clone().unwrap(),
                exclusions: r.exclusions.clone(),
            })
            .collect();
        rules.sort_by_key(|r| r.event.time);
        Ok(rules)
    }

    fn get(&self, id: &str) -> EngineResult<Event> {
        let records = self.read()?;
        records
            .get(id)
            .filter(|r| r.live())
            .map(|r| r.event.clone())
            .ok_or_else(|| EngineError::NotFound(format!("event '{id}'")))
    }

    fn create_event(&self, event: Event) -> EngineResult<()> {
        let mut records = self.write()?;
        if records.contains_key(&event.id) {
            return Err(EngineError::InvalidEvent(format!(
                "id '{}' already exists",
                event.id
            )));
        }
        records.insert(
            event.id.clone(),
            StoredRecord {
                event,
                pattern: None,
                exclusions: BTreeSet::new(),
                deleted: false,
            },
        );
        Ok(())
    }

    fn create_rule(&self, event: Event, pattern: RecurrencePattern) -> EngineResult<()> {
        pattern.validate()?;
        let mut records = self.write()?;
        if records.contains_key(&event.id) {
            return Err(EngineError::InvalidEvent(format!(
                "id '{}' already exists",
                event.id
            )));
        }
        records.insert(
            event.id.clone(),
            StoredRecord {
                event,
                pattern: Some(pattern),
                exclusions: BTreeSet::new(),
                deleted: false,
            },
        );
        Ok(())
    }

    fn update_event(&self, id: &str, patch: EventPatch) -> EngineResult<Event> {
        let mut records = self.write()?;
        let record = records
            .get_mut(id)
            .filter(|r| r.live())
            .ok_or_else(|| EngineError::NotFound(format!("event '{id}'")))?;
        if let Some(title) = patch.title {
            record.event.title = title;
        }
        if let Some(description) = patch.description {
            record.event.description = Some(description);
        }
        if let Some(time) = patch.time {
            record.event.time = time;
        }
        if let Some(duration) = patch.duration {
            record.event.duration = duration;
        }
        if let Some(category) = patch.category {
            record.event.category = category;
        }
        Ok(record.event.clone())
    }

    fn replace_rule(
        &self,
        id: &str,
        event: Event,
        pattern: RecurrencePattern,
    ) -> EngineResult<RecurringRule> {
        pattern.validate()?;
        let mut records = self.write()?;
        let record = records
            .get_mut(id)
            .filter(|r| r.live() && r.pattern.is_some())
            .ok_or_else(|| EngineError::NotFound(format!("recurring event '{id}'")))?;
        record.event = event;
        record.pattern = Some(pattern);
        // a new rule invalidates old per-occurrence exclusions
        record.exclusions.clear();
        Ok(RecurringRule {
            event: record.event.clone(),
            pattern: record.pattern.clone().unwrap(),
            exclusions: record.exclusions.clone(),
        })
    }

    fn delete(&self, id: &str, soft: bool) -> EngineResult<()> {
        let mut records = self.write()?;
        if soft {
            let record = records
                .get_mut(id)
                .filter(|r| r.live())
                .ok_or_else(|| EngineError::NotFound(format!("event '{id}'")))?;
            record.deleted = true;
            Ok(())
        } else {
            records
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| EngineError::NotFound(format!("event '{id}'")))
        }
    }

    fn exclude_occurrence(&self, rule_id: &str, instant: DateTime<Utc>) -> EngineResult<()> {
        let mut records = self.write()?;
        let record = records
            .get_mut(rule_id)
            .filter(|r| r.live() && r.pattern.is_some())
            .ok_or_else(|| EngineError::NotFound(format!("recurring event '{rule_id}'")))?;
        record.exclusions.insert(instant);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Frequency, UNBOUNDED};
    use chrono::TimeZone;

    fn event(id: &str, day: u32) -> Event {
        Event {
            id: id.to_string(),
            title: "e".to_string(),
            description: None,
            time: Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap(),
            duration: DurationSecs::new(3600).unwrap(),
            category: "work".to_string(),
            recurring: false,
            rule_id: None,
        }
    }

    fn daily_pattern() -> RecurrencePattern {
        RecurrencePattern {
            frequency: Frequency::Daily,
            interval: 1,
            days: vec![],
            max: UNBOUNDED,
            end: None,
        }
    }

    fn march() -> Window {
        Window::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let store = MemoryStore::new();
        store.create_event(event("a", 20)).unwrap();
        assert_eq!(store.get("a").unwrap().id, "a");
        assert!(matches!(store.get("b"), Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = MemoryStore::new();
        store.create_event(event("a", 20)).unwrap();
        assert!(store.create_event(event("a", 21)).is_err());
    }

    #[test]
    fn test_soft_delete_hides_record() {
        let store = MemoryStore::new();
        store.create_event(event("a", 20)).unwrap();
        store.delete("a", true).unwrap();
        assert!(store.get("a").is_err());
        assert!(store.events_overlapping(&march()).unwrap().is_empty());
        // deleting a tombstone again is NotFound
        assert!(store.delete("a", true).is_err());
    }

    #[test]
    fn test_hard_delete_removes_record() {
        let store = MemoryStore::new();
        store.create_event(event("a", 20)).unwrap();
        store.delete("a", false).unwrap();
        assert!(store.delete("a", false).is_err());
    }

    #[test]
    fn test_window_filter() {
        let store = MemoryStore::new();
        store.create_event(event("in", 20)).unwrap();
        let mut out = event("out", 20);
        out.time = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        store.create_event(out).unwrap();
        let found = store.events_overlapping(&march()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "in");
    }

    #[test]
    fn test_patch_updates_only_given_fields() {
        let store = MemoryStore::new();
        store.create_event(event("a", 20)).unwrap();
        let updated = store
            .update_event(
                "a",
                EventPatch {
                    title: Some("renamed".to_string()),
                    ..EventPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.category, "work");
    }

    #[test]
    fn test_rules_are_not_plain_events() {
        let store = MemoryStore::new();
        let mut master = event("r", 20);
        master.recurring = true;
        store.create_rule(master, daily_pattern()).unwrap();
        assert!(store.events_overlapping(&march()).unwrap().is_empty());
        assert_eq!(store.rules_overlapping(&march()).unwrap().len(), 1);
    }

    #[test]
    fn test_exclusion_requires_live_rule() {
        let store = MemoryStore::new();
        store.create_event(event("a", 20)).unwrap();
        let instant = Utc.with_ymd_and_hms(2025, 3, 21, 10, 0, 0).unwrap();
        assert!(store.exclude_occurrence("a", instant).is_err());

        let mut master = event("r", 20);
        master.recurring = true;
        store.create_rule(master, daily_pattern()).unwrap();
        store.exclude_occurrence("r", instant).unwrap();
        assert!(store.rules_overlapping(&march()).unwrap()[0]
            .exclusions
            .contains(&instant));
    }

    #[test]
    fn test_replace_rule_clears_exclusions() {
        let store = MemoryStore::new();
        let mut master = event("r", 20);
        master.recurring = true;
        store.create_rule(master.clone(), daily_pattern()).unwrap();
        let instant = Utc.with_ymd_and_hms(2025, 3, 21, 10, 0, 0).unwrap();
        store.exclude_occurrence("r", instant).unwrap();

        let rule = store.replace_rule("r", master, daily_pattern()).unwrap();
        assert!(rule.exclusions.is_empty());
    }

    #[test]
    fn test_invalid_pattern_rejected_on_create() {
        let store = MemoryStore::new();
        let mut master = event("r", 20);
        master.recurring = true;
        let bad = RecurrencePattern {
            interval: 0,
            ..daily_pattern()
        };
        assert!(store.create_rule(master, bad).is_err());
    }
}
