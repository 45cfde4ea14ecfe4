//! Core engine for the tempo scheduling system.
//!
//! This crate holds everything with algorithmic content, kept free of I/O:
//! - `event` / `pattern` for the data model (events, recurrence rules)
//! - `expand` for materializing recurrence rules into concrete occurrences
//! - `availability` for conflict detection and free-slot search
//! - `stats` for aggregate statistics over a window
//! - `wake` for computing the next wake trigger from a day's events
//! - `store` for the persistence seam (`EventStore` trait + in-memory impl)
//! - `engine` for the request-level facade that ties a store to the
//!   pure computations above
//!
//! All operations are pure, synchronous and stateless: given identical
//! inputs they produce identical outputs, so callers are free to retry.

pub mod availability;
pub mod engine;
pub mod error;
pub mod event;
pub mod expand;
pub mod pattern;
pub mod stats;
pub mod store;
pub mod timefmt;
pub mod wake;

// Re-export the main types at crate root for convenience
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use event::{DurationSecs, Event, TimeSlot};
pub use expand::{expand, Occurrence};
pub use pattern::{Frequency, PatternBuilder, RecurrencePattern};
pub use stats::EventStats;
pub use store::{EventPatch, EventStore, MemoryStore, RecurringRule};
pub use timefmt::Window;
pub use wake::{WakeConfig, WakePreview};
