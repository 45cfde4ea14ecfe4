//! Recurrence expansion.
//!
//! Turns a `RecurrencePattern` plus an anchor instant into the concrete
//! occurrences that fall inside a query window. Expansion is a pure
//! function of its inputs and enumerates candidates in ascending order,
//! so it can stop as soon as a bound (max count, end cutoff, window
//! end) is passed.
//!
//! Occurrence indices count every candidate from the anchor forward,
//! not just those inside the window: narrowing the window changes which
//! occurrences are returned but never which index an occurrence has.

use chrono::{DateTime, Datelike, Duration, Months, Utc};

use crate::error::EngineResult;
use crate::pattern::{Frequency, RecurrencePattern};
use crate::timefmt::Window;

/// One materialized instance of a recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// 1-based position in the full series; the anchor is index 1.
    pub index: u32,
    pub time: DateTime<Utc>,
}

#[derive(PartialEq)]
enum Flow {
    Next,
    Stop,
}

/// Tracks the occurrence counter and bound checks while a frequency
/// strategy feeds it candidates in ascending order.
struct Walker<'a> {
    pattern: &'a RecurrencePattern,
    window: &'a Window,
    count: u32,
    out: Vec<Occurrence>,
}

impl<'a> Walker<'a> {
    fn new(pattern: &'a RecurrencePattern, window: &'a Window) -> Self {
        Walker {
            pattern,
            window,
            count: 0,
            out: Vec::new(),
        }
    }

    fn visit(&mut self, candidate: DateTime<Utc>) -> Flow {
        if let Some(end) = self.pattern.end {
            if candidate > end {
                return Flow::Stop;
            }
        }
        self.count += 1;
        if self.pattern.max > 0 && i64::from(self.count) > self.pattern.max {
            return Flow::Stop;
        }
        if candidate > self.window.end {
            return Flow::Stop;
        }
        if candidate >= self.window.start {
            self.out.push(Occurrence {
                index: self.count,
                time: candidate,
            });
        }
        Flow::Next
    }
}

/// Expand a rule anchored at `anchor` into the occurrences inside `window`.
pub fn expand(
    pattern: &RecurrencePattern,
    anchor: DateTime<Utc>,
    window: &Window,
) -> EngineResult<Vec<Occurrence>> {
    pattern.validate()?;
    let mut walker = Walker::new(pattern, window);
    let interval = pattern.interval as i64;

    match pattern.frequency {
        Frequency::Daily => {
            for k in 0.. {
                let candidate = anchor + Duration::days(interval * k);
                if walker.visit(candidate) == Flow::Stop {
                    break;
                }
            }
        }
        Frequency::Weekly => {
            let mut days = pattern.days.clone();
            days.sort_unstable();
            days.dedup();
            let anchor_weekday = anchor.weekday().num_days_from_sunday() as i64;
            'weeks: for week in 0.. {
                for &day in &days {
                    let offset = week * interval * 7 + (i64::from(day) - anchor_weekday);
                    if offset < 0 {
                        // weekday earlier in the anchor's own week
                        continue;
                    }
                    let candidate = anchor + Duration::days(offset);
                    if walker.visit(candidate) == Flow::Stop {
                        break 'weeks;
                    }
                }
            }
        }
        Frequency::Monthly => {
            step_by_months(&mut walker, anchor, pattern.interval);
        }
        Frequency::Yearly => {
            step_by_months(&mut walker, anchor, pattern.interval * 12);
        }
    }

    Ok(walker.out)
}

/// Monthly/yearly stepping. `checked_add_months` preserves the anchor's
/// day-of-month and clamps to the target month's last day when it is
/// shorter (Jan 31 -> Feb 28/29).
fn step_by_months(walker: &mut Walker<'_>, anchor: DateTime<Utc>, months_per_step: u32) {
    for k in 0u32.. {
        let Some(candidate) = anchor.checked_add_months(Months::new(k * months_per_step)) else {
            break;
        };
        if walker.visit(candidate) == Flow::Stop {
            break;
        }
    }
}
