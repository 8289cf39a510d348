//! Calendar-aware time slots.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::period::{add_days, last_day_of_month, Period};

/// A sub-interval of the production window, the unit of temporal batching.
///
/// A slot is at most `slot_days` long and never crosses a month boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    period: Period,
}

impl TimeSlot {
    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn start(&self) -> NaiveDate {
        self.period.start()
    }

    pub fn end(&self) -> NaiveDate {
        self.period.end()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.period.fmt(f)
    }
}

/// The slot starting the day after `after`.
///
/// The slot spans `slot_days` days unless the month ends first, in which case
/// it is cut at the last day of the month. A `slot_days` of zero is treated
/// as one.
pub fn next_time_slot(after: NaiveDate, slot_days: u32) -> TimeSlot {
    let start = add_days(after, 1);
    let naive_end = add_days(start, u64::from(slot_days.max(1)) - 1);
    let end = naive_end.min(last_day_of_month(start));
    TimeSlot {
        period: Period::between(start, end),
    }
}

/// Iterator over the contiguous slots covering a window.
#[derive(Debug, Clone)]
pub struct TimeSlots {
    after: Option<NaiveDate>,
    window_end: NaiveDate,
    slot_days: u32,
}

/// Partitions `window` into slots of at most `slot_days` days.
///
/// The first slot starts on the window's first day; the last slot is cut at
/// the window's last day.
pub fn time_slots(window: &Period, slot_days: u32) -> TimeSlots {
    TimeSlots {
        after: window.start().pred_opt(),
        window_end: window.end(),
        slot_days,
    }
}

impl Iterator for TimeSlots {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<TimeSlot> {
        let after = self.after?;
        if after >= self.window_end {
            self.after = None;
            return None;
        }

        let slot = next_time_slot(after, self.slot_days);
        let end = slot.end().min(self.window_end);
        self.after = Some(end);
        Some(TimeSlot {
            period: Period::between(slot.start(), end),
        })
    }
}
