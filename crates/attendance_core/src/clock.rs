//! Date/time provider used by the store.
//!
//! # Responsibility
//! - Supply "today" and "now" to write and query paths.
//! - Let tests pin the calendar instead of reading the wall clock.
//!
//! # Invariants
//! - `today()` is the date component of `now()` for every provided clock.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use std::cell::Cell;

/// Source of the current local date and time.
pub trait Clock {
    /// Current local date-time, truncated to whole seconds.
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Wall clock in the process local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Manually driven clock for deterministic tests and replays.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Clock pinned to midnight-plus-`seconds` on `date`.
    pub fn at(date: NaiveDate, seconds_into_day: u32) -> Self {
        let time = chrono::NaiveTime::from_num_seconds_from_midnight_opt(seconds_into_day, 0)
            .unwrap_or(chrono::NaiveTime::MIN);
        Self::new(date.and_time(time))
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance_secs(&self, seconds: i64) {
        self.now
            .set(self.now.get() + chrono::Duration::seconds(seconds));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock, SystemClock};
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn fixed_clock_advances_across_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let clock = FixedClock::at(date, 86_399);
        assert_eq!(clock.today(), date);

        clock.advance_secs(1);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn system_clock_has_whole_seconds() {
        let now = SystemClock.now();
        assert_eq!(now.nanosecond(), 0);
        assert_eq!(SystemClock.today(), now.date());
    }
}
