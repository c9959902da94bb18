//! Clock abstraction.
//!
//! Day rotation reads the local wall clock through [`Clock`] so tests can
//! move time forward without sleeping.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use std::sync::Arc;

/// Source of the current local date and time.
pub trait Clock: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Real system clock in the local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Settable clock for tests.
#[derive(Debug)]
pub struct MockClock {
    now: Mutex<NaiveDateTime>,
}

impl MockClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock set to noon of the given date.
    ///
    /// Panics on an invalid date, which is only ever a test typo.
    pub fn at_date(year: i32, month: u32, day: u32) -> Self {
        let now = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid calendar date");
        Self::new(now)
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock_returns_fixed_time() {
        let clock = MockClock::at_date(2024, 1, 1);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_mock_clock_advance_crosses_month() {
        let clock = MockClock::at_date(2024, 1, 31);
        clock.advance_days(1);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        clock.advance(Duration::hours(13));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
    }

    #[test]
    fn test_arc_clock_delegates() {
        let clock = Arc::new(MockClock::at_date(2024, 3, 10));
        let shared: Arc<dyn Clock> = clock.clone();
        clock.advance_days(2);
        assert_eq!(shared.today(), NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
    }

    #[test]
    fn test_system_clock_is_close_to_now() {
        let before = Local::now().naive_local();
        let now = SystemClock.now();
        assert!(now >= before);
    }
}
