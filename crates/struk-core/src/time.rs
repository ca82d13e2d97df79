//! Clock abstraction for testability.
//!
//! The candidate filter's date window is relative to "today". Going through
//! a [`Clock`] lets tests pin that date.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use struk_core::time::{Clock, FixedClock};
//!
//! let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
//! assert_eq!(clock.days_ago(10), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
//! ```

use chrono::{Days, Local, NaiveDate};

/// Abstraction over the current date.
pub trait Clock: Send + Sync {
    /// Returns today's date.
    fn today(&self) -> NaiveDate;

    /// Returns the date `days` days before today, saturating at the
    /// earliest representable date.
    fn days_ago(&self, days: u32) -> NaiveDate {
        let today = self.today();
        today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// System clock using the local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock frozen at a fixed date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    /// Creates a clock that always reports `today`.
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_days_ago_crosses_month() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(clock.days_ago(2), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(clock.days_ago(0), clock.today());
    }

    #[test]
    fn test_days_ago_saturates() {
        let clock = FixedClock::new(NaiveDate::MIN);
        assert_eq!(clock.days_ago(1), NaiveDate::MIN);
    }

    #[test]
    fn test_system_clock_is_local_today() {
        let today = SystemClock.today();
        assert!(today >= Local::now().date_naive().pred_opt().unwrap());
    }
}
