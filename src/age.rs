//! age.rs
//!
//! Elapsed calendar time between a birth date and "now", as a
//! years / months / days triple:
//!     "X years, Y months, and Z days"
//!
//! Chrono does not provide a built-in year/month/day diff, so the
//! calendar-aware borrowing rules are implemented manually:
//!   • day underflow borrows the length of the month *preceding today's month*
//!   • month underflow borrows 12 months from the years
//!   • February follows the Gregorian leap-year rule
//!
//! The day borrow always uses the month before `today`, never the month
//! before `birth`. Near month boundaries this can leave `days` slightly
//! negative (e.g. Jan 31 -> Mar 1 in a leap year gives -1 days).
//! Birth dates after `today` yield negative years and are passed through.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeBreakdown {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

impl fmt::Display for AgeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} year{}, {} month{}, and {} day{}",
            self.years,
            plural(self.years),
            self.months,
            plural(self.months),
            self.days,
            plural(self.days)
        )
    }
}

/// Parses a date-input value (`YYYY-MM-DD`).
///
/// Empty, malformed and non-existent dates are all the "no date" state.
pub fn parse_birth_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Age at `now` (read as a UTC calendar date), or `None` without a birth date.
pub fn compute(birth: Option<NaiveDate>, now: DateTime<Utc>) -> Option<AgeBreakdown> {
    birth.map(|birth| breakdown(birth, now.date_naive()))
}

pub fn breakdown(birth: NaiveDate, today: NaiveDate) -> AgeBreakdown {
    let mut years = today.year() - birth.year();
    let mut months = today.month() as i32 - birth.month() as i32;
    let mut days = today.day() as i32 - birth.day() as i32;

    // Negative days: take one month and add the length of the month
    // before today's month.
    if days < 0 {
        months -= 1;

        let (prev_year, prev_month) = if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        };

        days += days_in_month(prev_year, prev_month) as i32;
    }

    // Negative months: take one year.
    if months < 0 {
        years -= 1;
        months += 12;
    }

    AgeBreakdown {
        years,
        months,
        days,
    }
}

fn plural(n: i32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

/// Gregorian rule: every 4th year, except centuries not divisible by 400.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
