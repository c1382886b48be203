//! Upcoming-birthday arithmetic.
//!
//! A birthday is "upcoming" when its next occurrence falls within a trailing
//! window of `days` starting today, including the year-end wrap (a December 30
//! query window of 7 days covers early-January birthdays).

use chrono::{Datelike, NaiveDate};

/// Next occurrence of `birth_date` on or after `today`.
///
/// Feb 29 birthdays land on Mar 1 in non-leap years.
pub fn next_birthday(birth_date: NaiveDate, today: NaiveDate) -> NaiveDate {
    let this_year = on_year(birth_date, today.year());
    if this_year >= today {
        this_year
    } else {
        on_year(birth_date, today.year() + 1)
    }
}

/// Whether the next occurrence of `birth_date` is within `days` of `today`
/// (inclusive).
pub fn birthday_within(birth_date: NaiveDate, today: NaiveDate, days: u32) -> bool {
    (next_birthday(birth_date, today) - today).num_days() <= i64::from(days)
}

fn on_year(date: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn birthday_later_this_year() {
        let today = d(2026, 6, 1);
        assert_eq!(next_birthday(d(1990, 6, 5), today), d(2026, 6, 5));
        assert!(birthday_within(d(1990, 6, 5), today, 7));
        assert!(!birthday_within(d(1990, 6, 9), today, 7));
    }

    #[test]
    fn today_counts() {
        let today = d(2026, 6, 1);
        assert!(birthday_within(d(1990, 6, 1), today, 7));
    }

    #[test]
    fn already_passed_rolls_to_next_year() {
        let today = d(2026, 6, 1);
        assert_eq!(next_birthday(d(1990, 5, 20), today), d(2027, 5, 20));
        assert!(!birthday_within(d(1990, 5, 20), today, 30));
    }

    #[test]
    fn window_wraps_across_year_end() {
        let today = d(2026, 12, 30);
        assert!(birthday_within(d(1990, 1, 3), today, 7));
        assert!(!birthday_within(d(1990, 1, 15), today, 7));
    }

    #[test]
    fn window_wraps_across_month_end() {
        let today = d(2026, 6, 28);
        assert!(birthday_within(d(1990, 7, 2), today, 7));
    }

    #[test]
    fn leap_day_maps_to_march_first() {
        // 2027 is not a leap year.
        let today = d(2027, 2, 25);
        assert_eq!(next_birthday(d(1992, 2, 29), today), d(2027, 3, 1));
        assert!(birthday_within(d(1992, 2, 29), today, 7));
    }
}
