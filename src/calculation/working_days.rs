//! Working-day counting.
//!
//! A working day is any calendar day that is not a Saturday or Sunday. The count
//! over a period's inclusive date range is the divisor for the daily rate.

use chrono::{Datelike, NaiveDate, Weekday};

/// Returns true if the date is a working day.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::is_working_day;
/// use chrono::NaiveDate;
///
/// // 2025-09-06 is a Saturday
/// assert!(!is_working_day(NaiveDate::from_ymd_opt(2025, 9, 6).unwrap()));
/// assert!(is_working_day(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()));
/// ```
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts the working days in the inclusive range `[start, end]`.
///
/// Returns 0 when `start > end`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::count_working_days;
/// use chrono::NaiveDate;
///
/// // Monday 2025-09-01 to Sunday 2025-09-14: two full weeks
/// let start = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 9, 14).unwrap();
/// assert_eq!(count_working_days(start, end), 10);
/// ```
pub fn count_working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_working_day(*day))
        .count() as u32
}
