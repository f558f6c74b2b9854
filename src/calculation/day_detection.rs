//! Day classification for overtime tiering.
//!
//! A work date is classified as exactly one of holiday, weekend, or regular.
//! The classification is day-level: it depends on the work date only, never
//! on the time of day worked.

use chrono::NaiveDate;

use crate::models::{Calendar, DayType};

/// Determines the day type for a work date.
///
/// Holiday takes precedence when a date is both a holiday and a weekend day.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::get_day_type;
/// use attendance_payroll_engine::models::{DayType, Holiday, HolidayCalendar};
/// use chrono::NaiveDate;
///
/// let new_year = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let calendar = HolidayCalendar::with_holidays(vec![Holiday {
///     date: new_year,
///     name: "New Year's Day".to_string(),
///     region: "national".to_string(),
/// }]);
///
/// assert_eq!(get_day_type(new_year, &calendar), DayType::Holiday);
/// // 2026-01-17 is a Saturday
/// let saturday = NaiveDate::from_ymd_opt(2026, 1, 17).unwrap();
/// assert_eq!(get_day_type(saturday, &calendar), DayType::Weekend);
/// ```
pub fn get_day_type(date: NaiveDate, calendar: &dyn Calendar) -> DayType {
    if calendar.is_holiday(date) {
        DayType::Holiday
    } else if calendar.is_weekend(date) {
        DayType::Weekend
    } else {
        DayType::Regular
    }
}
