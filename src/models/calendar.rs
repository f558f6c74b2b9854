//! Holiday calendar and day classification.
//!
//! This module contains the [`Holiday`] type, the [`Calendar`] lookup the
//! engine consumes, and a simple list-backed [`HolidayCalendar`].

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Represents a public or company holiday.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::models::Holiday;
/// use chrono::NaiveDate;
///
/// let holiday = Holiday {
///     date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     name: "New Year's Day".to_string(),
///     region: "national".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday.
    pub name: String,
    /// The region where this holiday applies (e.g., "national").
    pub region: String,
}

/// Classification of a work date for overtime rate selection.
///
/// A day contributes to exactly one rate family. Holiday takes precedence
/// over weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    /// An ordinary working day; overtime splits into regular and night tiers.
    #[default]
    Regular,
    /// A weekend day.
    Weekend,
    /// A public or company holiday.
    Holiday,
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::Regular => write!(f, "Regular"),
            DayType::Weekend => write!(f, "Weekend"),
            DayType::Holiday => write!(f, "Holiday"),
        }
    }
}

/// Calendar flags consumed by the engine.
///
/// Implementations must be pure: the same date always yields the same answer
/// for the lifetime of a calculation run.
pub trait Calendar: Send + Sync {
    /// Returns true if the date is a holiday.
    fn is_holiday(&self, date: NaiveDate) -> bool;

    /// Returns true if the date is a weekend day. Defaults to Saturday/Sunday.
    fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// A calendar backed by an explicit holiday list and configurable weekend days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    /// Known holidays.
    pub holidays: Vec<Holiday>,
    /// Days of the week treated as weekend.
    pub weekend_days: Vec<Weekday>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self {
            holidays: Vec::new(),
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
        }
    }
}

impl HolidayCalendar {
    /// Creates a calendar with the given holidays and a Saturday/Sunday weekend.
    pub fn with_holidays(holidays: Vec<Holiday>) -> Self {
        Self {
            holidays,
            ..Self::default()
        }
    }
}

impl Calendar for HolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.iter().any(|h| h.date == date)
    }

    fn is_weekend(&self, date: NaiveDate) -> bool {
        self.weekend_days.contains(&date.weekday())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar_with_new_year() -> HolidayCalendar {
        HolidayCalendar::with_holidays(vec![Holiday {
            date: date(2026, 1, 1),
            name: "New Year's Day".to_string(),
            region: "national".to_string(),
        }])
    }

    #[test]
    fn test_is_holiday_returns_true() {
        assert!(calendar_with_new_year().is_holiday(date(2026, 1, 1)));
    }

    #[test]
    fn test_is_holiday_returns_false() {
        assert!(!calendar_with_new_year().is_holiday(date(2026, 1, 2)));
    }

    #[test]
    fn test_default_weekend_is_saturday_and_sunday() {
        let calendar = HolidayCalendar::default();
        // 2026-01-17 is a Saturday, 2026-01-18 a Sunday, 2026-01-19 a Monday
        assert!(calendar.is_weekend(date(2026, 1, 17)));
        assert!(calendar.is_weekend(date(2026, 1, 18)));
        assert!(!calendar.is_weekend(date(2026, 1, 19)));
    }

    #[test]
    fn test_custom_weekend_days() {
        let calendar = HolidayCalendar {
            holidays: vec![],
            weekend_days: vec![Weekday::Fri],
        };
        assert!(calendar.is_weekend(date(2026, 1, 16)));
        assert!(!calendar.is_weekend(date(2026, 1, 17)));
    }

    #[test]
    fn test_day_type_serialization() {
        let json = serde_json::to_string(&DayType::Holiday).unwrap();
        assert_eq!(json, "\"HOLIDAY\"");
    }
}
