//! Work schedule models.
//!
//! Schedules are owned by schedule administration; the engine only resolves
//! them to a concrete [`ResolvedSchedule`] for one employee and date.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Standard start, end, and break minutes for one employee on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSchedule {
    /// Scheduled start.
    pub start: NaiveDateTime,
    /// Scheduled end; on the following day for overnight schedules.
    pub end: NaiveDateTime,
    /// Scheduled break minutes.
    pub break_minutes: u32,
}

impl ResolvedSchedule {
    /// Builds a schedule on `date`, rolling the end over midnight when it is not after the start.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_payroll_engine::models::ResolvedSchedule;
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    /// let night = ResolvedSchedule::on_date(
    ///     date,
    ///     NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
    ///     NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
    ///     60,
    /// );
    /// assert_eq!(night.end.date(), NaiveDate::from_ymd_opt(2026, 1, 16).unwrap());
    /// assert_eq!(night.standard_minutes(), 480);
    /// ```
    pub fn on_date(date: NaiveDate, start: NaiveTime, end: NaiveTime, break_minutes: u32) -> Self {
        let start_dt = date.and_time(start);
        let mut end_dt = date.and_time(end);
        if end_dt <= start_dt {
            end_dt += Duration::days(1);
        }
        Self {
            start: start_dt,
            end: end_dt,
            break_minutes,
        }
    }

    /// Scheduled span minus scheduled break, floored at zero.
    pub fn standard_minutes(&self) -> u32 {
        let span = (self.end - self.start).num_minutes() - i64::from(self.break_minutes);
        u32::try_from(span.max(0)).unwrap_or(u32::MAX)
    }
}

/// Start/end/break for one day of the week in a flexible schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdaySchedule {
    /// The day of the week.
    pub weekday: Weekday,
    /// Start time.
    pub start: NaiveTime,
    /// End time.
    pub end: NaiveTime,
    /// Break minutes.
    pub break_minutes: u32,
}

/// An explicit shift on a specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftBlock {
    /// The date the shift starts on.
    pub date: NaiveDate,
    /// Start time.
    pub start: NaiveTime,
    /// End time (next day if not after start).
    pub end: NaiveTime,
    /// Break minutes.
    pub break_minutes: u32,
}

/// A schedule assigned to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkSchedule {
    /// The same hours every day.
    Fixed {
        /// Start time.
        start: NaiveTime,
        /// End time.
        end: NaiveTime,
        /// Break minutes.
        break_minutes: u32,
    },
    /// Hours that vary by weekday.
    Flexible {
        /// Per-weekday hours; weekdays not listed have no schedule.
        days: Vec<WeekdaySchedule>,
    },
    /// Explicit shift blocks.
    Shift {
        /// The assigned shifts.
        shifts: Vec<ShiftBlock>,
    },
}

impl WorkSchedule {
    /// Resolves the schedule for a date, or `None` if nothing is scheduled.
    pub fn resolve(&self, date: NaiveDate) -> Option<ResolvedSchedule> {
        match self {
            WorkSchedule::Fixed {
                start,
                end,
                break_minutes,
            } => Some(ResolvedSchedule::on_date(date, *start, *end, *break_minutes)),
            WorkSchedule::Flexible { days } => days
                .iter()
                .find(|d| d.weekday == date.weekday())
                .map(|d| ResolvedSchedule::on_date(date, d.start, d.end, d.break_minutes)),
            WorkSchedule::Shift { shifts } => shifts
                .iter()
                .find(|s| s.date == date)
                .map(|s| ResolvedSchedule::on_date(date, s.start, s.end, s.break_minutes)),
        }
    }
}
