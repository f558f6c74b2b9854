//! Overtime tier classification.
//!
//! Overtime is the tail end of the worked interval. The night tier is the
//! part of that tail that falls inside the night window, with break minutes
//! excluded from the walk.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::TimeWindow;
use crate::models::BreakRecord;

/// Overtime minutes split into the time-of-day tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OvertimeSplit {
    /// Overtime outside the night window.
    pub regular_minutes: u32,
    /// Overtime inside the night window.
    pub night_minutes: u32,
}

/// Splits `overtime_minutes` into regular and night minutes.
///
/// Walks back minute by minute from check-out, skipping minutes inside any
/// completed break session and stopping at check-in, until `overtime_minutes`
/// worked minutes have been visited. Night minutes are those whose start lies
/// in the night window. The regular tier is always the remainder, so the two
/// tiers sum to `overtime_minutes`.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::classify_overtime;
/// use attendance_payroll_engine::config::AttendanceConfig;
/// use chrono::NaiveDateTime;
///
/// let check_in = NaiveDateTime::parse_from_str("2026-01-13 14:00", "%Y-%m-%d %H:%M").unwrap();
/// let check_out = NaiveDateTime::parse_from_str("2026-01-13 23:30", "%Y-%m-%d %H:%M").unwrap();
/// let window = AttendanceConfig::default().night_window;
///
/// let split = classify_overtime(check_in, check_out, &[], 90, &window);
/// assert_eq!(split.night_minutes, 90);
/// assert_eq!(split.regular_minutes, 0);
/// ```
pub fn classify_overtime(
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
    sessions: &[BreakRecord],
    overtime_minutes: u32,
    night_window: &TimeWindow,
) -> OvertimeSplit {
    if overtime_minutes == 0 {
        return OvertimeSplit::default();
    }

    let in_break = |minute: NaiveDateTime| {
        sessions
            .iter()
            .filter_map(BreakRecord::interval)
            .any(|(start, end)| minute >= start && minute < end)
    };

    let one_minute = Duration::minutes(1);
    let mut cursor = check_out;
    let mut counted = 0u32;
    let mut night = 0u32;

    while counted < overtime_minutes {
        let minute = cursor - one_minute;
        if minute < check_in {
            break;
        }
        if !in_break(minute) {
            counted += 1;
            if night_window.contains(minute.time()) {
                night += 1;
            }
        }
        cursor = minute;
    }

    let night_minutes = night.min(overtime_minutes);
    OvertimeSplit {
        regular_minutes: overtime_minutes - night_minutes,
        night_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AttendanceConfig;
    use chrono::Utc;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn window() -> TimeWindow {
        AttendanceConfig::default().night_window
    }

    fn session(start: &str, end: &str) -> BreakRecord {
        BreakRecord {
            id: Uuid::new_v4(),
            attendance_id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            sequence: 1,
            start_time: dt(start),
            end_time: Some(dt(end)),
            actual_minutes: None,
            effective_minutes: None,
            is_night_break: false,
            system_generated: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_daytime_overtime_is_regular() {
        let split = classify_overtime(dt("2026-01-13 09:00"), dt("2026-01-13 20:00"), &[], 120, &window());
        assert_eq!(split.regular_minutes, 120);
        assert_eq!(split.night_minutes, 0);
    }

    #[test]
    fn test_overtime_straddling_night_start() {
        // 21:00..23:00 overtime, 22:00..23:00 is night
        let split = classify_overtime(dt("2026-01-13 12:00"), dt("2026-01-13 23:00"), &[], 120, &window());
        assert_eq!(split.night_minutes, 60);
        assert_eq!(split.regular_minutes, 60);
    }

    #[test]
    fn test_break_minutes_are_skipped() {
        // Walk from 23:00 back: 22:30..23:00 (30 night), skip 22:00..22:30 break,
        // 21:30..22:00 (30 regular).
        let breaks = vec![session("2026-01-13 22:00", "2026-01-13 22:30")];
        let split = classify_overtime(
            dt("2026-01-13 12:00"),
            dt("2026-01-13 23:00"),
            &breaks,
            60,
            &window(),
        );
        assert_eq!(split.night_minutes, 30);
        assert_eq!(split.regular_minutes, 30);
    }

    #[test]
    fn test_early_morning_overtime_is_night() {
        let split = classify_overtime(dt("2026-01-13 20:00"), dt("2026-01-14 05:30"), &[], 90, &window());
        // 04:00..05:00 night, 05:00..05:30 regular
        assert_eq!(split.night_minutes, 60);
        assert_eq!(split.regular_minutes, 30);
    }

    #[test]
    fn test_walk_stops_at_check_in() {
        let split = classify_overtime(dt("2026-01-13 22:30"), dt("2026-01-13 23:00"), &[], 90, &window());
        assert_eq!(split.night_minutes, 30);
        assert_eq!(split.regular_minutes + split.night_minutes, 90);
    }

    proptest! {
        #[test]
        fn prop_tiers_sum_to_overtime(
            start_offset in 0i64..1440,
            length in 0i64..1440,
            overtime in 0u32..600,
        ) {
            let check_in = dt("2026-01-13 00:00") + Duration::minutes(start_offset);
            let check_out = check_in + Duration::minutes(length);
            let split = classify_overtime(check_in, check_out, &[], overtime, &window());
            prop_assert_eq!(split.regular_minutes + split.night_minutes, overtime);
        }
    }
}
