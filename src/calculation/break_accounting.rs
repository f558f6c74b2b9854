//! Break accounting.
//!
//! This module covers the break session lifecycle checks, capping of actual
//! minutes into effective minutes, record-level aggregation, compliance
//! against company and legal minimums, and synthesis of sessions in fixed
//! break mode.

use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{BreakConfig, TimeWindow};
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, BreakRecord};

use super::legal::minimum_break_minutes;
use super::rounding::minutes_between;

/// Record-level break totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BreakTotals {
    /// Sum of actual minutes over completed sessions.
    pub total_minutes: u32,
    /// Sum of effective minutes over completed sessions.
    pub effective_minutes: u32,
    /// Number of completed sessions counted.
    pub session_count: u32,
}

/// Outcome of a compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakCompliance {
    /// The minimum the record had to meet.
    pub required_minutes: u32,
    /// Whether effective minutes met it.
    pub compliant: bool,
}

/// Returns true if a break starting at `start` is a night break.
pub fn is_night_break(start: NaiveDateTime, night_window: &TimeWindow) -> bool {
    night_window.contains(start.time())
}

/// Caps actual break minutes into the configured bounds.
///
/// Night breaks use the night minimum; both use the same maximum. An
/// unbounded maximum only applies the floor.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::effective_break_minutes;
/// use attendance_payroll_engine::config::BreakConfig;
///
/// let config = BreakConfig {
///     minimum_break_minutes: 45,
///     maximum_break_minutes: Some(60),
///     ..BreakConfig::default()
/// };
/// assert_eq!(effective_break_minutes(90, false, &config), 60);
/// assert_eq!(effective_break_minutes(20, false, &config), 45);
/// assert_eq!(effective_break_minutes(50, false, &config), 50);
/// ```
pub fn effective_break_minutes(actual_minutes: u32, is_night: bool, config: &BreakConfig) -> u32 {
    let floor = if is_night {
        config.night_minimum_break_minutes
    } else {
        config.minimum_break_minutes
    };
    let raised = actual_minutes.max(floor);
    match config.maximum_break_minutes {
        Some(max) => raised.min(max),
        None => raised,
    }
}

/// Returns true if `time` falls inside any completed session, inclusive of both ends.
pub fn overlaps_completed_session<'a>(
    sessions: impl IntoIterator<Item = &'a BreakRecord>,
    time: NaiveDateTime,
) -> bool {
    sessions.into_iter().any(|s| s.contains(time))
}

/// Checks whether a new break may start at `start` for `record`.
///
/// Checks run in a fixed order so callers always see the most fundamental
/// reason first: policy mode, check-in state, open session, daily cap, overlap.
pub fn validate_break_start(
    record: &AttendanceRecord,
    sessions: &[BreakRecord],
    start: NaiveDateTime,
    config: &BreakConfig,
) -> EngineResult<()> {
    if !config.tracking_enabled {
        return Err(EngineError::validation("break tracking is disabled"));
    }
    if config.fixed_break_mode {
        return Err(EngineError::validation(
            "breaks are not tracked in fixed break mode",
        ));
    }
    let Some(check_in) = record.check_in else {
        return Err(EngineError::validation("no check-in recorded for the day"));
    };
    if record.check_out.is_some() {
        return Err(EngineError::validation(
            "cannot start a break after check-out",
        ));
    }
    if start < check_in {
        return Err(EngineError::validation(format!(
            "break start {start} precedes check-in {check_in}"
        )));
    }
    if let Some(open) = sessions.iter().find(|s| !s.is_completed()) {
        return Err(EngineError::conflict(format!(
            "break session {} is still open",
            open.sequence
        )));
    }
    let count = u32::try_from(sessions.len()).unwrap_or(u32::MAX);
    if count >= config.max_breaks_per_day {
        return Err(EngineError::conflict(format!(
            "daily break limit of {} reached",
            config.max_breaks_per_day
        )));
    }
    if overlaps_completed_session(sessions, start) {
        return Err(EngineError::conflict(format!(
            "break start {start} overlaps an existing break"
        )));
    }
    Ok(())
}

/// Checks whether `session` may be ended by `employee_id` at `end`.
pub fn validate_break_end(
    session: &BreakRecord,
    employee_id: &str,
    end: NaiveDateTime,
) -> EngineResult<()> {
    if session.employee_id != employee_id {
        return Err(EngineError::not_found("break", session.id));
    }
    if session.is_completed() {
        return Err(EngineError::conflict(format!(
            "break session {} has already ended",
            session.sequence
        )));
    }
    if end < session.start_time {
        return Err(EngineError::validation(format!(
            "break end {end} precedes break start {}",
            session.start_time
        )));
    }
    Ok(())
}

/// Creates an open session starting at `start`.
pub fn open_session(
    record: &AttendanceRecord,
    sequence: u32,
    start: NaiveDateTime,
    night_window: &TimeWindow,
) -> BreakRecord {
    BreakRecord {
        id: Uuid::new_v4(),
        attendance_id: record.id,
        employee_id: record.employee_id.clone(),
        sequence,
        start_time: start,
        end_time: None,
        actual_minutes: None,
        effective_minutes: None,
        is_night_break: is_night_break(start, night_window),
        system_generated: false,
        created_at: Utc::now(),
    }
}

/// Sets a session's end and derives its actual and effective minutes.
pub fn close_session(
    session: &mut BreakRecord,
    end: NaiveDateTime,
    config: &BreakConfig,
    night_window: &TimeWindow,
) {
    session.is_night_break = is_night_break(session.start_time, night_window);
    let actual = minutes_between(session.start_time, end);
    session.end_time = Some(end);
    session.actual_minutes = Some(actual);
    session.effective_minutes = Some(effective_break_minutes(
        actual,
        session.is_night_break,
        config,
    ));
}

/// Sums break minutes for a record.
///
/// When tracking is off and fixed mode is not active, the sessions are
/// ignored and `default_minutes` (from the schedule or company default) is
/// used for both totals. Open sessions are never counted.
pub fn aggregate_breaks(
    sessions: &[BreakRecord],
    config: &BreakConfig,
    default_minutes: u32,
) -> BreakTotals {
    if !config.tracking_enabled && !config.fixed_break_mode {
        return BreakTotals {
            total_minutes: default_minutes,
            effective_minutes: default_minutes,
            session_count: 0,
        };
    }

    sessions
        .iter()
        .filter(|s| s.is_completed())
        .fold(BreakTotals::default(), |acc, s| BreakTotals {
            total_minutes: acc.total_minutes + s.actual_minutes.unwrap_or(0),
            effective_minutes: acc.effective_minutes + s.effective_minutes.unwrap_or(0),
            session_count: acc.session_count + 1,
        })
}

/// Evaluates effective break minutes against the required minimum.
///
/// The company minimum is the night minimum for night shifts. When
/// `use_legal_minimum` is set the requirement is the larger of the company
/// minimum and the legal minimum for `working_minutes`, which are net of
/// break time.
pub fn evaluate_compliance(
    effective_minutes: u32,
    working_minutes: u32,
    is_night_shift: bool,
    locale: &str,
    config: &BreakConfig,
) -> BreakCompliance {
    let company_minimum = if is_night_shift {
        config.night_minimum_break_minutes
    } else {
        config.minimum_break_minutes
    };
    let required_minutes = if config.use_legal_minimum {
        company_minimum.max(minimum_break_minutes(locale, working_minutes, is_night_shift))
    } else {
        company_minimum
    };
    BreakCompliance {
        required_minutes,
        compliant: effective_minutes >= required_minutes,
    }
}

/// Synthesizes fixed-mode break sessions for a record.
///
/// Configured periods are placed on the record's work date, rolling an end
/// that is not after its start onto the next day. With no configured periods
/// a single session of the default duration (night default for night shifts)
/// is centred in the worked interval, or starts at 12:00 on the work date when
/// the record has no check-out yet. Synthesized sessions are complete, flagged
/// as system-generated, and skip the overlap check.
pub fn synthesize_fixed_breaks(
    record: &AttendanceRecord,
    config: &BreakConfig,
    night_window: &TimeWindow,
) -> Vec<BreakRecord> {
    let intervals: Vec<(NaiveDateTime, NaiveDateTime)> = if config.fixed_break_periods.is_empty()
    {
        let duration = if record.is_night_shift {
            config.night_default_break_minutes
        } else {
            config.default_break_minutes
        };
        let duration = Duration::minutes(i64::from(duration));
        let start = match (record.check_in, record.check_out) {
            (Some(check_in), Some(check_out)) if check_out > check_in => {
                let midpoint = check_in + (check_out - check_in) / 2;
                midpoint - duration / 2
            }
            _ => record.work_date.and_time(noon()),
        };
        vec![(start, start + duration)]
    } else {
        config
            .fixed_break_periods
            .iter()
            .map(|p| {
                let start = record.work_date.and_time(p.start);
                let mut end = record.work_date.and_time(p.end);
                if end <= start {
                    end += Duration::days(1);
                }
                (start, end)
            })
            .collect()
    };

    intervals
        .into_iter()
        .enumerate()
        .map(|(i, (start, end))| {
            let sequence = u32::try_from(i + 1).unwrap_or(u32::MAX);
            let mut session = open_session(record, sequence, start, night_window);
            session.system_generated = true;
            close_session(&mut session, end, config, night_window);
            session
        })
        .collect()
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}
