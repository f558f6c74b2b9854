//! Attendance metrics.
//!
//! Late, early-leave, working, and overtime minutes for one attendance record
//! against its resolved schedule, plus the full recomputation that writes
//! every derived field of a record in one pass.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::{AttendanceConfig, PolicySet};
use crate::models::{AttendanceRecord, AttendanceStatus, BreakRecord, BreakType, DayType, ResolvedSchedule};

use super::break_accounting::{aggregate_breaks, evaluate_compliance};
use super::overtime_classification::classify_overtime;
use super::rounding::minutes_between;

/// Metrics for a checked-out record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendanceMetrics {
    /// Minutes late against the scheduled start.
    pub late_minutes: u32,
    /// Minutes left early against the scheduled end.
    pub early_leave_minutes: u32,
    /// Check-out minus check-in.
    pub gross_minutes: u32,
    /// Gross minus effective break (unpaid breaks only).
    pub working_minutes: u32,
    /// Standard minutes for the schedule.
    pub standard_minutes: u32,
    /// Working minutes beyond standard.
    pub overtime_minutes: u32,
}

/// Lateness against the scheduled start.
///
/// Grace only moves the threshold. Once the threshold is crossed, lateness is
/// measured from the scheduled start itself, so with a 5 minute grace a
/// 09:06 check-in is 6 minutes late and 09:05 is on time.
pub fn late_minutes(check_in: NaiveDateTime, schedule: &ResolvedSchedule, grace_minutes: u32) -> u32 {
    if check_in > schedule.start + Duration::minutes(i64::from(grace_minutes)) {
        minutes_between(schedule.start, check_in)
    } else {
        0
    }
}

/// Early leave against the scheduled end, with the same grace semantics as lateness.
pub fn early_leave_minutes(
    check_out: NaiveDateTime,
    schedule: &ResolvedSchedule,
    grace_minutes: u32,
) -> u32 {
    if check_out < schedule.end - Duration::minutes(i64::from(grace_minutes)) {
        minutes_between(check_out, schedule.end)
    } else {
        0
    }
}

/// Computes metrics for a completed check-in/check-out pair.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::calculate_attendance_metrics;
/// use attendance_payroll_engine::config::AttendanceConfig;
/// use attendance_payroll_engine::models::{BreakType, ResolvedSchedule};
/// use chrono::{NaiveDate, NaiveTime};
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 13).unwrap();
/// let schedule = ResolvedSchedule::on_date(
///     date,
///     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
///     60,
/// );
/// let metrics = calculate_attendance_metrics(
///     date.and_hms_opt(9, 0, 0).unwrap(),
///     date.and_hms_opt(19, 0, 0).unwrap(),
///     &schedule,
///     60,
///     BreakType::Unpaid,
///     &AttendanceConfig::default(),
/// );
/// assert_eq!(metrics.working_minutes, 540);
/// assert_eq!(metrics.overtime_minutes, 60);
/// ```
pub fn calculate_attendance_metrics(
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
    schedule: &ResolvedSchedule,
    effective_break_minutes: u32,
    break_type: BreakType,
    config: &AttendanceConfig,
) -> AttendanceMetrics {
    let gross_minutes = minutes_between(check_in, check_out);
    let working_minutes = match break_type {
        BreakType::Unpaid => gross_minutes.saturating_sub(effective_break_minutes),
        BreakType::Paid => gross_minutes,
    };
    let standard_minutes = schedule.standard_minutes();

    AttendanceMetrics {
        late_minutes: late_minutes(check_in, schedule, config.late_grace_minutes),
        early_leave_minutes: early_leave_minutes(
            check_out,
            schedule,
            config.early_leave_grace_minutes,
        ),
        gross_minutes,
        working_minutes,
        standard_minutes,
        overtime_minutes: working_minutes.saturating_sub(standard_minutes),
    }
}

/// Derives the status of a record from its lateness and early leave.
pub fn derive_status(late_minutes: u32, early_leave_minutes: u32) -> AttendanceStatus {
    match (late_minutes > 0, early_leave_minutes > 0) {
        (false, false) => AttendanceStatus::Present,
        (true, false) => AttendanceStatus::Late,
        (false, true) => AttendanceStatus::EarlyLeave,
        (true, true) => AttendanceStatus::LateAndEarlyLeave,
    }
}

/// Recomputes every derived field of `record` from its rounded times, the
/// full current set of break sessions, the resolved schedule, and the day type.
///
/// Absent records are left untouched. A record without check-out gets its
/// lateness and night-shift flag but zero working metrics and status
/// [`AttendanceStatus::Incomplete`].
pub fn recompute_attendance(
    record: &mut AttendanceRecord,
    sessions: &[BreakRecord],
    schedule: &ResolvedSchedule,
    day_type: DayType,
    policies: &PolicySet,
) {
    let Some(check_in) = record.check_in else {
        return;
    };
    let attendance = &policies.attendance;
    let breaks = &policies.breaks;

    record.day_type = day_type;
    record.break_type = breaks.break_type;
    record.is_night_shift = attendance.night_window.contains(check_in.time());
    record.late_minutes = late_minutes(check_in, schedule, attendance.late_grace_minutes);

    let totals = aggregate_breaks(sessions, breaks, schedule.break_minutes);
    record.total_break_minutes = totals.total_minutes;
    record.effective_break_minutes = totals.effective_minutes;

    let Some(check_out) = record.check_out else {
        record.early_leave_minutes = 0;
        record.working_minutes = 0;
        record.overtime_minutes = 0;
        record.regular_overtime_minutes = 0;
        record.night_overtime_minutes = 0;
        record.required_break_minutes = 0;
        record.break_compliant = true;
        record.status = AttendanceStatus::Incomplete;
        return;
    };

    let metrics = calculate_attendance_metrics(
        check_in,
        check_out,
        schedule,
        totals.effective_minutes,
        breaks.break_type,
        attendance,
    );
    let split = classify_overtime(
        check_in,
        check_out,
        sessions,
        metrics.overtime_minutes,
        &attendance.night_window,
    );
    let compliance = evaluate_compliance(
        totals.effective_minutes,
        metrics.working_minutes,
        record.is_night_shift,
        &attendance.locale,
        breaks,
    );

    record.early_leave_minutes = metrics.early_leave_minutes;
    record.working_minutes = metrics.working_minutes;
    record.overtime_minutes = metrics.overtime_minutes;
    record.regular_overtime_minutes = split.regular_minutes;
    record.night_overtime_minutes = split.night_minutes;
    record.required_break_minutes = compliance.required_minutes;
    record.break_compliant = compliance.compliant;
    record.status = derive_status(metrics.late_minutes, metrics.early_leave_minutes);

    tracing::debug!(
        record_id = %record.id,
        employee_id = %record.employee_id,
        working_minutes = record.working_minutes,
        overtime_minutes = record.overtime_minutes,
        status = ?record.status,
        "recomputed attendance"
    );
}
