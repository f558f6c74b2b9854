//! Per-period attendance summary.

use std::collections::BTreeSet;

use crate::models::{AttendanceRecord, AttendanceStatus, AttendanceSummary, DayType};

/// Aggregates an employee's attendance records for a payroll period.
///
/// Only checked-out, non-absent records count as worked. Overtime on holiday
/// and weekend dates lands entirely in those tiers; overtime on regular dates
/// keeps its regular/night split.
pub fn summarize_attendance(records: &[AttendanceRecord]) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();
    let mut worked_dates = BTreeSet::new();

    for record in records {
        if record.status == AttendanceStatus::Absent {
            summary.absent_days += 1;
            continue;
        }
        if !record.is_worked_day() {
            continue;
        }

        worked_dates.insert(record.work_date);
        summary.shifts_worked += 1;
        summary.working_minutes += record.working_minutes;
        summary.total_break_minutes += record.total_break_minutes;
        summary.effective_break_minutes += record.effective_break_minutes;
        summary.late_minutes += record.late_minutes;
        summary.early_leave_minutes += record.early_leave_minutes;

        match record.day_type {
            DayType::Holiday => summary.overtime.holiday += record.overtime_minutes,
            DayType::Weekend => summary.overtime.weekend += record.overtime_minutes,
            DayType::Regular => {
                summary.overtime.regular += record.regular_overtime_minutes;
                summary.overtime.night += record.night_overtime_minutes;
            }
        }
    }

    summary.working_days = u32::try_from(worked_dates.len()).unwrap_or(u32::MAX);
    summary
}
