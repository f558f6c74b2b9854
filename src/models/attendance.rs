//! Attendance record model and the per-period attendance summary.
//!
//! An [`AttendanceRecord`] is created at check-in and carries both the raw
//! timestamps and every derived metric. Derived fields are only ever written
//! by a full recomputation (see `calculation::recompute_attendance`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BreakType, DayType};

/// Outcome of a day's attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    /// Checked in, not yet checked out.
    #[default]
    Incomplete,
    /// Present for the full schedule.
    Present,
    /// Arrived after the grace threshold.
    Late,
    /// Left before the grace threshold.
    EarlyLeave,
    /// Both late and early leave.
    LateAndEarlyLeave,
    /// Did not attend.
    Absent,
}

/// Device and location metadata captured at check-in or check-out.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// Device identifier reported by the client.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Source IP address.
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Reported latitude in degrees.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Reported longitude in degrees.
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Who changed a record, when, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentAudit {
    /// The user who made the adjustment.
    pub adjusted_by: String,
    /// When the adjustment was made.
    pub adjusted_at: DateTime<Utc>,
    /// Free-text reason.
    pub reason: String,
}

/// One attendance record per (employee, work date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier of the record.
    pub id: Uuid,
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The employee's company.
    pub company_id: String,
    /// The calendar date the record tracks.
    pub work_date: NaiveDate,
    /// Check-in timestamp as reported.
    pub original_check_in: Option<NaiveDateTime>,
    /// Check-out timestamp as reported.
    pub original_check_out: Option<NaiveDateTime>,
    /// Check-in after rounding.
    pub check_in: Option<NaiveDateTime>,
    /// Check-out after rounding.
    pub check_out: Option<NaiveDateTime>,
    /// Device used at check-in.
    pub check_in_device: Option<DeviceMeta>,
    /// Device used at check-out.
    pub check_out_device: Option<DeviceMeta>,
    /// Minutes late against the scheduled start.
    pub late_minutes: u32,
    /// Minutes left early against the scheduled end.
    pub early_leave_minutes: u32,
    /// Net working minutes.
    pub working_minutes: u32,
    /// Minutes beyond the standard minutes for the date.
    pub overtime_minutes: u32,
    /// Overtime outside the night window.
    pub regular_overtime_minutes: u32,
    /// Overtime inside the night window.
    pub night_overtime_minutes: u32,
    /// Sum of actual break minutes.
    pub total_break_minutes: u32,
    /// Sum of effective (capped) break minutes.
    pub effective_break_minutes: u32,
    /// Minimum break the record had to meet.
    pub required_break_minutes: u32,
    /// Break type in force when the metrics were computed.
    pub break_type: BreakType,
    /// Whether effective break minutes met the required minimum.
    pub break_compliant: bool,
    /// Whether the rounded check-in fell inside the night window.
    pub is_night_shift: bool,
    /// Calendar classification of the work date.
    pub day_type: DayType,
    /// Derived attendance status.
    pub status: AttendanceStatus,
    /// Manual adjustments applied to this record, oldest first.
    #[serde(default)]
    pub adjustments: Vec<AdjustmentAudit>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Creates a fresh record for a check-in with zeroed metrics.
    pub fn checked_in(
        employee_id: impl Into<String>,
        company_id: impl Into<String>,
        original: NaiveDateTime,
        rounded: NaiveDateTime,
        device: Option<DeviceMeta>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            company_id: company_id.into(),
            work_date: original.date(),
            original_check_in: Some(original),
            original_check_out: None,
            check_in: Some(rounded),
            check_out: None,
            check_in_device: device,
            check_out_device: None,
            late_minutes: 0,
            early_leave_minutes: 0,
            working_minutes: 0,
            overtime_minutes: 0,
            regular_overtime_minutes: 0,
            night_overtime_minutes: 0,
            total_break_minutes: 0,
            effective_break_minutes: 0,
            required_break_minutes: 0,
            break_type: BreakType::default(),
            break_compliant: true,
            is_night_shift: false,
            day_type: DayType::Regular,
            status: AttendanceStatus::Incomplete,
            adjustments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an absence record for a date with no attendance.
    pub fn absent(
        employee_id: impl Into<String>,
        company_id: impl Into<String>,
        work_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            company_id: company_id.into(),
            work_date,
            original_check_in: None,
            original_check_out: None,
            check_in: None,
            check_out: None,
            check_in_device: None,
            check_out_device: None,
            late_minutes: 0,
            early_leave_minutes: 0,
            working_minutes: 0,
            overtime_minutes: 0,
            regular_overtime_minutes: 0,
            night_overtime_minutes: 0,
            total_break_minutes: 0,
            effective_break_minutes: 0,
            required_break_minutes: 0,
            break_type: BreakType::default(),
            break_compliant: true,
            is_night_shift: false,
            day_type: DayType::Regular,
            status: AttendanceStatus::Absent,
            adjustments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true once the employee has checked out.
    pub fn is_checked_out(&self) -> bool {
        self.check_out.is_some()
    }

    /// Returns true if the record counts as a worked day for payroll.
    pub fn is_worked_day(&self) -> bool {
        self.status != AttendanceStatus::Absent
            && self.check_in.is_some()
            && self.check_out.is_some()
    }
}

/// Overtime minutes bucketed by rate tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OvertimeMinutes {
    /// Overtime on regular days outside the night window.
    pub regular: u32,
    /// Overtime on regular days inside the night window.
    pub night: u32,
    /// Overtime on holidays.
    pub holiday: u32,
    /// Overtime on weekend days.
    pub weekend: u32,
}

impl OvertimeMinutes {
    /// Returns the total across all tiers.
    pub fn total(&self) -> u32 {
        self.regular + self.night + self.holiday + self.weekend
    }
}

/// Attendance aggregated over a payroll period for one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Days with a completed check-in/check-out.
    pub working_days: u32,
    /// Completed shifts (equal to working days: one record per date).
    pub shifts_worked: u32,
    /// Days recorded as absent.
    pub absent_days: u32,
    /// Net working minutes.
    pub working_minutes: u32,
    /// Overtime minutes by tier.
    pub overtime: OvertimeMinutes,
    /// Actual break minutes.
    pub total_break_minutes: u32,
    /// Effective break minutes.
    pub effective_break_minutes: u32,
    /// Late minutes.
    pub late_minutes: u32,
    /// Early-leave minutes.
    pub early_leave_minutes: u32,
}
