//! Core data models for the attendance and payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod assignment;
mod attendance;
mod audit;
mod break_record;
mod calendar;
mod employee;
mod payroll;
mod schedule;

pub use assignment::{AllowanceAssignment, DeductionAmount, DeductionAssignment};
pub use attendance::{
    AdjustmentAudit, AttendanceRecord, AttendanceStatus, AttendanceSummary, DeviceMeta,
    OvertimeMinutes,
};
pub use audit::{AuditStep, AuditTrail};
pub use break_record::{BreakRecord, BreakType};
pub use calendar::{Calendar, DayType, Holiday, HolidayCalendar};
pub use employee::{Employee, EmployeeSalaryConfig, SalaryType};
pub use payroll::{
    AllowanceLine, CalculationIssue, DeductionLine, IssueKind, ItemAdjustment, OvertimePay,
    PayrollItem, PayrollItemStatus, PayrollPeriod, PayrollPeriodStatus, month_bounds,
};
pub use schedule::{ResolvedSchedule, ShiftBlock, WeekdaySchedule, WorkSchedule};
