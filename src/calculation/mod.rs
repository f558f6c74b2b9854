//! Calculation logic for the attendance and payroll engine.
//!
//! This module contains the pure calculation functions of the pipeline:
//! time and money rounding, legal break and overtime floors, break
//! accounting, attendance metrics, overtime tier classification, day
//! classification, the per-period attendance summary, and the per-employee
//! payroll calculation. Nothing here performs I/O.

mod attendance_metrics;
mod break_accounting;
mod day_detection;
mod legal;
mod overtime_classification;
mod payroll_calculation;
mod rounding;
mod summary;

pub use attendance_metrics::{
    AttendanceMetrics, calculate_attendance_metrics, derive_status, early_leave_minutes,
    late_minutes, recompute_attendance,
};
pub use break_accounting::{
    BreakCompliance, BreakTotals, aggregate_breaks, close_session, effective_break_minutes,
    evaluate_compliance, is_night_break, open_session, overlaps_completed_session,
    synthesize_fixed_breaks, validate_break_end, validate_break_start,
};
pub use day_detection::get_day_type;
pub use legal::{
    DEFAULT_LOCALE, LegalMultipliers, REFERENCE_SHIFT_MINUTES, minimum_break_minutes,
    minimum_overtime_multipliers,
};
pub use overtime_classification::{OvertimeSplit, classify_overtime};
pub use payroll_calculation::{
    PayrollBreakdown, PayrollInput, calculate_base_salary, calculate_employee_payroll,
    calculate_overtime_pay, derive_hourly_rate, resolve_effective_salary,
};
pub use rounding::{minutes_between, round_amount, round_time};
pub use summary::summarize_attendance;
