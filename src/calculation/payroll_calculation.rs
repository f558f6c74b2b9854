//! Per-employee payroll calculation.
//!
//! Turns a resolved salary configuration, an attendance summary, and the
//! employee's active allowance/deduction assignments into a full salary
//! breakdown with an audit trail.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{OvertimeConfig, PayrollConfig, PolicySet};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AllowanceAssignment, AllowanceLine, AttendanceSummary, AuditStep, AuditTrail, BreakType,
    DeductionAmount, DeductionAssignment, DeductionLine, EmployeeSalaryConfig, OvertimeMinutes,
    OvertimePay, SalaryType,
};

use super::rounding::round_amount;

const MINUTES_PER_HOUR: u32 = 60;

/// Everything needed to calculate one employee's pay for a period.
#[derive(Debug, Clone, Copy)]
pub struct PayrollInput<'a> {
    /// The salary version in force at the period end.
    pub salary: &'a EmployeeSalaryConfig,
    /// Attendance for the period.
    pub summary: &'a AttendanceSummary,
    /// Allowance assignments active during the period.
    pub allowances: &'a [AllowanceAssignment],
    /// Deduction assignments active during the period.
    pub deductions: &'a [DeductionAssignment],
    /// Policies captured at the start of the run.
    pub policies: &'a PolicySet,
}

/// The computed figures for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollBreakdown {
    /// Salary basis used.
    pub salary_type: SalaryType,
    /// Rate from the salary configuration.
    pub salary_rate: Decimal,
    /// Derived hourly rate (unrounded).
    pub hourly_rate: Decimal,
    /// Base salary.
    pub base_salary: Decimal,
    /// Overtime pay by tier.
    pub overtime_pay: OvertimePay,
    /// Sum of overtime tiers.
    pub total_overtime_pay: Decimal,
    /// Value of unpaid break time (reporting only).
    pub break_deduction: Decimal,
    /// Allowance lines.
    pub allowances: Vec<AllowanceLine>,
    /// Sum of allowances.
    pub total_allowances: Decimal,
    /// Deduction lines.
    pub deductions: Vec<DeductionLine>,
    /// Sum of deductions.
    pub total_deductions: Decimal,
    /// Base + overtime + allowances − deductions.
    pub gross_salary: Decimal,
    /// Equal to gross; no statutory deductions are applied.
    pub net_salary: Decimal,
    /// Ordered calculation steps.
    pub audit_steps: Vec<AuditStep>,
}

/// Picks the salary version in force on `as_of`.
///
/// Returns `None` when no version or more than one version covers the date;
/// callers skip the employee in both cases.
pub fn resolve_effective_salary(
    versions: &[EmployeeSalaryConfig],
    as_of: NaiveDate,
) -> Option<&EmployeeSalaryConfig> {
    let mut covering = versions.iter().filter(|v| v.covers(as_of));
    let first = covering.next()?;
    if covering.next().is_some() {
        return None;
    }
    Some(first)
}

fn hours_decimal(minutes: u32) -> Decimal {
    Decimal::from(minutes) / Decimal::from(MINUTES_PER_HOUR)
}

fn checked_div(numerator: Decimal, denominator: Decimal, what: &str) -> EngineResult<Decimal> {
    numerator
        .checked_div(denominator)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("cannot derive {what}: division by {denominator}"),
        })
}

/// Derives the hourly rate used for overtime and break valuation.
///
/// | Salary type | Hourly rate |
/// |-------------|-------------|
/// | HOURLY      | rate |
/// | DAILY       | rate / standard hours per day |
/// | MONTHLY     | rate / (standard days per month × standard hours per day) |
/// | SHIFT_BASED | rate / standard hours per day |
///
/// The result is not rounded.
pub fn derive_hourly_rate(
    salary_type: SalaryType,
    rate: Decimal,
    config: &PayrollConfig,
) -> EngineResult<Decimal> {
    let hours_per_day = config.standard_hours_per_day;
    match salary_type {
        SalaryType::Hourly => Ok(rate),
        SalaryType::Daily | SalaryType::ShiftBased => {
            checked_div(rate, hours_per_day, "hourly rate")
        }
        SalaryType::Monthly => checked_div(
            rate,
            Decimal::from(config.standard_working_days_per_month) * hours_per_day,
            "hourly rate",
        ),
    }
}

/// Computes the base salary, rounded to the configured unit.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::calculate_base_salary;
/// use attendance_payroll_engine::config::PayrollConfig;
/// use attendance_payroll_engine::models::{AttendanceSummary, SalaryType};
/// use rust_decimal::Decimal;
///
/// let summary = AttendanceSummary { working_days: 20, ..AttendanceSummary::default() };
/// let base = calculate_base_salary(
///     SalaryType::Monthly,
///     Decimal::from(3_000_000),
///     &summary,
///     &PayrollConfig::default(),
/// )
/// .unwrap();
/// assert_eq!(base, Decimal::from(2_727_272));
/// ```
pub fn calculate_base_salary(
    salary_type: SalaryType,
    rate: Decimal,
    summary: &AttendanceSummary,
    config: &PayrollConfig,
) -> EngineResult<Decimal> {
    let raw = match salary_type {
        SalaryType::Monthly => checked_div(
            rate * Decimal::from(summary.working_days),
            Decimal::from(config.standard_working_days_per_month),
            "monthly base salary",
        )?,
        SalaryType::Daily => rate * Decimal::from(summary.working_days),
        SalaryType::Hourly => rate * Decimal::from(summary.working_minutes / MINUTES_PER_HOUR),
        SalaryType::ShiftBased => rate * Decimal::from(summary.shifts_worked),
    };
    Ok(round_amount(raw, config.rounding_unit, config.rounding_mode))
}

/// Computes overtime pay per tier, each tier rounded independently.
///
/// All tiers are zero when overtime is disabled.
pub fn calculate_overtime_pay(
    hourly_rate: Decimal,
    minutes: &OvertimeMinutes,
    overtime: &OvertimeConfig,
    payroll: &PayrollConfig,
) -> OvertimePay {
    if !overtime.enabled {
        return OvertimePay::default();
    }
    let tier = |multiplier: Decimal, tier_minutes: u32| {
        round_amount(
            hourly_rate * multiplier * hours_decimal(tier_minutes),
            payroll.rounding_unit,
            payroll.rounding_mode,
        )
    };
    OvertimePay {
        regular: tier(overtime.regular_multiplier, minutes.regular),
        night: tier(overtime.night_multiplier, minutes.night),
        holiday: tier(overtime.holiday_multiplier, minutes.holiday),
        weekend: tier(overtime.weekend_multiplier, minutes.weekend),
    }
}

/// Calculates one employee's pay.
///
/// Returns `CalculationError` only when the payroll policy would require a
/// division by zero.
pub fn calculate_employee_payroll(input: PayrollInput<'_>) -> EngineResult<PayrollBreakdown> {
    let PayrollInput {
        salary,
        summary,
        allowances,
        deductions,
        policies,
    } = input;
    let payroll = &policies.payroll;
    let mut trail = AuditTrail::new();

    // Base salary
    let base_salary = calculate_base_salary(salary.salary_type, salary.rate, summary, payroll)?;
    trail.record(
        "base_salary",
        "Base Salary",
        "payroll.standard_working_days_per_month",
        serde_json::json!({
            "salary_type": salary.salary_type.to_string(),
            "rate": salary.rate.normalize().to_string(),
            "working_days": summary.working_days,
            "working_minutes": summary.working_minutes,
            "shifts_worked": summary.shifts_worked,
        }),
        serde_json::json!({ "base_salary": base_salary.normalize().to_string() }),
        base_salary_reasoning(salary, summary, payroll, base_salary),
    );

    // Hourly rate
    let hourly_rate = derive_hourly_rate(salary.salary_type, salary.rate, payroll)?;
    trail.record(
        "hourly_rate",
        "Hourly Rate",
        "payroll.standard_hours_per_day",
        serde_json::json!({
            "salary_type": salary.salary_type.to_string(),
            "rate": salary.rate.normalize().to_string(),
            "standard_hours_per_day": payroll.standard_hours_per_day.normalize().to_string(),
        }),
        serde_json::json!({ "hourly_rate": hourly_rate.normalize().to_string() }),
        format!("Hourly rate for {} salary: {}", salary.salary_type, hourly_rate.round_dp(4)),
    );

    // Overtime
    let overtime_pay = calculate_overtime_pay(hourly_rate, &summary.overtime, &policies.overtime, payroll);
    let total_overtime_pay = overtime_pay.total();
    trail.record(
        "overtime_pay",
        "Overtime Pay",
        "overtime",
        serde_json::json!({
            "enabled": policies.overtime.enabled,
            "regular_minutes": summary.overtime.regular,
            "night_minutes": summary.overtime.night,
            "holiday_minutes": summary.overtime.holiday,
            "weekend_minutes": summary.overtime.weekend,
        }),
        serde_json::json!({
            "regular": overtime_pay.regular.normalize().to_string(),
            "night": overtime_pay.night.normalize().to_string(),
            "holiday": overtime_pay.holiday.normalize().to_string(),
            "weekend": overtime_pay.weekend.normalize().to_string(),
            "total": total_overtime_pay.normalize().to_string(),
        }),
        if policies.overtime.enabled {
            format!(
                "{} overtime minutes paid at tier multipliers, total {}",
                summary.overtime.total(),
                total_overtime_pay.normalize()
            )
        } else {
            "Overtime disabled by policy".to_string()
        },
    );

    // Break valuation, reporting only
    let break_deduction = match policies.breaks.break_type {
        BreakType::Unpaid => round_amount(
            hourly_rate * hours_decimal(summary.total_break_minutes),
            payroll.rounding_unit,
            payroll.rounding_mode,
        ),
        BreakType::Paid => Decimal::ZERO,
    };

    // Allowances
    let allowance_lines = if policies.allowance.enabled {
        allowances
            .iter()
            .filter_map(|a| {
                let configured = policies.allowance.find_type(&a.code);
                let amount = a.amount.or(configured.and_then(|t| t.default_amount))?;
                Some(AllowanceLine {
                    code: a.code.clone(),
                    name: configured.map_or_else(|| a.code.clone(), |t| t.name.clone()),
                    amount,
                    taxable: a.taxable || configured.is_some_and(|t| t.taxable),
                })
            })
            .collect()
    } else {
        Vec::new()
    };
    let total_allowances: Decimal = allowance_lines.iter().map(|l| l.amount).sum();
    trail.record(
        "allowances",
        "Allowances",
        "allowance",
        serde_json::json!({
            "enabled": policies.allowance.enabled,
            "assignments": allowances.len(),
        }),
        serde_json::json!({ "total_allowances": total_allowances.normalize().to_string() }),
        format!(
            "{} allowance(s) totalling {}",
            allowance_lines.len(),
            total_allowances.normalize()
        ),
    );

    // Deductions
    let deduction_lines = if policies.deduction.enabled {
        deductions
            .iter()
            .filter_map(|d| {
                let configured = policies.deduction.find_type(&d.code);
                let amount = d.amount.or(configured.and_then(|t| t.default_amount))?;
                let (percentage, value) = match amount {
                    DeductionAmount::Fixed(value) => (None, value),
                    DeductionAmount::Percentage(pct) => (
                        Some(pct),
                        round_amount(
                            pct * base_salary / Decimal::ONE_HUNDRED,
                            payroll.rounding_unit,
                            payroll.rounding_mode,
                        ),
                    ),
                };
                Some(DeductionLine {
                    code: d.code.clone(),
                    name: configured.map_or_else(|| d.code.clone(), |t| t.name.clone()),
                    percentage,
                    amount: value,
                    taxable: d.taxable || configured.is_some_and(|t| t.taxable),
                })
            })
            .collect()
    } else {
        Vec::new()
    };
    let total_deductions: Decimal = deduction_lines.iter().map(|l| l.amount).sum();
    trail.record(
        "deductions",
        "Deductions",
        "deduction",
        serde_json::json!({
            "enabled": policies.deduction.enabled,
            "assignments": deductions.len(),
            "base_salary": base_salary.normalize().to_string(),
        }),
        serde_json::json!({ "total_deductions": total_deductions.normalize().to_string() }),
        format!(
            "{} deduction(s) totalling {}",
            deduction_lines.len(),
            total_deductions.normalize()
        ),
    );

    // Gross and net; net carries no further deduction stage.
    let gross_salary = base_salary + total_overtime_pay + total_allowances - total_deductions;
    trail.record(
        "gross_salary",
        "Gross Salary",
        "payroll",
        serde_json::json!({
            "base_salary": base_salary.normalize().to_string(),
            "total_overtime_pay": total_overtime_pay.normalize().to_string(),
            "total_allowances": total_allowances.normalize().to_string(),
            "total_deductions": total_deductions.normalize().to_string(),
        }),
        serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "net_salary": gross_salary.normalize().to_string(),
        }),
        format!(
            "{} + {} + {} - {} = {}",
            base_salary.normalize(),
            total_overtime_pay.normalize(),
            total_allowances.normalize(),
            total_deductions.normalize(),
            gross_salary.normalize()
        ),
    );

    Ok(PayrollBreakdown {
        salary_type: salary.salary_type,
        salary_rate: salary.rate,
        hourly_rate,
        base_salary,
        overtime_pay,
        total_overtime_pay,
        break_deduction,
        allowances: allowance_lines,
        total_allowances,
        deductions: deduction_lines,
        total_deductions,
        gross_salary,
        net_salary: gross_salary,
        audit_steps: trail.into_steps(),
    })
}

fn base_salary_reasoning(
    salary: &EmployeeSalaryConfig,
    summary: &AttendanceSummary,
    payroll: &PayrollConfig,
    base_salary: Decimal,
) -> String {
    let rate = salary.rate.normalize();
    match salary.salary_type {
        SalaryType::Monthly => format!(
            "{} × {} / {} = {}",
            rate, summary.working_days, payroll.standard_working_days_per_month, base_salary
        ),
        SalaryType::Daily => format!("{} × {} days = {}", rate, summary.working_days, base_salary),
        SalaryType::Hourly => format!(
            "{} × {} hours = {}",
            rate,
            summary.working_minutes / MINUTES_PER_HOUR,
            base_salary
        ),
        SalaryType::ShiftBased => {
            format!("{} × {} shifts = {}", rate, summary.shifts_worked, base_salary)
        }
    }
}
