//! Payroll period and payroll item models.
//!
//! A [`PayrollPeriod`] is one calendar month's payroll run for a company and
//! moves strictly forward through DRAFT → REVIEWING → APPROVED → PAID.
//! A [`PayrollItem`] is the per-employee breakdown owned by a period.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::{AttendanceSummary, AuditStep, SalaryType};

/// Lifecycle state of a payroll period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollPeriodStatus {
    /// Being calculated; items may be regenerated.
    Draft,
    /// Submitted for review; items may still be adjusted.
    Reviewing,
    /// Approved; items are confirmed.
    Approved,
    /// Paid out. Terminal.
    Paid,
}

impl PayrollPeriodStatus {
    /// All states in lifecycle order.
    pub const ALL: [PayrollPeriodStatus; 4] = [
        PayrollPeriodStatus::Draft,
        PayrollPeriodStatus::Reviewing,
        PayrollPeriodStatus::Approved,
        PayrollPeriodStatus::Paid,
    ];

    /// Returns the immediate successor, or `None` for the terminal state.
    pub fn next(self) -> Option<Self> {
        match self {
            PayrollPeriodStatus::Draft => Some(PayrollPeriodStatus::Reviewing),
            PayrollPeriodStatus::Reviewing => Some(PayrollPeriodStatus::Approved),
            PayrollPeriodStatus::Approved => Some(PayrollPeriodStatus::Paid),
            PayrollPeriodStatus::Paid => None,
        }
    }

    /// Returns the immediate predecessor, or `None` for the initial state.
    pub fn previous(self) -> Option<Self> {
        match self {
            PayrollPeriodStatus::Draft => None,
            PayrollPeriodStatus::Reviewing => Some(PayrollPeriodStatus::Draft),
            PayrollPeriodStatus::Approved => Some(PayrollPeriodStatus::Reviewing),
            PayrollPeriodStatus::Paid => Some(PayrollPeriodStatus::Approved),
        }
    }
}

impl std::fmt::Display for PayrollPeriodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayrollPeriodStatus::Draft => write!(f, "DRAFT"),
            PayrollPeriodStatus::Reviewing => write!(f, "REVIEWING"),
            PayrollPeriodStatus::Approved => write!(f, "APPROVED"),
            PayrollPeriodStatus::Paid => write!(f, "PAID"),
        }
    }
}

/// Why an employee is missing from a period's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    /// No single salary configuration covered the period end date.
    Skipped,
    /// Calculation or persistence failed for the employee.
    Failed,
}

/// An employee excluded from the last calculation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationIssue {
    /// The affected employee.
    pub employee_id: String,
    /// Skipped or failed.
    pub kind: IssueKind,
    /// Human-readable reason.
    pub reason: String,
}

/// One month's payroll run for a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// Unique identifier.
    pub id: Uuid,
    /// The company the period belongs to.
    pub company_id: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// First day of the month.
    pub start_date: NaiveDate,
    /// Last day of the month.
    pub end_date: NaiveDate,
    /// Current lifecycle state.
    pub status: PayrollPeriodStatus,
    /// Sum of item gross salaries.
    pub total_gross: Decimal,
    /// Sum of item net salaries.
    pub total_net: Decimal,
    /// Number of items.
    pub employee_count: u32,
    /// Employees excluded from the last calculation.
    #[serde(default)]
    pub issues: Vec<CalculationIssue>,
    /// When items were last regenerated.
    pub calculated_at: Option<DateTime<Utc>>,
    /// When the period was submitted for review.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Who approved the period.
    pub approved_by: Option<String>,
    /// When the period was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// When payment was made.
    pub paid_at: Option<DateTime<Utc>>,
    /// External payment reference.
    pub payment_reference: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl PayrollPeriod {
    /// Creates a DRAFT period covering the given calendar month.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_payroll_engine::models::{PayrollPeriod, PayrollPeriodStatus};
    /// use chrono::NaiveDate;
    ///
    /// let period = PayrollPeriod::new("acme", 2026, 2).unwrap();
    /// assert_eq!(period.status, PayrollPeriodStatus::Draft);
    /// assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    /// ```
    pub fn new(company_id: impl Into<String>, year: i32, month: u32) -> EngineResult<Self> {
        let (start_date, end_date) = month_bounds(year, month)?;
        Ok(Self {
            id: Uuid::new_v4(),
            company_id: company_id.into(),
            year,
            month,
            start_date,
            end_date,
            status: PayrollPeriodStatus::Draft,
            total_gross: Decimal::ZERO,
            total_net: Decimal::ZERO,
            employee_count: 0,
            issues: Vec::new(),
            calculated_at: None,
            submitted_at: None,
            approved_by: None,
            approved_at: None,
            paid_at: None,
            payment_reference: None,
            created_at: Utc::now(),
        })
    }

    /// Fails with a state-conflict error unless the period is in `required`.
    pub fn ensure_status(&self, required: PayrollPeriodStatus) -> EngineResult<()> {
        if self.status == required {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                entity: "payroll period".to_string(),
                expected: required.to_string(),
                actual: self.status.to_string(),
            })
        }
    }

    /// Returns true while items may still be adjusted.
    pub fn allows_item_adjustment(&self) -> bool {
        matches!(
            self.status,
            PayrollPeriodStatus::Draft | PayrollPeriodStatus::Reviewing
        )
    }

    /// Moves the period to `target`, which must be the immediate successor.
    pub fn transition_to(&mut self, target: PayrollPeriodStatus) -> EngineResult<()> {
        if self.status.next() == Some(target) {
            self.status = target;
            return Ok(());
        }
        let expected = target
            .previous()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "no prior state".to_string());
        Err(EngineError::InvalidState {
            entity: "payroll period".to_string(),
            expected,
            actual: self.status.to_string(),
        })
    }

    /// Recomputes aggregate totals from the period's items.
    pub fn recompute_totals(&mut self, items: &[PayrollItem]) {
        self.total_gross = items.iter().map(|i| i.gross_salary).sum();
        self.total_net = items.iter().map(|i| i.net_salary).sum();
        self.employee_count = u32::try_from(items.len()).unwrap_or(u32::MAX);
    }
}

/// Returns the first and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> EngineResult<(NaiveDate, NaiveDate)> {
    let invalid = || EngineError::validation(format!("invalid payroll month {year}-{month:02}"));
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let end = next_month.pred_opt().ok_or_else(invalid)?;
    debug_assert_eq!(end.month(), month);
    Ok((start, end))
}

/// Status of a payroll item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollItemStatus {
    /// Freshly calculated.
    Calculated,
    /// Manually adjusted after calculation.
    Adjusted,
    /// Frozen by period approval.
    Confirmed,
}

/// A manual post-calculation adjustment to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdjustment {
    /// Signed amount added to gross to give net.
    pub amount: Decimal,
    /// Free-text reason.
    pub reason: String,
    /// Who made the adjustment.
    pub adjusted_by: String,
    /// When the adjustment was made.
    pub adjusted_at: DateTime<Utc>,
}

/// Overtime pay by tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OvertimePay {
    /// Regular overtime pay.
    pub regular: Decimal,
    /// Night overtime pay.
    pub night: Decimal,
    /// Holiday overtime pay.
    pub holiday: Decimal,
    /// Weekend overtime pay.
    pub weekend: Decimal,
}

impl OvertimePay {
    /// Sum over all tiers.
    pub fn total(&self) -> Decimal {
        self.regular + self.night + self.holiday + self.weekend
    }
}

/// One allowance included in an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceLine {
    /// Allowance type code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Amount paid.
    pub amount: Decimal,
    /// Reporting flag.
    pub taxable: bool,
}

/// One deduction included in an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// Deduction type code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Percentage of base salary, for percentage deductions.
    pub percentage: Option<Decimal>,
    /// Amount deducted.
    pub amount: Decimal,
    /// Reporting flag.
    pub taxable: bool,
}

/// The per-employee payroll breakdown for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollItem {
    /// Unique identifier.
    pub id: Uuid,
    /// The owning period.
    pub period_id: Uuid,
    /// The employee paid.
    pub employee_id: String,
    /// Salary basis used.
    pub salary_type: SalaryType,
    /// Rate from the salary configuration.
    pub salary_rate: Decimal,
    /// Derived hourly rate used for overtime.
    pub hourly_rate: Decimal,
    /// Base salary.
    pub base_salary: Decimal,
    /// Overtime pay by tier.
    pub overtime_pay: OvertimePay,
    /// Total overtime pay.
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
    /// Gross plus any adjustment.
    pub net_salary: Decimal,
    /// Attendance the figures were computed from.
    pub attendance: AttendanceSummary,
    /// Item status.
    pub status: PayrollItemStatus,
    /// Manual adjustment, if any.
    pub adjustment: Option<ItemAdjustment>,
    /// Ordered calculation steps.
    pub audit_steps: Vec<AuditStep>,
}

impl PayrollItem {
    /// Applies (or replaces) a manual adjustment and recomputes net salary.
    pub fn apply_adjustment(
        &mut self,
        amount: Decimal,
        reason: impl Into<String>,
        adjusted_by: impl Into<String>,
    ) {
        self.adjustment = Some(ItemAdjustment {
            amount,
            reason: reason.into(),
            adjusted_by: adjusted_by.into(),
            adjusted_at: Utc::now(),
        });
        self.net_salary = self.gross_salary + amount;
        self.status = PayrollItemStatus::Adjusted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn status_strategy() -> impl Strategy<Value = PayrollPeriodStatus> {
        prop::sample::select(PayrollPeriodStatus::ALL.to_vec())
    }

    #[test]
    fn test_month_bounds_handles_december_and_leap_years() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

        let (_, feb) = month_bounds(2028, 2).unwrap();
        assert_eq!(feb, NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(matches!(
            PayrollPeriod::new("acme", 2026, 13),
            Err(EngineError::Validation { .. })
        ));
    }

    #[test]
    fn test_linear_transitions_succeed() {
        let mut period = PayrollPeriod::new("acme", 2026, 1).unwrap();
        period.transition_to(PayrollPeriodStatus::Reviewing).unwrap();
        period.transition_to(PayrollPeriodStatus::Approved).unwrap();
        period.transition_to(PayrollPeriodStatus::Paid).unwrap();
        assert_eq!(period.status, PayrollPeriodStatus::Paid);
    }

    #[test]
    fn test_draft_to_approved_rejected_with_states() {
        let mut period = PayrollPeriod::new("acme", 2026, 1).unwrap();
        match period.transition_to(PayrollPeriodStatus::Approved) {
            Err(EngineError::InvalidState {
                expected, actual, ..
            }) => {
                assert_eq!(expected, "REVIEWING");
                assert_eq!(actual, "DRAFT");
            }
            other => panic!("Expected InvalidState, got {:?}", other),
        }
        assert_eq!(period.status, PayrollPeriodStatus::Draft);
    }

    #[test]
    fn test_adjustment_allowed_only_before_approval() {
        let mut period = PayrollPeriod::new("acme", 2026, 1).unwrap();
        assert!(period.allows_item_adjustment());
        period.status = PayrollPeriodStatus::Reviewing;
        assert!(period.allows_item_adjustment());
        period.status = PayrollPeriodStatus::Approved;
        assert!(!period.allows_item_adjustment());
    }

    fn item(period_id: Uuid, employee_id: &str, gross: i64) -> PayrollItem {
        PayrollItem {
            id: Uuid::new_v4(),
            period_id,
            employee_id: employee_id.to_string(),
            salary_type: SalaryType::Monthly,
            salary_rate: Decimal::from(gross),
            hourly_rate: Decimal::ZERO,
            base_salary: Decimal::from(gross),
            overtime_pay: OvertimePay::default(),
            total_overtime_pay: Decimal::ZERO,
            break_deduction: Decimal::ZERO,
            allowances: Vec::new(),
            total_allowances: Decimal::ZERO,
            deductions: Vec::new(),
            total_deductions: Decimal::ZERO,
            gross_salary: Decimal::from(gross),
            net_salary: Decimal::from(gross),
            attendance: AttendanceSummary::default(),
            status: PayrollItemStatus::Calculated,
            adjustment: None,
            audit_steps: Vec::new(),
        }
    }

    #[test]
    fn test_recompute_totals_sums_items() {
        let mut period = PayrollPeriod::new("acme", 2026, 1).unwrap();
        let mut adjusted = item(period.id, "emp_002", 200_000);
        adjusted.apply_adjustment(Decimal::from(-5_000), "advance", "manager_01");
        let items = vec![item(period.id, "emp_001", 100_000), adjusted];

        period.recompute_totals(&items);
        assert_eq!(period.employee_count, 2);
        assert_eq!(period.total_gross, Decimal::from(300_000));
        assert_eq!(period.total_net, Decimal::from(295_000));

        period.recompute_totals(&[]);
        assert_eq!(period.employee_count, 0);
        assert_eq!(period.total_gross, Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn prop_transition_accepts_only_immediate_successor(
            from in status_strategy(),
            to in status_strategy(),
        ) {
            let mut period = PayrollPeriod::new("acme", 2026, 1).unwrap();
            period.status = from;
            let result = period.transition_to(to);
            if from.next() == Some(to) {
                prop_assert!(result.is_ok());
                prop_assert_eq!(period.status, to);
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(period.status, from);
            }
        }
    }
}
