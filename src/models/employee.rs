//! Employee model and salary configuration.
//!
//! This module defines the [`Employee`] identity the engine consumes and the
//! effective-dated [`EmployeeSalaryConfig`] that determines the base salary formula.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Determines the base salary formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalaryType {
    /// A monthly salary prorated by working days.
    Monthly,
    /// A rate per working day.
    Daily,
    /// A rate per whole working hour.
    Hourly,
    /// A rate per shift worked.
    ShiftBased,
}

impl std::fmt::Display for SalaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SalaryType::Monthly => write!(f, "MONTHLY"),
            SalaryType::Daily => write!(f, "DAILY"),
            SalaryType::Hourly => write!(f, "HOURLY"),
            SalaryType::ShiftBased => write!(f, "SHIFT_BASED"),
        }
    }
}

/// Represents an employee known to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The company that employs them; selects the policy set.
    pub company_id: String,
    /// Display name.
    pub name: String,
    /// Inactive employees are excluded from payroll runs.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// One version of an employee's salary configuration.
///
/// The `rate` is interpreted according to `salary_type`: a monthly salary,
/// a daily rate, an hourly rate, or a rate per shift.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::models::{EmployeeSalaryConfig, SalaryType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = EmployeeSalaryConfig {
///     employee_id: "emp_001".to_string(),
///     salary_type: SalaryType::Monthly,
///     rate: Decimal::from(3_000_000),
///     effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     effective_to: None,
/// };
/// assert!(config.covers(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSalaryConfig {
    /// The employee this version applies to.
    pub employee_id: String,
    /// The salary basis.
    pub salary_type: SalaryType,
    /// The rate for the salary basis.
    pub rate: Decimal,
    /// First date this version applies (inclusive).
    pub effective_from: NaiveDate,
    /// Last date this version applies (inclusive); open-ended when absent.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
}

impl EmployeeSalaryConfig {
    /// Returns true if the effective range contains `date`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.is_none_or(|to| date <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn salary(from: NaiveDate, to: Option<NaiveDate>) -> EmployeeSalaryConfig {
        EmployeeSalaryConfig {
            employee_id: "emp_001".to_string(),
            salary_type: SalaryType::Daily,
            rate: Decimal::from(150_000),
            effective_from: from,
            effective_to: to,
        }
    }

    #[test]
    fn test_covers_is_inclusive() {
        let config = salary(date(2026, 1, 1), Some(date(2026, 1, 31)));
        assert!(config.covers(date(2026, 1, 1)));
        assert!(config.covers(date(2026, 1, 31)));
        assert!(!config.covers(date(2026, 2, 1)));
        assert!(!config.covers(date(2025, 12, 31)));
    }

    #[test]
    fn test_open_ended_covers_future() {
        let config = salary(date(2026, 1, 1), None);
        assert!(config.covers(date(2030, 6, 30)));
    }

    #[test]
    fn test_deserialize_employee_defaults_active() {
        let json = r#"{"id": "emp_001", "company_id": "acme", "name": "Kim"}"#;
        let employee: Employee = serde_json::from_str(json).unwrap();
        assert!(employee.active);
    }

    #[test]
    fn test_salary_type_serialization() {
        let json = serde_json::to_string(&SalaryType::ShiftBased).unwrap();
        assert_eq!(json, "\"SHIFT_BASED\"");
        assert_eq!(SalaryType::ShiftBased.to_string(), "SHIFT_BASED");
    }
}
