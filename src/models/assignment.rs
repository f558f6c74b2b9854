//! Allowance and deduction assignments.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a deduction amount is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeductionAmount {
    /// A fixed amount.
    Fixed(Decimal),
    /// A percentage of the computed base salary.
    Percentage(Decimal),
}

/// An allowance assigned to an employee for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceAssignment {
    /// The employee receiving the allowance.
    pub employee_id: String,
    /// Allowance type code, matched against the allowance policy.
    pub code: String,
    /// Fixed amount; falls back to the policy default for the code when absent.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Reporting flag only.
    #[serde(default)]
    pub taxable: bool,
    /// First date the assignment applies.
    pub effective_from: NaiveDate,
    /// Last date the assignment applies; open-ended when absent.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
}

/// A deduction assigned to an employee for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionAssignment {
    /// The employee the deduction applies to.
    pub employee_id: String,
    /// Deduction type code, matched against the deduction policy.
    pub code: String,
    /// Amount; falls back to the policy default for the code when absent.
    #[serde(default)]
    pub amount: Option<DeductionAmount>,
    /// Reporting flag only.
    #[serde(default)]
    pub taxable: bool,
    /// First date the assignment applies.
    pub effective_from: NaiveDate,
    /// Last date the assignment applies; open-ended when absent.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
}

/// Returns true if `[from, to]` overlaps `[start, end]`.
pub(crate) fn overlaps_range(
    from: NaiveDate,
    to: Option<NaiveDate>,
    start: NaiveDate,
    end: NaiveDate,
) -> bool {
    from <= end && to.is_none_or(|to| to >= start)
}

impl AllowanceAssignment {
    /// Returns true if the assignment is active at any point in the range.
    pub fn is_active_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        overlaps_range(self.effective_from, self.effective_to, start, end)
    }
}

impl DeductionAssignment {
    /// Returns true if the assignment is active at any point in the range.
    pub fn is_active_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        overlaps_range(self.effective_from, self.effective_to, start, end)
    }
}
