//! Calculation audit trail.
//!
//! Every payroll item records the sequence of rules applied to reach its
//! figures, so a reviewer can see why a number came out the way it did.

use serde::{Deserialize, Serialize};

/// A single step in the audit trail recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "base_salary".to_string(),
///     rule_name: "Base Salary".to_string(),
///     policy_ref: "payroll.standard_working_days_per_month".to_string(),
///     input: serde_json::json!({"working_days": 20}),
///     output: serde_json::json!({"base_salary": "2727272"}),
///     reasoning: "3000000 × 20 / 22 = 2727272".to_string(),
/// };
/// assert_eq!(step.rule_id, "base_salary");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The policy setting that governs this rule.
    pub policy_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Accumulates audit steps with sequential numbering.
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    steps: Vec<AuditStep>,
}

impl AuditTrail {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step, assigning the next step number.
    pub fn record(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        policy_ref: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        let step_number = self.steps.len() as u32 + 1;
        self.steps.push(AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            policy_ref: policy_ref.to_string(),
            input,
            output,
            reasoning,
        });
    }

    /// Consumes the trail, returning the recorded steps.
    pub fn into_steps(self) -> Vec<AuditStep> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_numbers_steps_sequentially() {
        let mut trail = AuditTrail::new();
        trail.record(
            "base_salary",
            "Base Salary",
            "payroll",
            serde_json::json!({}),
            serde_json::json!({}),
            "first".to_string(),
        );
        trail.record(
            "overtime_pay",
            "Overtime Pay",
            "overtime",
            serde_json::json!({}),
            serde_json::json!({}),
            "second".to_string(),
        );

        let steps = trail.into_steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].step_number, 1);
        assert_eq!(steps[1].step_number, 2);
        assert_eq!(steps[1].rule_id, "overtime_pay");
    }

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 1,
            rule_id: "base_salary".to_string(),
            rule_name: "Base Salary".to_string(),
            policy_ref: "payroll".to_string(),
            input: serde_json::json!({"working_days": 20}),
            output: serde_json::json!({"base_salary": "2727272"}),
            reasoning: "prorated".to_string(),
        };
        let json = serde_json::to_string(&step).unwrap();
        let deserialized: AuditStep = serde_json::from_str(&json).unwrap();
        assert_eq!(step, deserialized);
    }
}
