//! Payroll period orchestration.
//!
//! A period is calculated by fanning the per-employee calculation out over
//! every active employee of its company, then moves forward through
//! DRAFT → REVIEWING → APPROVED → PAID. Every mutating operation holds the
//! period's lock for its whole duration.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{
    PayrollInput, calculate_employee_payroll, resolve_effective_salary, summarize_attendance,
};
use crate::config::PolicySet;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalculationIssue, Employee, IssueKind, PayrollItem, PayrollItemStatus, PayrollPeriod,
    PayrollPeriodStatus,
};

use super::attendance::AttendanceService;
use super::context::EngineContext;
use super::locks::KeyedLocks;
use super::policy::PolicySnapshot;

/// A period together with its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodCalculation {
    /// The period after the operation.
    pub period: PayrollPeriod,
    /// Its items, ordered by employee id.
    pub items: Vec<PayrollItem>,
}

/// A post-hoc correction of one payroll item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollItemAdjustment {
    /// Amount added to gross to give net; may be negative.
    pub amount: Decimal,
    /// Why the item was changed.
    pub reason: String,
    /// Who changed it.
    pub adjusted_by: String,
}

/// Payroll period operations against an [`EngineContext`].
#[derive(Debug, Clone)]
pub struct PayrollService {
    ctx: EngineContext,
    attendance: AttendanceService,
    locks: KeyedLocks,
}

impl PayrollService {
    /// Creates the service with its own lock table.
    pub fn new(ctx: EngineContext) -> Self {
        Self::with_locks(ctx, KeyedLocks::new())
    }

    /// Creates the service sharing `locks` with other instances.
    pub fn with_locks(ctx: EngineContext, locks: KeyedLocks) -> Self {
        Self {
            attendance: AttendanceService::with_locks(ctx.clone(), locks.clone()),
            ctx,
            locks,
        }
    }

    /// Creates a DRAFT period for a company's calendar month.
    ///
    /// # Errors
    ///
    /// `Validation` for an impossible month, `Conflict` if the company
    /// already has a period for it.
    pub async fn create_period(
        &self,
        company_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<PayrollPeriod> {
        let period = PayrollPeriod::new(company_id, year, month)?;
        self.ctx.payroll.insert_period(period.clone()).await?;
        tracing::info!(
            period_id = %period.id,
            company_id,
            year,
            month,
            "payroll period created"
        );
        Ok(period)
    }

    /// Fetches a period.
    pub async fn period(&self, period_id: Uuid) -> EngineResult<PayrollPeriod> {
        self.ctx
            .payroll
            .get_period(period_id)
            .await?
            .ok_or_else(|| EngineError::not_found("payroll period", period_id))
    }

    /// Lists a period's items ordered by employee id.
    pub async fn items(&self, period_id: Uuid) -> EngineResult<Vec<PayrollItem>> {
        self.ctx.payroll.list_items(period_id).await
    }

    /// Calculates the company's period for a month, creating it when absent.
    pub async fn calculate_month(
        &self,
        company_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<PeriodCalculation> {
        let period = match self.ctx.payroll.find_period(company_id, year, month).await? {
            Some(period) => period,
            None => self.create_period(company_id, year, month).await?,
        };
        self.calculate_period(period.id).await
    }

    /// Regenerates every item of a DRAFT period.
    ///
    /// Existing items are deleted first, so running this twice on unchanged
    /// inputs gives the same figures. Policies are read once at the start.
    /// An employee without exactly one effective salary version is skipped;
    /// an employee whose calculation fails is recorded and the run continues.
    /// Both appear in the period's issues and neither counts towards totals.
    pub async fn calculate_period(&self, period_id: Uuid) -> EngineResult<PeriodCalculation> {
        let _guard = self.locks.acquire(period_id).await;
        let mut period = self.period(period_id).await?;
        period.ensure_status(PayrollPeriodStatus::Draft)?;

        let snapshot = PolicySnapshot::capture(self.ctx.policies.as_ref(), &period.company_id).await?;
        let removed = self.ctx.payroll.delete_items(period.id).await?;
        let employees = self
            .ctx
            .employees
            .list_active_employees(&period.company_id)
            .await?;

        let mut items = Vec::with_capacity(employees.len());
        let mut issues = Vec::new();
        for employee in &employees {
            match self
                .calculate_item(&period, employee, &snapshot.policies)
                .await
            {
                Ok(Ok(item)) => items.push(item),
                Ok(Err(reason)) => {
                    tracing::warn!(
                        period_id = %period.id,
                        employee_id = %employee.id,
                        %reason,
                        "employee skipped"
                    );
                    issues.push(CalculationIssue {
                        employee_id: employee.id.clone(),
                        kind: IssueKind::Skipped,
                        reason,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        period_id = %period.id,
                        employee_id = %employee.id,
                        error = %err,
                        "employee calculation failed"
                    );
                    issues.push(CalculationIssue {
                        employee_id: employee.id.clone(),
                        kind: IssueKind::Failed,
                        reason: err.to_string(),
                    });
                }
            }
        }

        items.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        period.recompute_totals(&items);
        period.issues = issues;
        period.calculated_at = Some(Utc::now());
        self.ctx.payroll.update_period(period.clone()).await?;

        tracing::info!(
            period_id = %period.id,
            removed_items = removed,
            employee_count = period.employee_count,
            issues = period.issues.len(),
            total_gross = %period.total_gross,
            "payroll period calculated"
        );
        Ok(PeriodCalculation { period, items })
    }

    /// Calculates and stores one employee's item.
    ///
    /// The inner `Err` carries the reason an employee is skipped.
    async fn calculate_item(
        &self,
        period: &PayrollPeriod,
        employee: &Employee,
        policies: &PolicySet,
    ) -> EngineResult<Result<PayrollItem, String>> {
        let versions = self.ctx.employees.salary_versions(&employee.id).await?;
        let Some(salary) = resolve_effective_salary(&versions, period.end_date) else {
            let covering = versions.iter().filter(|v| v.covers(period.end_date)).count();
            return Ok(Err(format!(
                "{covering} salary configurations effective on {}; exactly one is required",
                period.end_date
            )));
        };

        let records = self
            .ctx
            .attendance
            .list_records(&employee.id, period.start_date, period.end_date)
            .await?;
        let mut settled = Vec::with_capacity(records.len());
        for record in records {
            settled.push(self.attendance.ensure_fixed_breaks(record, policies).await?);
        }
        let summary = summarize_attendance(&settled);

        let allowances = self
            .ctx
            .employees
            .active_allowances(&employee.id, period.start_date, period.end_date)
            .await?;
        let deductions = self
            .ctx
            .employees
            .active_deductions(&employee.id, period.start_date, period.end_date)
            .await?;

        let breakdown = calculate_employee_payroll(PayrollInput {
            salary,
            summary: &summary,
            allowances: &allowances,
            deductions: &deductions,
            policies,
        })?;

        let item = PayrollItem {
            id: Uuid::new_v4(),
            period_id: period.id,
            employee_id: employee.id.clone(),
            salary_type: breakdown.salary_type,
            salary_rate: breakdown.salary_rate,
            hourly_rate: breakdown.hourly_rate,
            base_salary: breakdown.base_salary,
            overtime_pay: breakdown.overtime_pay,
            total_overtime_pay: breakdown.total_overtime_pay,
            break_deduction: breakdown.break_deduction,
            allowances: breakdown.allowances,
            total_allowances: breakdown.total_allowances,
            deductions: breakdown.deductions,
            total_deductions: breakdown.total_deductions,
            gross_salary: breakdown.gross_salary,
            net_salary: breakdown.net_salary,
            attendance: summary,
            status: PayrollItemStatus::Calculated,
            adjustment: None,
            audit_steps: breakdown.audit_steps,
        };
        self.ctx.payroll.save_item(item.clone()).await?;

        tracing::debug!(
            period_id = %period.id,
            employee_id = %employee.id,
            gross_salary = %item.gross_salary,
            "payroll item calculated"
        );
        Ok(Ok(item))
    }

    /// Sets the adjustment on an item and recomputes its period's totals.
    ///
    /// Replaces any earlier adjustment; net becomes gross plus `amount`.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the period is DRAFT or REVIEWING, `Validation`
    /// for an empty reason.
    pub async fn adjust_item(
        &self,
        item_id: Uuid,
        adjustment: PayrollItemAdjustment,
    ) -> EngineResult<PayrollItem> {
        if adjustment.reason.trim().is_empty() {
            return Err(EngineError::validation("a reason is required"));
        }
        let item = self
            .ctx
            .payroll
            .get_item(item_id)
            .await?
            .ok_or_else(|| EngineError::not_found("payroll item", item_id))?;

        let _guard = self.locks.acquire(item.period_id).await;
        let mut period = self.period(item.period_id).await?;
        if !period.allows_item_adjustment() {
            return Err(EngineError::InvalidState {
                entity: "payroll period".to_string(),
                expected: format!(
                    "{} or {}",
                    PayrollPeriodStatus::Draft,
                    PayrollPeriodStatus::Reviewing
                ),
                actual: period.status.to_string(),
            });
        }

        // Re-read under the lock; a concurrent recalculation may have replaced it.
        let mut item = self
            .ctx
            .payroll
            .get_item(item_id)
            .await?
            .ok_or_else(|| EngineError::not_found("payroll item", item_id))?;
        item.apply_adjustment(adjustment.amount, adjustment.reason, &adjustment.adjusted_by);
        self.ctx.payroll.save_item(item.clone()).await?;

        let items = self.ctx.payroll.list_items(period.id).await?;
        period.recompute_totals(&items);
        self.ctx.payroll.update_period(period.clone()).await?;

        tracing::info!(
            period_id = %period.id,
            item_id = %item.id,
            amount = %adjustment.amount,
            adjusted_by = %adjustment.adjusted_by,
            "payroll item adjusted"
        );
        Ok(item)
    }

    /// Moves a DRAFT period with at least one item to REVIEWING.
    pub async fn submit_for_review(&self, period_id: Uuid) -> EngineResult<PayrollPeriod> {
        let _guard = self.locks.acquire(period_id).await;
        let mut period = self.period(period_id).await?;
        period.ensure_status(PayrollPeriodStatus::Draft)?;
        if self.ctx.payroll.list_items(period.id).await?.is_empty() {
            return Err(EngineError::validation(
                "cannot submit a payroll period with no items",
            ));
        }

        period.transition_to(PayrollPeriodStatus::Reviewing)?;
        period.submitted_at = Some(Utc::now());
        self.ctx.payroll.update_period(period.clone()).await?;
        tracing::info!(period_id = %period.id, "payroll period submitted for review");
        Ok(period)
    }

    /// Moves a REVIEWING period to APPROVED and confirms every item.
    pub async fn approve(&self, period_id: Uuid, approver_id: &str) -> EngineResult<PayrollPeriod> {
        if approver_id.trim().is_empty() {
            return Err(EngineError::validation("an approver is required"));
        }
        let _guard = self.locks.acquire(period_id).await;
        let mut period = self.period(period_id).await?;
        period.transition_to(PayrollPeriodStatus::Approved)?;
        period.approved_by = Some(approver_id.to_string());
        period.approved_at = Some(Utc::now());

        for mut item in self.ctx.payroll.list_items(period.id).await? {
            item.status = PayrollItemStatus::Confirmed;
            self.ctx.payroll.save_item(item).await?;
        }
        self.ctx.payroll.update_period(period.clone()).await?;
        tracing::info!(period_id = %period.id, approver_id, "payroll period approved");
        Ok(period)
    }

    /// Moves an APPROVED period to PAID.
    pub async fn mark_as_paid(
        &self,
        period_id: Uuid,
        payment_reference: &str,
    ) -> EngineResult<PayrollPeriod> {
        if payment_reference.trim().is_empty() {
            return Err(EngineError::validation("a payment reference is required"));
        }
        let _guard = self.locks.acquire(period_id).await;
        let mut period = self.period(period_id).await?;
        period.transition_to(PayrollPeriodStatus::Paid)?;
        period.paid_at = Some(Utc::now());
        period.payment_reference = Some(payment_reference.to_string());
        self.ctx.payroll.update_period(period.clone()).await?;
        tracing::info!(period_id = %period.id, payment_reference, "payroll period paid");
        Ok(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BreakConfigDocument, PayrollConfigDocument};
    use crate::models::{EmployeeSalaryConfig, HolidayCalendar, SalaryType, WorkSchedule};
    use crate::service::{InMemoryStore, PolicyDocument, PolicyProvider};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(day: NaiveDate, h: u32) -> NaiveDateTime {
        day.and_time(NaiveTime::from_hms_opt(h, 0, 0).unwrap())
    }

    fn employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            company_id: "acme".to_string(),
            name: id.to_string(),
            active: true,
        }
    }

    fn daily(id: &str, rate: i64) -> EmployeeSalaryConfig {
        EmployeeSalaryConfig {
            employee_id: id.to_string(),
            salary_type: SalaryType::Daily,
            rate: Decimal::from(rate),
            effective_from: date(2025, 1, 1),
            effective_to: None,
        }
    }

    async fn setup() -> (PayrollService, AttendanceService, InMemoryStore) {
        let store = InMemoryStore::new();
        for id in ["emp_001", "emp_002"] {
            store.add_employee(employee(id)).unwrap();
            store
                .assign_schedule(
                    id,
                    WorkSchedule::Fixed {
                        start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                        end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                        break_minutes: 60,
                    },
                )
                .unwrap();
        }
        store.add_salary_version(daily("emp_001", 10_000)).unwrap();
        store
            .save_policy(
                "acme",
                PolicyDocument::Break(BreakConfigDocument {
                    tracking_enabled: Some(false),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();
        let ctx = EngineContext::in_memory(store.clone(), HolidayCalendar::default());
        (
            PayrollService::new(ctx.clone()),
            AttendanceService::new(ctx),
            store,
        )
    }

    async fn work(attendance: &AttendanceService, employee_id: &str, days: &[u32]) {
        for &d in days {
            let day = date(2026, 1, d);
            attendance.check_in(employee_id, at(day, 9), None).await.unwrap();
            attendance.check_out(employee_id, at(day, 18), None).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_duplicate_period_is_conflict() {
        let (payroll, _, _) = setup().await;
        payroll.create_period("acme", 2026, 1).await.unwrap();
        let err = payroll.create_period("acme", 2026, 1).await.unwrap_err();
        assert!(matches!(err, EngineError::Conflict { .. }));
        let err = payroll.create_period("acme", 2026, 13).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_employee_without_salary_is_skipped() {
        let (payroll, attendance, _) = setup().await;
        work(&attendance, "emp_001", &[5, 6, 7]).await;
        work(&attendance, "emp_002", &[5]).await;

        let result = payroll.calculate_month("acme", 2026, 1).await.unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].employee_id, "emp_001");
        assert_eq!(result.items[0].base_salary, Decimal::from(30_000));
        assert_eq!(result.period.employee_count, 1);
        assert_eq!(result.period.total_gross, Decimal::from(30_000));
        assert_eq!(result.period.issues.len(), 1);
        assert_eq!(result.period.issues[0].employee_id, "emp_002");
        assert_eq!(result.period.issues[0].kind, IssueKind::Skipped);
    }

    #[tokio::test]
    async fn test_failed_employee_does_not_abort_the_run() {
        let (payroll, attendance, store) = setup().await;
        store
            .add_salary_version(EmployeeSalaryConfig {
                salary_type: SalaryType::Monthly,
                ..daily("emp_002", 300_000)
            })
            .unwrap();
        // Stored without going through PolicyService, which would refuse it.
        store
            .save_policy(
                "acme",
                PolicyDocument::Payroll(PayrollConfigDocument {
                    standard_working_days_per_month: Some(0),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();
        work(&attendance, "emp_001", &[5, 6, 7]).await;
        work(&attendance, "emp_002", &[5, 6]).await;

        let result = payroll.calculate_month("acme", 2026, 1).await.unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].employee_id, "emp_001");
        assert_eq!(result.period.employee_count, 1);
        assert_eq!(result.period.total_gross, Decimal::from(30_000));
        assert_eq!(result.period.total_net, Decimal::from(30_000));
        assert_eq!(result.period.issues.len(), 1);
        assert_eq!(result.period.issues[0].employee_id, "emp_002");
        assert_eq!(result.period.issues[0].kind, IssueKind::Failed);

        let stored = payroll.items(result.period.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].employee_id, "emp_001");
    }

    #[tokio::test]
    async fn test_recalculation_replaces_items() {
        let (payroll, attendance, _) = setup().await;
        work(&attendance, "emp_001", &[5, 6]).await;
        let first = payroll.calculate_month("acme", 2026, 1).await.unwrap();

        work(&attendance, "emp_001", &[7]).await;
        let second = payroll.calculate_period(first.period.id).await.unwrap();

        assert_eq!(payroll.items(first.period.id).await.unwrap().len(), 1);
        assert_eq!(second.items[0].base_salary, Decimal::from(30_000));
        assert_ne!(first.items[0].id, second.items[0].id);
    }

    #[tokio::test]
    async fn test_submit_with_no_items_is_rejected() {
        let (payroll, _, _) = setup().await;
        let period = payroll.create_period("acme", 2026, 1).await.unwrap();
        let err = payroll.submit_for_review(period.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
        assert_eq!(
            payroll.period(period.id).await.unwrap().status,
            PayrollPeriodStatus::Draft
        );
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (payroll, attendance, _) = setup().await;
        work(&attendance, "emp_001", &[5]).await;
        let calculated = payroll.calculate_month("acme", 2026, 1).await.unwrap();
        let id = calculated.period.id;

        let err = payroll.approve(id, "cfo").await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));

        let reviewing = payroll.submit_for_review(id).await.unwrap();
        assert_eq!(reviewing.status, PayrollPeriodStatus::Reviewing);
        assert!(reviewing.submitted_at.is_some());

        let err = payroll.calculate_period(id).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));

        let approved = payroll.approve(id, "cfo").await.unwrap();
        assert_eq!(approved.approved_by.as_deref(), Some("cfo"));
        assert!(
            payroll
                .items(id)
                .await
                .unwrap()
                .iter()
                .all(|i| i.status == PayrollItemStatus::Confirmed)
        );

        let item_id = calculated.items[0].id;
        let err = payroll
            .adjust_item(
                item_id,
                PayrollItemAdjustment {
                    amount: Decimal::from(500),
                    reason: "late fix".to_string(),
                    adjusted_by: "hr".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));

        let err = payroll.mark_as_paid(id, " ").await.unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
        let paid = payroll.mark_as_paid(id, "TX-2026-01").await.unwrap();
        assert_eq!(paid.status, PayrollPeriodStatus::Paid);
        assert_eq!(paid.payment_reference.as_deref(), Some("TX-2026-01"));

        let err = payroll.mark_as_paid(id, "TX-again").await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_adjustment_updates_net_and_totals() {
        let (payroll, attendance, _) = setup().await;
        work(&attendance, "emp_001", &[5, 6]).await;
        let calculated = payroll.calculate_month("acme", 2026, 1).await.unwrap();
        let item_id = calculated.items[0].id;

        let adjust = |amount: i64| PayrollItemAdjustment {
            amount: Decimal::from(amount),
            reason: "bonus".to_string(),
            adjusted_by: "hr".to_string(),
        };
        payroll.adjust_item(item_id, adjust(1_000)).await.unwrap();
        let item = payroll.adjust_item(item_id, adjust(-500)).await.unwrap();

        assert_eq!(item.status, PayrollItemStatus::Adjusted);
        assert_eq!(item.gross_salary, Decimal::from(20_000));
        assert_eq!(item.net_salary, Decimal::from(19_500));

        let period = payroll.period(calculated.period.id).await.unwrap();
        assert_eq!(period.total_gross, Decimal::from(20_000));
        assert_eq!(period.total_net, Decimal::from(19_500));
    }

    #[tokio::test]
    async fn test_concurrent_calculations_leave_one_item_set() {
        let (payroll, attendance, _) = setup().await;
        work(&attendance, "emp_001", &[5, 6]).await;
        let period = payroll.create_period("acme", 2026, 1).await.unwrap();

        let (a, b) = tokio::join!(
            payroll.calculate_period(period.id),
            payroll.calculate_period(period.id)
        );
        a.unwrap();
        b.unwrap();

        let items = payroll.items(period.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            payroll.period(period.id).await.unwrap().employee_count,
            1
        );
    }
}
