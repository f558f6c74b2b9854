//! Narrow storage and lookup contracts the services depend on.
//!
//! # Thread Safety
//! Implementations must be `Send + Sync` to be shared across async tasks.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::{
    AllowanceConfig, AllowanceConfigDocument, AttendanceConfig, AttendanceConfigDocument,
    BreakConfig, BreakConfigDocument, DeductionConfig, DeductionConfigDocument, OvertimeConfig,
    OvertimeConfigDocument, PayrollConfig, PayrollConfigDocument,
};
use crate::error::EngineResult;
use crate::models::{
    AllowanceAssignment, AttendanceRecord, BreakRecord, DeductionAssignment, Employee,
    EmployeeSalaryConfig, PayrollItem, PayrollPeriod, ResolvedSchedule,
};

/// Storage for attendance records and their break sessions.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Fetches a record by id.
    async fn get_record(&self, id: Uuid) -> EngineResult<Option<AttendanceRecord>>;

    /// Fetches the record for an employee on a work date.
    async fn find_record(
        &self,
        employee_id: &str,
        work_date: NaiveDate,
    ) -> EngineResult<Option<AttendanceRecord>>;

    /// Lists an employee's records with work dates in `[start, end]`, oldest first.
    async fn list_records(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>>;

    /// Inserts a new record.
    ///
    /// Fails with `Conflict` if the employee already has a record for the date.
    async fn insert_record(&self, record: AttendanceRecord) -> EngineResult<()>;

    /// Replaces an existing record.
    async fn update_record(&self, record: AttendanceRecord) -> EngineResult<()>;

    /// Fetches a break session by id.
    async fn get_break(&self, id: Uuid) -> EngineResult<Option<BreakRecord>>;

    /// Lists a record's break sessions ordered by sequence.
    async fn list_breaks(&self, attendance_id: Uuid) -> EngineResult<Vec<BreakRecord>>;

    /// Inserts or replaces a break session.
    async fn save_break(&self, session: BreakRecord) -> EngineResult<()>;
}

/// Storage for payroll periods and items.
#[async_trait]
pub trait PayrollRepository: Send + Sync {
    /// Fetches a period by id.
    async fn get_period(&self, id: Uuid) -> EngineResult<Option<PayrollPeriod>>;

    /// Fetches a company's period for a calendar month.
    async fn find_period(
        &self,
        company_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Option<PayrollPeriod>>;

    /// Inserts a new period.
    ///
    /// Fails with `Conflict` if the company already has a period for the month.
    async fn insert_period(&self, period: PayrollPeriod) -> EngineResult<()>;

    /// Replaces an existing period.
    async fn update_period(&self, period: PayrollPeriod) -> EngineResult<()>;

    /// Fetches an item by id.
    async fn get_item(&self, id: Uuid) -> EngineResult<Option<PayrollItem>>;

    /// Lists a period's items ordered by employee id.
    async fn list_items(&self, period_id: Uuid) -> EngineResult<Vec<PayrollItem>>;

    /// Deletes every item of a period, returning how many were removed.
    async fn delete_items(&self, period_id: Uuid) -> EngineResult<usize>;

    /// Inserts or replaces one item atomically.
    async fn save_item(&self, item: PayrollItem) -> EngineResult<()>;
}

/// Employee master data, salary versions, and assignments.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Fetches an employee.
    async fn get_employee(&self, id: &str) -> EngineResult<Option<Employee>>;

    /// Lists a company's active employees ordered by id.
    async fn list_active_employees(&self, company_id: &str) -> EngineResult<Vec<Employee>>;

    /// Lists every salary version of an employee.
    async fn salary_versions(&self, employee_id: &str) -> EngineResult<Vec<EmployeeSalaryConfig>>;

    /// Lists allowances active at any point in `[start, end]`.
    async fn active_allowances(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AllowanceAssignment>>;

    /// Lists deductions active at any point in `[start, end]`.
    async fn active_deductions(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<DeductionAssignment>>;
}

/// Work schedule lookup.
#[async_trait]
pub trait ScheduleResolver: Send + Sync {
    /// Resolves the schedule for an employee on a date, if one is assigned.
    async fn resolve_schedule(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Option<ResolvedSchedule>>;
}

/// A stored policy document for one domain.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyDocument {
    /// Attendance policy.
    Attendance(AttendanceConfigDocument),
    /// Break policy.
    Break(BreakConfigDocument),
    /// Overtime policy.
    Overtime(OvertimeConfigDocument),
    /// Payroll policy.
    Payroll(PayrollConfigDocument),
    /// Allowance policy.
    Allowance(AllowanceConfigDocument),
    /// Deduction policy.
    Deduction(DeductionConfigDocument),
}

/// Per-company policy storage.
///
/// Getters always return fully-defaulted configs; a company with no stored
/// document for a domain gets that domain's defaults.
#[async_trait]
pub trait PolicyProvider: Send + Sync {
    /// Attendance policy.
    async fn attendance_config(&self, company_id: &str) -> EngineResult<AttendanceConfig>;
    /// Break policy.
    async fn break_config(&self, company_id: &str) -> EngineResult<BreakConfig>;
    /// Overtime policy.
    async fn overtime_config(&self, company_id: &str) -> EngineResult<OvertimeConfig>;
    /// Payroll policy.
    async fn payroll_config(&self, company_id: &str) -> EngineResult<PayrollConfig>;
    /// Allowance policy.
    async fn allowance_config(&self, company_id: &str) -> EngineResult<AllowanceConfig>;
    /// Deduction policy.
    async fn deduction_config(&self, company_id: &str) -> EngineResult<DeductionConfig>;

    /// Replaces the stored document for one domain.
    async fn save_policy(&self, company_id: &str, document: PolicyDocument) -> EngineResult<()>;
}
