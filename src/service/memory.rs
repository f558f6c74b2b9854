//! In-memory implementation of every repository trait.
//!
//! Suitable for tests, demos, and embedding. All data lives behind one
//! `RwLock`; clones share the same data.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::{
    AllowanceConfig, AllowanceConfigDocument, AttendanceConfig, AttendanceConfigDocument,
    BreakConfig, BreakConfigDocument, DeductionConfig, DeductionConfigDocument, OvertimeConfig,
    OvertimeConfigDocument, PayrollConfig, PayrollConfigDocument,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AllowanceAssignment, AttendanceRecord, BreakRecord, DeductionAssignment, Employee,
    EmployeeSalaryConfig, PayrollItem, PayrollPeriod, ResolvedSchedule, WorkSchedule,
};

use super::repository::{
    AttendanceRepository, EmployeeDirectory, PayrollRepository, PolicyDocument, PolicyProvider,
    ScheduleResolver,
};

#[derive(Debug, Clone, Default)]
struct CompanyPolicies {
    attendance: AttendanceConfigDocument,
    breaks: BreakConfigDocument,
    overtime: OvertimeConfigDocument,
    payroll: PayrollConfigDocument,
    allowance: AllowanceConfigDocument,
    deduction: DeductionConfigDocument,
}

#[derive(Debug, Default)]
struct StoreData {
    records: HashMap<Uuid, AttendanceRecord>,
    breaks: HashMap<Uuid, BreakRecord>,
    periods: HashMap<Uuid, PayrollPeriod>,
    items: HashMap<Uuid, PayrollItem>,
    employees: BTreeMap<String, Employee>,
    salaries: Vec<EmployeeSalaryConfig>,
    allowances: Vec<AllowanceAssignment>,
    deductions: Vec<DeductionAssignment>,
    schedules: HashMap<String, WorkSchedule>,
    policies: HashMap<String, CompanyPolicies>,
}

/// In-memory store.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::models::Employee;
/// use attendance_payroll_engine::service::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// store
///     .add_employee(Employee {
///         id: "emp_001".to_string(),
///         company_id: "acme".to_string(),
///         name: "Sato".to_string(),
///         active: true,
///     })
///     .unwrap();
/// assert_eq!(store.employee_count().unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<StoreData>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, StoreData>> {
        self.data
            .read()
            .map_err(|_| EngineError::storage("in-memory store lock poisoned"))
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, StoreData>> {
        self.data
            .write()
            .map_err(|_| EngineError::storage("in-memory store lock poisoned"))
    }

    /// Adds or replaces an employee.
    pub fn add_employee(&self, employee: Employee) -> EngineResult<()> {
        self.write()?.employees.insert(employee.id.clone(), employee);
        Ok(())
    }

    /// Adds a salary version.
    pub fn add_salary_version(&self, version: EmployeeSalaryConfig) -> EngineResult<()> {
        self.write()?.salaries.push(version);
        Ok(())
    }

    /// Adds an allowance assignment.
    pub fn add_allowance(&self, assignment: AllowanceAssignment) -> EngineResult<()> {
        self.write()?.allowances.push(assignment);
        Ok(())
    }

    /// Adds a deduction assignment.
    pub fn add_deduction(&self, assignment: DeductionAssignment) -> EngineResult<()> {
        self.write()?.deductions.push(assignment);
        Ok(())
    }

    /// Assigns a work schedule to an employee, replacing any previous one.
    pub fn assign_schedule(
        &self,
        employee_id: impl Into<String>,
        schedule: WorkSchedule,
    ) -> EngineResult<()> {
        self.write()?.schedules.insert(employee_id.into(), schedule);
        Ok(())
    }

    /// Number of employees stored.
    pub fn employee_count(&self) -> EngineResult<usize> {
        Ok(self.read()?.employees.len())
    }

    fn company_policies(&self, company_id: &str) -> EngineResult<CompanyPolicies> {
        Ok(self
            .read()?
            .policies
            .get(company_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryStore {
    async fn get_record(&self, id: Uuid) -> EngineResult<Option<AttendanceRecord>> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    async fn find_record(
        &self,
        employee_id: &str,
        work_date: NaiveDate,
    ) -> EngineResult<Option<AttendanceRecord>> {
        Ok(self
            .read()?
            .records
            .values()
            .find(|r| r.employee_id == employee_id && r.work_date == work_date)
            .cloned())
    }

    async fn list_records(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .read()?
            .records
            .values()
            .filter(|r| r.employee_id == employee_id && r.work_date >= start && r.work_date <= end)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.work_date);
        Ok(records)
    }

    async fn insert_record(&self, record: AttendanceRecord) -> EngineResult<()> {
        let mut data = self.write()?;
        let duplicate = data
            .records
            .values()
            .any(|r| r.employee_id == record.employee_id && r.work_date == record.work_date);
        if duplicate {
            return Err(EngineError::conflict(format!(
                "attendance for {} on {} already exists",
                record.employee_id, record.work_date
            )));
        }
        data.records.insert(record.id, record);
        Ok(())
    }

    async fn update_record(&self, record: AttendanceRecord) -> EngineResult<()> {
        let mut data = self.write()?;
        match data.records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(EngineError::not_found("attendance record", record.id)),
        }
    }

    async fn get_break(&self, id: Uuid) -> EngineResult<Option<BreakRecord>> {
        Ok(self.read()?.breaks.get(&id).cloned())
    }

    async fn list_breaks(&self, attendance_id: Uuid) -> EngineResult<Vec<BreakRecord>> {
        let mut sessions: Vec<BreakRecord> = self
            .read()?
            .breaks
            .values()
            .filter(|b| b.attendance_id == attendance_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|b| b.sequence);
        Ok(sessions)
    }

    async fn save_break(&self, session: BreakRecord) -> EngineResult<()> {
        self.write()?.breaks.insert(session.id, session);
        Ok(())
    }
}

#[async_trait]
impl PayrollRepository for InMemoryStore {
    async fn get_period(&self, id: Uuid) -> EngineResult<Option<PayrollPeriod>> {
        Ok(self.read()?.periods.get(&id).cloned())
    }

    async fn find_period(
        &self,
        company_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<Option<PayrollPeriod>> {
        Ok(self
            .read()?
            .periods
            .values()
            .find(|p| p.company_id == company_id && p.year == year && p.month == month)
            .cloned())
    }

    async fn insert_period(&self, period: PayrollPeriod) -> EngineResult<()> {
        let mut data = self.write()?;
        let duplicate = data.periods.values().any(|p| {
            p.company_id == period.company_id && p.year == period.year && p.month == period.month
        });
        if duplicate {
            return Err(EngineError::conflict(format!(
                "payroll period {}-{:02} already exists for {}",
                period.year, period.month, period.company_id
            )));
        }
        data.periods.insert(period.id, period);
        Ok(())
    }

    async fn update_period(&self, period: PayrollPeriod) -> EngineResult<()> {
        let mut data = self.write()?;
        match data.periods.get_mut(&period.id) {
            Some(existing) => {
                *existing = period;
                Ok(())
            }
            None => Err(EngineError::not_found("payroll period", period.id)),
        }
    }

    async fn get_item(&self, id: Uuid) -> EngineResult<Option<PayrollItem>> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    async fn list_items(&self, period_id: Uuid) -> EngineResult<Vec<PayrollItem>> {
        let mut items: Vec<PayrollItem> = self
            .read()?
            .items
            .values()
            .filter(|i| i.period_id == period_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(items)
    }

    async fn delete_items(&self, period_id: Uuid) -> EngineResult<usize> {
        let mut data = self.write()?;
        let before = data.items.len();
        data.items.retain(|_, i| i.period_id != period_id);
        Ok(before - data.items.len())
    }

    async fn save_item(&self, item: PayrollItem) -> EngineResult<()> {
        self.write()?.items.insert(item.id, item);
        Ok(())
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryStore {
    async fn get_employee(&self, id: &str) -> EngineResult<Option<Employee>> {
        Ok(self.read()?.employees.get(id).cloned())
    }

    async fn list_active_employees(&self, company_id: &str) -> EngineResult<Vec<Employee>> {
        // BTreeMap iteration is already ordered by id.
        Ok(self
            .read()?
            .employees
            .values()
            .filter(|e| e.company_id == company_id && e.active)
            .cloned()
            .collect())
    }

    async fn salary_versions(&self, employee_id: &str) -> EngineResult<Vec<EmployeeSalaryConfig>> {
        Ok(self
            .read()?
            .salaries
            .iter()
            .filter(|s| s.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn active_allowances(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AllowanceAssignment>> {
        Ok(self
            .read()?
            .allowances
            .iter()
            .filter(|a| a.employee_id == employee_id && a.is_active_within(start, end))
            .cloned()
            .collect())
    }

    async fn active_deductions(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<DeductionAssignment>> {
        Ok(self
            .read()?
            .deductions
            .iter()
            .filter(|d| d.employee_id == employee_id && d.is_active_within(start, end))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScheduleResolver for InMemoryStore {
    async fn resolve_schedule(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Option<ResolvedSchedule>> {
        Ok(self
            .read()?
            .schedules
            .get(employee_id)
            .and_then(|s| s.resolve(date)))
    }
}

#[async_trait]
impl PolicyProvider for InMemoryStore {
    async fn attendance_config(&self, company_id: &str) -> EngineResult<AttendanceConfig> {
        Ok(self.company_policies(company_id)?.attendance.merge_with_defaults())
    }

    async fn break_config(&self, company_id: &str) -> EngineResult<BreakConfig> {
        Ok(self.company_policies(company_id)?.breaks.merge_with_defaults())
    }

    async fn overtime_config(&self, company_id: &str) -> EngineResult<OvertimeConfig> {
        Ok(self.company_policies(company_id)?.overtime.merge_with_defaults())
    }

    async fn payroll_config(&self, company_id: &str) -> EngineResult<PayrollConfig> {
        Ok(self.company_policies(company_id)?.payroll.merge_with_defaults())
    }

    async fn allowance_config(&self, company_id: &str) -> EngineResult<AllowanceConfig> {
        Ok(self.company_policies(company_id)?.allowance.merge_with_defaults())
    }

    async fn deduction_config(&self, company_id: &str) -> EngineResult<DeductionConfig> {
        Ok(self.company_policies(company_id)?.deduction.merge_with_defaults())
    }

    async fn save_policy(&self, company_id: &str, document: PolicyDocument) -> EngineResult<()> {
        let mut data = self.write()?;
        let policies = data.policies.entry(company_id.to_string()).or_default();
        match document {
            PolicyDocument::Attendance(doc) => policies.attendance = doc,
            PolicyDocument::Break(doc) => policies.breaks = doc,
            PolicyDocument::Overtime(doc) => policies.overtime = doc,
            PolicyDocument::Payroll(doc) => policies.payroll = doc,
            PolicyDocument::Allowance(doc) => policies.allowance = doc,
            PolicyDocument::Deduction(doc) => policies.deduction = doc,
        }
        Ok(())
    }
}
