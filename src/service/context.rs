//! Shared handles the services operate on.

use std::sync::Arc;

use crate::models::Calendar;

use super::memory::InMemoryStore;
use super::repository::{
    AttendanceRepository, EmployeeDirectory, PayrollRepository, PolicyProvider, ScheduleResolver,
};

/// The set of collaborators every service needs.
///
/// Cloning is cheap; all handles are reference counted.
#[derive(Clone)]
pub struct EngineContext {
    /// Attendance and break storage.
    pub attendance: Arc<dyn AttendanceRepository>,
    /// Payroll period and item storage.
    pub payroll: Arc<dyn PayrollRepository>,
    /// Employee master data.
    pub employees: Arc<dyn EmployeeDirectory>,
    /// Schedule lookup.
    pub schedules: Arc<dyn ScheduleResolver>,
    /// Per-company policies.
    pub policies: Arc<dyn PolicyProvider>,
    /// Holiday and weekend lookup.
    pub calendar: Arc<dyn Calendar>,
}

impl EngineContext {
    /// Wires every repository to one [`InMemoryStore`].
    pub fn in_memory(store: InMemoryStore, calendar: impl Calendar + 'static) -> Self {
        let store = Arc::new(store);
        Self {
            attendance: store.clone(),
            payroll: store.clone(),
            employees: store.clone(),
            schedules: store.clone(),
            policies: store,
            calendar: Arc::new(calendar),
        }
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext").finish_non_exhaustive()
    }
}
