//! Stateful operations of the engine.
//!
//! Services are thin orchestration over the pure functions in
//! [`crate::calculation`]: they load what a calculation needs through the
//! repository traits, capture a [`PolicySnapshot`] for the duration of the
//! operation, and persist the results.

mod attendance;
mod context;
mod locks;
mod memory;
mod payroll;
mod policy;
mod repository;

pub use attendance::{AttendanceAdjustment, AttendanceService, BreakAdjustment};
pub use context::EngineContext;
pub use locks::{KeyGuard, KeyedLocks};
pub use memory::InMemoryStore;
pub use payroll::{PayrollItemAdjustment, PayrollService, PeriodCalculation};
pub use policy::{PolicyService, PolicySnapshot};
pub use repository::{
    AttendanceRepository, EmployeeDirectory, PayrollRepository, PolicyDocument, PolicyProvider,
    ScheduleResolver,
};
