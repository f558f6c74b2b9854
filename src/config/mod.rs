//! Company policy configuration.
//!
//! Policies are stored as loosely-typed documents and merged against defaults
//! into strongly-typed configs before the engine sees them. This module also
//! loads policy documents from YAML and validates them against legal floors.
//!
//! # Example
//!
//! ```no_run
//! use attendance_payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/sample").unwrap();
//! println!("Night window: {:?}", loader.policies().attendance.night_window);
//! ```

mod loader;
mod types;
mod validation;

pub use loader::ConfigLoader;
pub use types::{
    AllowanceConfig, AllowanceConfigDocument, AllowanceType, AttendanceConfig,
    AttendanceConfigDocument, BreakConfig, BreakConfigDocument, DeductionConfig,
    DeductionConfigDocument, DeductionType, FixedBreakPeriod, GeoFence, OvertimeConfig,
    OvertimeConfigDocument, PayrollConfig, PayrollConfigDocument, PolicySet, RoundingDirection,
    RoundingMode, RoundingRule, TimeWindow,
};
