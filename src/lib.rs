//! Attendance-to-Payroll Calculation Engine
//!
//! This crate turns raw check-in/check-out punches and break sessions into
//! per-day attendance metrics, and those into per-employee monthly payroll
//! items under company policy and jurisdictional floors.
//!
//! - [`calculation`]: pure functions (rounding, breaks, metrics, overtime tiers, pay)
//! - [`config`]: policy documents, defaults, YAML loading and validation
//! - [`models`]: domain types
//! - [`service`]: check-in/out, breaks, adjustments, and the payroll period lifecycle

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
