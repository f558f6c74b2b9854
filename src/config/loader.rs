//! Policy loading from YAML files.
//!
//! This module provides the [`ConfigLoader`] type for loading a company's
//! policy documents from a directory.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{
    AllowanceConfigDocument, AttendanceConfigDocument, BreakConfigDocument,
    DeductionConfigDocument, OvertimeConfigDocument, PayrollConfigDocument, PolicySet,
};

/// Loads policy documents and merges them with defaults.
///
/// # Directory Structure
///
/// Every file is optional; a missing file means "all defaults" for that
/// policy domain.
///
/// ```text
/// config/sample/
/// ├── attendance.yaml   # Grace, rounding, night window, locations
/// ├── break.yaml        # Break tracking and caps
/// ├── overtime.yaml     # Overtime multipliers
/// ├── payroll.yaml      # Proration and rounding
/// ├── allowance.yaml    # Allowance types
/// └── deduction.yaml    # Deduction types
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/sample")?;
/// println!("Locale: {}", loader.policies().attendance.locale);
/// # Ok::<(), attendance_payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    policies: PolicySet,
}

impl ConfigLoader {
    /// Loads all policy documents from the specified directory.
    ///
    /// Returns `ConfigNotFound` if the directory itself does not exist and
    /// `ConfigParseError` if any present file is not valid YAML for its
    /// document type. The loaded policies are not validated against legal
    /// minimums; use [`BreakConfig::validate`](super::BreakConfig::validate)
    /// and [`OvertimeConfig::validate`](super::OvertimeConfig::validate) for
    /// that.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(EngineError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let attendance: AttendanceConfigDocument =
            Self::load_optional_yaml(&path.join("attendance.yaml"))?;
        let breaks: BreakConfigDocument = Self::load_optional_yaml(&path.join("break.yaml"))?;
        let overtime: OvertimeConfigDocument =
            Self::load_optional_yaml(&path.join("overtime.yaml"))?;
        let payroll: PayrollConfigDocument =
            Self::load_optional_yaml(&path.join("payroll.yaml"))?;
        let allowance: AllowanceConfigDocument =
            Self::load_optional_yaml(&path.join("allowance.yaml"))?;
        let deduction: DeductionConfigDocument =
            Self::load_optional_yaml(&path.join("deduction.yaml"))?;

        let policies = PolicySet {
            attendance: attendance.merge_with_defaults(),
            breaks: breaks.merge_with_defaults(),
            overtime: overtime.merge_with_defaults(),
            payroll: payroll.merge_with_defaults(),
            allowance: allowance.merge_with_defaults(),
            deduction: deduction.merge_with_defaults(),
        };

        tracing::debug!(path = %path.display(), locale = %policies.attendance.locale, "loaded policy set");

        Ok(Self { policies })
    }

    /// Parses a YAML document, or returns the empty document if the file is absent.
    fn load_optional_yaml<T: DeserializeOwned + Default>(path: &Path) -> EngineResult<T> {
        if !path.exists() {
            return Ok(T::default());
        }
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        // An empty file deserializes to YAML null; treat it as an empty document.
        if content.trim().is_empty() {
            return Ok(T::default());
        }

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded policies.
    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }

    /// Consumes the loader, returning the loaded policies.
    pub fn into_policies(self) -> PolicySet {
        self.policies
    }
}
