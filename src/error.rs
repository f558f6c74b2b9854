//! Error types for the attendance and payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while recording attendance,
//! calculating payroll, or moving a payroll period through its lifecycle.

use thiserror::Error;

/// The broad category an [`EngineError`] belongs to.
///
/// Callers that only need to know *how* to react (reject input, report a
/// missing record, surface a conflict) can branch on the kind instead of
/// matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or contradictory input, rejected before any mutation.
    Validation,
    /// A referenced record or assignment does not exist.
    NotFound,
    /// Duplicate, overlapping, or otherwise conflicting with current state.
    Conflict,
    /// Company configuration below a legal floor.
    PolicyViolation,
    /// Policy documents could not be read.
    Configuration,
    /// Arithmetic or storage failures.
    Internal,
}

/// The main error type for the engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::error::{EngineError, ErrorKind};
///
/// let error = EngineError::InvalidState {
///     entity: "payroll period".to_string(),
///     expected: "DRAFT".to_string(),
///     actual: "APPROVED".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Invalid payroll period state: expected DRAFT, found APPROVED"
/// );
/// assert_eq!(error.kind(), ErrorKind::Conflict);
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Policy document was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Policy document could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Input was malformed or contradictory.
    #[error("Validation failed: {message}")]
    Validation {
        /// A description of what made the input invalid.
        message: String,
    },

    /// A referenced record was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record (e.g. "attendance record").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The operation conflicts with existing data.
    #[error("Conflict: {message}")]
    Conflict {
        /// A description of the conflict, including current state.
        message: String,
    },

    /// A lifecycle transition was attempted from the wrong state.
    #[error("Invalid {entity} state: expected {expected}, found {actual}")]
    InvalidState {
        /// The entity whose state was checked.
        entity: String,
        /// The state the operation requires.
        expected: String,
        /// The state the entity is actually in.
        actual: String,
    },

    /// A policy value is below the jurisdiction's legal minimum.
    #[error(
        "Policy violation for '{field}': configured {configured} is below legal minimum {minimum} ({locale})"
    )]
    PolicyViolation {
        /// The configuration field that was rejected.
        field: String,
        /// The configured value.
        configured: String,
        /// The legal minimum for the jurisdiction.
        minimum: String,
        /// The locale whose table was applied.
        locale: String,
    },

    /// A calculation could not be completed.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// The backing store failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },
}

impl EngineError {
    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation { .. } => ErrorKind::Validation,
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::Conflict { .. } | EngineError::InvalidState { .. } => {
                ErrorKind::Conflict
            }
            EngineError::PolicyViolation { .. } => ErrorKind::PolicyViolation,
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ErrorKind::Configuration
            }
            EngineError::CalculationError { .. } | EngineError::Storage { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::NotFound`] error.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`EngineError::Conflict`] error.
    pub fn conflict(message: impl Into<String>) -> Self {
        EngineError::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::Storage`] error.
    pub fn storage(message: impl Into<String>) -> Self {
        EngineError::Storage {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/break.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/break.yaml"
        );
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/policies/payroll.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/policies/payroll.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_not_found_displays_entity_and_id() {
        let error = EngineError::not_found("attendance record", "rec_001");
        assert_eq!(error.to_string(), "attendance record not found: rec_001");
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_invalid_state_is_a_conflict() {
        let error = EngineError::InvalidState {
            entity: "payroll period".to_string(),
            expected: "REVIEWING".to_string(),
            actual: "DRAFT".to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert!(error.to_string().contains("expected REVIEWING, found DRAFT"));
    }

    #[test]
    fn test_policy_violation_displays_floor() {
        let error = EngineError::PolicyViolation {
            field: "minimum_break_minutes".to_string(),
            configured: "30".to_string(),
            minimum: "45".to_string(),
            locale: "ja-JP".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Policy violation for 'minimum_break_minutes': configured 30 is below legal minimum 45 (ja-JP)"
        );
        assert_eq!(error.kind(), ErrorKind::PolicyViolation);
    }

    #[test]
    fn test_validation_helper() {
        let error = EngineError::validation("check-out precedes check-in");
        assert_eq!(
            error.to_string(),
            "Validation failed: check-out precedes check-in"
        );
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_conflict() -> EngineResult<()> {
            Err(EngineError::conflict("duplicate check-in"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_conflict()?;
            Ok(())
        }

        assert!(matches!(
            propagates_error(),
            Err(EngineError::Conflict { .. })
        ));
    }
}
