//! Write-time policy validation.
//!
//! Violations are reported, never clamped.

use rust_decimal::Decimal;

use crate::calculation::{REFERENCE_SHIFT_MINUTES, minimum_break_minutes, minimum_overtime_multipliers};
use crate::error::{EngineError, EngineResult};

use super::types::{BreakConfig, OvertimeConfig, PayrollConfig};

impl BreakConfig {
    /// Checks internal consistency and, when `use_legal_minimum` is set, the
    /// configured minimum against the legal minimum for an 8-hour shift.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_payroll_engine::config::BreakConfig;
    /// use attendance_payroll_engine::error::ErrorKind;
    ///
    /// let config = BreakConfig {
    ///     minimum_break_minutes: 30,
    ///     use_legal_minimum: true,
    ///     ..BreakConfig::default()
    /// };
    /// let err = config.validate("ja-JP").unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::PolicyViolation);
    /// ```
    pub fn validate(&self, locale: &str) -> EngineResult<()> {
        if self.minimum_break_minutes > self.default_break_minutes {
            return Err(EngineError::validation(format!(
                "minimum_break_minutes ({}) exceeds default_break_minutes ({})",
                self.minimum_break_minutes, self.default_break_minutes
            )));
        }
        if let Some(max) = self.maximum_break_minutes {
            if self.default_break_minutes > max {
                return Err(EngineError::validation(format!(
                    "default_break_minutes ({}) exceeds maximum_break_minutes ({})",
                    self.default_break_minutes, max
                )));
            }
            if self.night_minimum_break_minutes > max {
                return Err(EngineError::validation(format!(
                    "night_minimum_break_minutes ({}) exceeds maximum_break_minutes ({})",
                    self.night_minimum_break_minutes, max
                )));
            }
        }
        if self.night_minimum_break_minutes > self.night_default_break_minutes {
            return Err(EngineError::validation(format!(
                "night_minimum_break_minutes ({}) exceeds night_default_break_minutes ({})",
                self.night_minimum_break_minutes, self.night_default_break_minutes
            )));
        }
        for period in &self.fixed_break_periods {
            if period.start == period.end {
                return Err(EngineError::validation(
                    "fixed break period has zero length",
                ));
            }
        }

        if self.use_legal_minimum {
            let legal = minimum_break_minutes(locale, REFERENCE_SHIFT_MINUTES, false);
            if self.minimum_break_minutes < legal {
                return Err(EngineError::PolicyViolation {
                    field: "minimum_break_minutes".to_string(),
                    configured: self.minimum_break_minutes.to_string(),
                    minimum: legal.to_string(),
                    locale: locale.to_string(),
                });
            }
            let legal_night = minimum_break_minutes(locale, REFERENCE_SHIFT_MINUTES, true);
            if self.night_minimum_break_minutes < legal_night {
                return Err(EngineError::PolicyViolation {
                    field: "night_minimum_break_minutes".to_string(),
                    configured: self.night_minimum_break_minutes.to_string(),
                    minimum: legal_night.to_string(),
                    locale: locale.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl OvertimeConfig {
    /// Checks multipliers are positive and, when `use_legal_minimum` is set,
    /// that each tier meets the jurisdiction's floor.
    pub fn validate(&self, locale: &str) -> EngineResult<()> {
        let tiers = [
            ("regular_multiplier", self.regular_multiplier),
            ("night_multiplier", self.night_multiplier),
            ("holiday_multiplier", self.holiday_multiplier),
            ("weekend_multiplier", self.weekend_multiplier),
        ];
        for (field, value) in tiers {
            if value <= Decimal::ZERO {
                return Err(EngineError::validation(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }

        if self.use_legal_minimum {
            let legal = minimum_overtime_multipliers(locale);
            let floors = [legal.regular, legal.night, legal.holiday, legal.weekend];
            for ((field, value), floor) in tiers.into_iter().zip(floors) {
                if value < floor {
                    return Err(EngineError::PolicyViolation {
                        field: field.to_string(),
                        configured: value.normalize().to_string(),
                        minimum: floor.normalize().to_string(),
                        locale: locale.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl PayrollConfig {
    /// Rejects denominators and rounding units that would make payroll
    /// arithmetic undefined.
    pub fn validate(&self) -> EngineResult<()> {
        if self.standard_working_days_per_month == 0 {
            return Err(EngineError::validation(
                "standard_working_days_per_month must be positive",
            ));
        }
        if self.standard_hours_per_day <= Decimal::ZERO {
            return Err(EngineError::validation(
                "standard_hours_per_day must be positive",
            ));
        }
        if self.rounding_unit <= Decimal::ZERO {
            return Err(EngineError::validation("rounding_unit must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_default_policies_are_valid() {
        assert!(BreakConfig::default().validate("ja-JP").is_ok());
        assert!(OvertimeConfig::default().validate("ja-JP").is_ok());
        assert!(PayrollConfig::default().validate().is_ok());
    }

    #[test]
    fn test_break_minimum_above_default_rejected() {
        let config = BreakConfig {
            minimum_break_minutes: 70,
            ..BreakConfig::default()
        };
        let err = config.validate("ja-JP").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_break_default_above_maximum_rejected() {
        let config = BreakConfig {
            maximum_break_minutes: Some(50),
            ..BreakConfig::default()
        };
        assert!(config.validate("ja-JP").is_err());
    }

    #[test]
    fn test_unbounded_maximum_allowed() {
        let config = BreakConfig {
            maximum_break_minutes: None,
            ..BreakConfig::default()
        };
        assert!(config.validate("ja-JP").is_ok());
    }

    #[test]
    fn test_break_below_legal_minimum_rejected_only_when_enforced() {
        let config = BreakConfig {
            minimum_break_minutes: 30,
            night_minimum_break_minutes: 30,
            use_legal_minimum: false,
            ..BreakConfig::default()
        };
        assert!(config.validate("ja-JP").is_ok());

        let enforced = BreakConfig {
            use_legal_minimum: true,
            ..config
        };
        match enforced.validate("ja-JP") {
            Err(EngineError::PolicyViolation {
                field,
                configured,
                minimum,
                ..
            }) => {
                assert_eq!(field, "minimum_break_minutes");
                assert_eq!(configured, "30");
                assert_eq!(minimum, "45");
            }
            other => panic!("Expected PolicyViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_korea_requires_sixty_minutes_for_eight_hours() {
        let config = BreakConfig {
            use_legal_minimum: true,
            ..BreakConfig::default()
        };
        // 45 is enough in ja-JP but not in ko-KR.
        assert!(config.validate("ja-JP").is_ok());
        assert!(config.validate("ko-KR").is_err());
    }

    #[test]
    fn test_overtime_below_legal_minimum_rejected() {
        let config = OvertimeConfig {
            night_multiplier: dec("1.25"),
            use_legal_minimum: true,
            ..OvertimeConfig::default()
        };
        match config.validate("ja-JP") {
            Err(EngineError::PolicyViolation { field, minimum, .. }) => {
                assert_eq!(field, "night_multiplier");
                assert_eq!(minimum, "1.5");
            }
            other => panic!("Expected PolicyViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_overtime_above_legal_minimum_accepted() {
        let config = OvertimeConfig {
            regular_multiplier: dec("1.5"),
            night_multiplier: dec("2.0"),
            holiday_multiplier: dec("1.5"),
            weekend_multiplier: dec("1.5"),
            use_legal_minimum: true,
            ..OvertimeConfig::default()
        };
        assert!(config.validate("ko-KR").is_ok());
    }

    #[test]
    fn test_non_positive_multiplier_rejected() {
        let config = OvertimeConfig {
            weekend_multiplier: Decimal::ZERO,
            ..OvertimeConfig::default()
        };
        assert_eq!(
            config.validate("en-US").unwrap_err().kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_payroll_zero_denominator_rejected() {
        let config = PayrollConfig {
            standard_working_days_per_month: 0,
            ..PayrollConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
