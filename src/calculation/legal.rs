//! Jurisdictional minimums for breaks and overtime.
//!
//! These are policy floors. Company configuration may exceed them; when a
//! policy opts into legal minimums, configuration below them is rejected at
//! write time (see [`crate::config::BreakConfig::validate`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Locale used when a company's locale has no table.
pub const DEFAULT_LOCALE: &str = "ja-JP";

/// Working minutes of the reference shift used when validating a configured
/// break minimum against the law.
pub const REFERENCE_SHIFT_MINUTES: u32 = 8 * 60;

/// Minimum overtime multipliers for one jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalMultipliers {
    /// Regular (daytime) overtime.
    pub regular: Decimal,
    /// Night overtime.
    pub night: Decimal,
    /// Overtime on a holiday.
    pub holiday: Decimal,
    /// Overtime on a weekend day.
    pub weekend: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Jurisdiction {
    Japan,
    Korea,
    UnitedStates,
}

impl Jurisdiction {
    fn for_locale(locale: &str) -> Self {
        match locale {
            "ja-JP" => Jurisdiction::Japan,
            "ko-KR" => Jurisdiction::Korea,
            "en-US" => Jurisdiction::UnitedStates,
            other => {
                tracing::debug!(locale = other, fallback = DEFAULT_LOCALE, "no legal table for locale");
                Jurisdiction::Japan
            }
        }
    }
}

/// Returns the legal minimum break for a shift of `working_minutes`.
///
/// | Locale | Rule |
/// |--------|------|
/// | ja-JP  | over 6h: 45 min, over 8h: 60 min |
/// | ko-KR  | 4h or more: 30 min, 8h or more: 60 min |
/// | en-US  | none |
///
/// Unknown locales use the ja-JP table. Night shifts currently have the same
/// floor as day shifts in every table.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::minimum_break_minutes;
///
/// assert_eq!(minimum_break_minutes("ja-JP", 480, false), 45);
/// assert_eq!(minimum_break_minutes("ja-JP", 481, false), 60);
/// assert_eq!(minimum_break_minutes("ko-KR", 240, false), 30);
/// assert_eq!(minimum_break_minutes("en-US", 600, true), 0);
/// ```
pub fn minimum_break_minutes(locale: &str, working_minutes: u32, _is_night_shift: bool) -> u32 {
    match Jurisdiction::for_locale(locale) {
        Jurisdiction::Japan => match working_minutes {
            m if m > 8 * 60 => 60,
            m if m > 6 * 60 => 45,
            _ => 0,
        },
        Jurisdiction::Korea => match working_minutes {
            m if m >= 8 * 60 => 60,
            m if m >= 4 * 60 => 30,
            _ => 0,
        },
        Jurisdiction::UnitedStates => 0,
    }
}

/// Returns the legal minimum overtime multipliers for a locale.
///
/// Unknown locales use the ja-JP table.
pub fn minimum_overtime_multipliers(locale: &str) -> LegalMultipliers {
    match Jurisdiction::for_locale(locale) {
        Jurisdiction::Japan => LegalMultipliers {
            regular: Decimal::new(125, 2),
            night: Decimal::new(150, 2),
            holiday: Decimal::new(135, 2),
            weekend: Decimal::new(125, 2),
        },
        Jurisdiction::Korea => LegalMultipliers {
            regular: Decimal::new(15, 1),
            night: Decimal::new(20, 1),
            holiday: Decimal::new(15, 1),
            weekend: Decimal::new(15, 1),
        },
        Jurisdiction::UnitedStates => LegalMultipliers {
            regular: Decimal::new(15, 1),
            night: Decimal::new(15, 1),
            holiday: Decimal::ONE,
            weekend: Decimal::ONE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_japan_break_thresholds() {
        assert_eq!(minimum_break_minutes("ja-JP", 360, false), 0);
        assert_eq!(minimum_break_minutes("ja-JP", 361, false), 45);
        assert_eq!(minimum_break_minutes("ja-JP", 480, false), 45);
        assert_eq!(minimum_break_minutes("ja-JP", 481, false), 60);
    }

    #[test]
    fn test_korea_break_thresholds() {
        assert_eq!(minimum_break_minutes("ko-KR", 239, false), 0);
        assert_eq!(minimum_break_minutes("ko-KR", 240, false), 30);
        assert_eq!(minimum_break_minutes("ko-KR", 479, false), 30);
        assert_eq!(minimum_break_minutes("ko-KR", 480, false), 60);
    }

    #[test]
    fn test_night_shift_uses_same_floor() {
        assert_eq!(
            minimum_break_minutes("ja-JP", 540, true),
            minimum_break_minutes("ja-JP", 540, false)
        );
    }

    #[test]
    fn test_unknown_locale_falls_back_to_default() {
        assert_eq!(
            minimum_break_minutes("fr-FR", 540, false),
            minimum_break_minutes(DEFAULT_LOCALE, 540, false)
        );
        assert_eq!(
            minimum_overtime_multipliers("fr-FR"),
            minimum_overtime_multipliers(DEFAULT_LOCALE)
        );
    }

    #[test]
    fn test_overtime_multipliers_by_locale() {
        let jp = minimum_overtime_multipliers("ja-JP");
        assert_eq!(jp.regular, dec("1.25"));
        assert_eq!(jp.night, dec("1.5"));
        assert_eq!(jp.holiday, dec("1.35"));

        let kr = minimum_overtime_multipliers("ko-KR");
        assert_eq!(kr.night, dec("2.0"));

        let us = minimum_overtime_multipliers("en-US");
        assert_eq!(us.regular, dec("1.5"));
        assert_eq!(us.weekend, dec("1"));
    }
}
