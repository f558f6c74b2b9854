//! Policy configuration types.
//!
//! Each policy domain comes in two shapes: a loosely-typed `*Document`, where
//! every field is optional and which is what gets stored and deserialized from
//! YAML, and a fully-defaulted `*Config` that the engine computes with. The
//! pure `merge_with_defaults` functions convert one into the other.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{BreakType, DeductionAmount};

/// Direction of time rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundingDirection {
    /// To the nearest unit; exact halves round up.
    Nearest,
    /// Always to the next unit boundary.
    Up,
    /// Always to the previous unit boundary.
    Down,
}

/// A time rounding rule: granularity in minutes plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingRule {
    /// Granularity in minutes. Zero disables rounding.
    pub unit_minutes: u32,
    /// Rounding direction.
    pub direction: RoundingDirection,
}

/// A time-of-day interval `[start, end)` that may wrap midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window.
    pub start: NaiveTime,
    /// End of the window; before `start` when the window wraps midnight.
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Returns true if `time` falls in the window.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_payroll_engine::config::TimeWindow;
    /// use chrono::NaiveTime;
    ///
    /// let night = TimeWindow {
    ///     start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
    ///     end: NaiveTime::from_hms_opt(5, 0, 0).unwrap(),
    /// };
    /// assert!(night.contains(NaiveTime::from_hms_opt(23, 30, 0).unwrap()));
    /// assert!(night.contains(NaiveTime::from_hms_opt(4, 59, 0).unwrap()));
    /// assert!(!night.contains(NaiveTime::from_hms_opt(5, 0, 0).unwrap()));
    /// ```
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            time >= self.start && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

/// A circular area where check-in is permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    /// Display name of the site.
    pub name: String,
    /// Centre latitude in degrees.
    pub latitude: f64,
    /// Centre longitude in degrees.
    pub longitude: f64,
    /// Radius in metres.
    pub radius_meters: f64,
}

/// A configured fixed break period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedBreakPeriod {
    /// Break start.
    pub start: NaiveTime,
    /// Break end; next day when not after `start`.
    pub end: NaiveTime,
}

/// How monetary amounts are rounded to the rounding unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundingMode {
    /// Toward negative infinity.
    Floor,
    /// Toward positive infinity.
    Ceil,
    /// Half away from zero.
    Round,
}

/// A predefined allowance type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceType {
    /// Type code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Amount used when an assignment carries none.
    #[serde(default)]
    pub default_amount: Option<Decimal>,
    /// Reporting flag.
    #[serde(default)]
    pub taxable: bool,
}

/// A predefined deduction type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionType {
    /// Type code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Amount used when an assignment carries none.
    #[serde(default)]
    pub default_amount: Option<DeductionAmount>,
    /// Reporting flag.
    #[serde(default)]
    pub taxable: bool,
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

// =============================================================================
// Attendance
// =============================================================================

/// Attendance policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceConfig {
    /// Jurisdiction for legal tables (e.g. "ja-JP").
    pub locale: String,
    /// Minutes after scheduled start before lateness is recorded.
    pub late_grace_minutes: u32,
    /// Minutes before scheduled end before early leave is recorded.
    pub early_leave_grace_minutes: u32,
    /// Rounding applied to check-in.
    pub check_in_rounding: Option<RoundingRule>,
    /// Rounding applied to check-out.
    pub check_out_rounding: Option<RoundingRule>,
    /// Rounding applied to break start.
    pub break_start_rounding: Option<RoundingRule>,
    /// Rounding applied to break end.
    pub break_end_rounding: Option<RoundingRule>,
    /// Night window for night breaks and night overtime.
    pub night_window: TimeWindow,
    /// Start of the company default schedule.
    pub default_start: NaiveTime,
    /// End of the company default schedule.
    pub default_end: NaiveTime,
    /// Require coordinates inside an allowed location.
    pub require_location: bool,
    /// Allowed check-in locations.
    pub allowed_locations: Vec<GeoFence>,
    /// Allowed source IPs; empty allows any.
    pub allowed_ip_addresses: Vec<String>,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            locale: "ja-JP".to_string(),
            late_grace_minutes: 0,
            early_leave_grace_minutes: 0,
            check_in_rounding: None,
            check_out_rounding: None,
            break_start_rounding: None,
            break_end_rounding: None,
            night_window: TimeWindow {
                start: time(22, 0),
                end: time(5, 0),
            },
            default_start: time(9, 0),
            default_end: time(18, 0),
            require_location: false,
            allowed_locations: Vec::new(),
            allowed_ip_addresses: Vec::new(),
        }
    }
}

/// Stored form of [`AttendanceConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceConfigDocument {
    pub locale: Option<String>,
    pub late_grace_minutes: Option<u32>,
    pub early_leave_grace_minutes: Option<u32>,
    pub check_in_rounding: Option<RoundingRule>,
    pub check_out_rounding: Option<RoundingRule>,
    pub break_start_rounding: Option<RoundingRule>,
    pub break_end_rounding: Option<RoundingRule>,
    pub night_window: Option<TimeWindow>,
    pub default_start: Option<NaiveTime>,
    pub default_end: Option<NaiveTime>,
    pub require_location: Option<bool>,
    pub allowed_locations: Option<Vec<GeoFence>>,
    pub allowed_ip_addresses: Option<Vec<String>>,
}

impl AttendanceConfigDocument {
    /// Fills absent fields from [`AttendanceConfig::default`].
    pub fn merge_with_defaults(self) -> AttendanceConfig {
        let d = AttendanceConfig::default();
        AttendanceConfig {
            locale: self.locale.unwrap_or(d.locale),
            late_grace_minutes: self.late_grace_minutes.unwrap_or(d.late_grace_minutes),
            early_leave_grace_minutes: self
                .early_leave_grace_minutes
                .unwrap_or(d.early_leave_grace_minutes),
            check_in_rounding: self.check_in_rounding.or(d.check_in_rounding),
            check_out_rounding: self.check_out_rounding.or(d.check_out_rounding),
            break_start_rounding: self.break_start_rounding.or(d.break_start_rounding),
            break_end_rounding: self.break_end_rounding.or(d.break_end_rounding),
            night_window: self.night_window.unwrap_or(d.night_window),
            default_start: self.default_start.unwrap_or(d.default_start),
            default_end: self.default_end.unwrap_or(d.default_end),
            require_location: self.require_location.unwrap_or(d.require_location),
            allowed_locations: self.allowed_locations.unwrap_or(d.allowed_locations),
            allowed_ip_addresses: self.allowed_ip_addresses.unwrap_or(d.allowed_ip_addresses),
        }
    }
}

// =============================================================================
// Breaks
// =============================================================================

/// Break policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakConfig {
    /// Track individual break sessions.
    pub tracking_enabled: bool,
    /// Synthesize sessions from fixed periods instead of tracking.
    pub fixed_break_mode: bool,
    /// Periods used by fixed break mode.
    pub fixed_break_periods: Vec<FixedBreakPeriod>,
    /// Whether break time is paid.
    pub break_type: BreakType,
    /// Lower bound for effective minutes of a day break.
    pub minimum_break_minutes: u32,
    /// Break minutes substituted when tracking is off.
    pub default_break_minutes: u32,
    /// Upper bound for effective minutes; unbounded when absent.
    pub maximum_break_minutes: Option<u32>,
    /// Lower bound for effective minutes of a night break.
    pub night_minimum_break_minutes: u32,
    /// Default duration of a night break.
    pub night_default_break_minutes: u32,
    /// Cap on sessions per attendance record.
    pub max_breaks_per_day: u32,
    /// Enforce the jurisdiction's legal minimum.
    pub use_legal_minimum: bool,
}

impl Default for BreakConfig {
    fn default() -> Self {
        Self {
            tracking_enabled: true,
            fixed_break_mode: false,
            fixed_break_periods: Vec::new(),
            break_type: BreakType::Unpaid,
            minimum_break_minutes: 45,
            default_break_minutes: 60,
            maximum_break_minutes: Some(90),
            night_minimum_break_minutes: 45,
            night_default_break_minutes: 60,
            max_breaks_per_day: 5,
            use_legal_minimum: false,
        }
    }
}

/// Stored form of [`BreakConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakConfigDocument {
    pub tracking_enabled: Option<bool>,
    pub fixed_break_mode: Option<bool>,
    pub fixed_break_periods: Option<Vec<FixedBreakPeriod>>,
    pub break_type: Option<BreakType>,
    pub minimum_break_minutes: Option<u32>,
    pub default_break_minutes: Option<u32>,
    pub maximum_break_minutes: Option<u32>,
    pub night_minimum_break_minutes: Option<u32>,
    pub night_default_break_minutes: Option<u32>,
    pub max_breaks_per_day: Option<u32>,
    pub use_legal_minimum: Option<bool>,
}

impl BreakConfigDocument {
    /// Fills absent fields from [`BreakConfig::default`].
    pub fn merge_with_defaults(self) -> BreakConfig {
        let d = BreakConfig::default();
        BreakConfig {
            tracking_enabled: self.tracking_enabled.unwrap_or(d.tracking_enabled),
            fixed_break_mode: self.fixed_break_mode.unwrap_or(d.fixed_break_mode),
            fixed_break_periods: self.fixed_break_periods.unwrap_or(d.fixed_break_periods),
            break_type: self.break_type.unwrap_or(d.break_type),
            minimum_break_minutes: self
                .minimum_break_minutes
                .unwrap_or(d.minimum_break_minutes),
            default_break_minutes: self
                .default_break_minutes
                .unwrap_or(d.default_break_minutes),
            maximum_break_minutes: self.maximum_break_minutes.or(d.maximum_break_minutes),
            night_minimum_break_minutes: self
                .night_minimum_break_minutes
                .unwrap_or(d.night_minimum_break_minutes),
            night_default_break_minutes: self
                .night_default_break_minutes
                .unwrap_or(d.night_default_break_minutes),
            max_breaks_per_day: self.max_breaks_per_day.unwrap_or(d.max_breaks_per_day),
            use_legal_minimum: self.use_legal_minimum.unwrap_or(d.use_legal_minimum),
        }
    }
}

// =============================================================================
// Overtime
// =============================================================================

/// Overtime policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeConfig {
    /// Pay overtime at all.
    pub enabled: bool,
    /// Multiplier for regular overtime.
    pub regular_multiplier: Decimal,
    /// Multiplier for night overtime.
    pub night_multiplier: Decimal,
    /// Multiplier for holiday overtime.
    pub holiday_multiplier: Decimal,
    /// Multiplier for weekend overtime.
    pub weekend_multiplier: Decimal,
    /// Enforce the jurisdiction's legal minimum multipliers.
    pub use_legal_minimum: bool,
}

impl Default for OvertimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            regular_multiplier: Decimal::new(125, 2),
            night_multiplier: Decimal::new(150, 2),
            holiday_multiplier: Decimal::new(135, 2),
            weekend_multiplier: Decimal::new(125, 2),
            use_legal_minimum: false,
        }
    }
}

/// Stored form of [`OvertimeConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OvertimeConfigDocument {
    pub enabled: Option<bool>,
    pub regular_multiplier: Option<Decimal>,
    pub night_multiplier: Option<Decimal>,
    pub holiday_multiplier: Option<Decimal>,
    pub weekend_multiplier: Option<Decimal>,
    pub use_legal_minimum: Option<bool>,
}

impl OvertimeConfigDocument {
    /// Fills absent fields from [`OvertimeConfig::default`].
    pub fn merge_with_defaults(self) -> OvertimeConfig {
        let d = OvertimeConfig::default();
        OvertimeConfig {
            enabled: self.enabled.unwrap_or(d.enabled),
            regular_multiplier: self.regular_multiplier.unwrap_or(d.regular_multiplier),
            night_multiplier: self.night_multiplier.unwrap_or(d.night_multiplier),
            holiday_multiplier: self.holiday_multiplier.unwrap_or(d.holiday_multiplier),
            weekend_multiplier: self.weekend_multiplier.unwrap_or(d.weekend_multiplier),
            use_legal_minimum: self.use_legal_minimum.unwrap_or(d.use_legal_minimum),
        }
    }
}

// =============================================================================
// Payroll
// =============================================================================

/// Payroll policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollConfig {
    /// Denominator for prorating monthly salaries.
    pub standard_working_days_per_month: u32,
    /// Hours in a standard working day.
    pub standard_hours_per_day: Decimal,
    /// Monetary rounding unit (e.g. 1, 10, 0.01).
    pub rounding_unit: Decimal,
    /// Monetary rounding mode.
    pub rounding_mode: RoundingMode,
    /// Currency code (reporting only).
    pub currency: String,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            standard_working_days_per_month: 22,
            standard_hours_per_day: Decimal::from(8),
            rounding_unit: Decimal::ONE,
            rounding_mode: RoundingMode::Floor,
            currency: "JPY".to_string(),
        }
    }
}

/// Stored form of [`PayrollConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollConfigDocument {
    pub standard_working_days_per_month: Option<u32>,
    pub standard_hours_per_day: Option<Decimal>,
    pub rounding_unit: Option<Decimal>,
    pub rounding_mode: Option<RoundingMode>,
    pub currency: Option<String>,
}

impl PayrollConfigDocument {
    /// Fills absent fields from [`PayrollConfig::default`].
    pub fn merge_with_defaults(self) -> PayrollConfig {
        let d = PayrollConfig::default();
        PayrollConfig {
            standard_working_days_per_month: self
                .standard_working_days_per_month
                .unwrap_or(d.standard_working_days_per_month),
            standard_hours_per_day: self
                .standard_hours_per_day
                .unwrap_or(d.standard_hours_per_day),
            rounding_unit: self.rounding_unit.unwrap_or(d.rounding_unit),
            rounding_mode: self.rounding_mode.unwrap_or(d.rounding_mode),
            currency: self.currency.unwrap_or(d.currency),
        }
    }
}

// =============================================================================
// Allowances & deductions
// =============================================================================

/// Allowance policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceConfig {
    /// Include allowances in payroll.
    pub enabled: bool,
    /// Predefined allowance types.
    pub types: Vec<AllowanceType>,
}

impl Default for AllowanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            types: Vec::new(),
        }
    }
}

impl AllowanceConfig {
    /// Looks up a type by code.
    pub fn find_type(&self, code: &str) -> Option<&AllowanceType> {
        self.types.iter().find(|t| t.code == code)
    }
}

/// Stored form of [`AllowanceConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowanceConfigDocument {
    pub enabled: Option<bool>,
    pub types: Option<Vec<AllowanceType>>,
}

impl AllowanceConfigDocument {
    /// Fills absent fields from [`AllowanceConfig::default`].
    pub fn merge_with_defaults(self) -> AllowanceConfig {
        let d = AllowanceConfig::default();
        AllowanceConfig {
            enabled: self.enabled.unwrap_or(d.enabled),
            types: self.types.unwrap_or(d.types),
        }
    }
}

/// Deduction policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionConfig {
    /// Include deductions in payroll.
    pub enabled: bool,
    /// Predefined deduction types.
    pub types: Vec<DeductionType>,
}

impl Default for DeductionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            types: Vec::new(),
        }
    }
}

impl DeductionConfig {
    /// Looks up a type by code.
    pub fn find_type(&self, code: &str) -> Option<&DeductionType> {
        self.types.iter().find(|t| t.code == code)
    }
}

/// Stored form of [`DeductionConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionConfigDocument {
    pub enabled: Option<bool>,
    pub types: Option<Vec<DeductionType>>,
}

impl DeductionConfigDocument {
    /// Fills absent fields from [`DeductionConfig::default`].
    pub fn merge_with_defaults(self) -> DeductionConfig {
        let d = DeductionConfig::default();
        DeductionConfig {
            enabled: self.enabled.unwrap_or(d.enabled),
            types: self.types.unwrap_or(d.types),
        }
    }
}

/// The complete, fully-defaulted policy set for one company.
///
/// A `PolicySet` read at the start of an operation doubles as that
/// operation's configuration cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicySet {
    /// Attendance policy.
    pub attendance: AttendanceConfig,
    /// Break policy.
    pub breaks: BreakConfig,
    /// Overtime policy.
    pub overtime: OvertimeConfig,
    /// Payroll policy.
    pub payroll: PayrollConfig,
    /// Allowance policy.
    pub allowance: AllowanceConfig,
    /// Deduction policy.
    pub deduction: DeductionConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_documents_merge_to_defaults() {
        assert_eq!(
            AttendanceConfigDocument::default().merge_with_defaults(),
            AttendanceConfig::default()
        );
        assert_eq!(
            BreakConfigDocument::default().merge_with_defaults(),
            BreakConfig::default()
        );
        assert_eq!(
            OvertimeConfigDocument::default().merge_with_defaults(),
            OvertimeConfig::default()
        );
        assert_eq!(
            PayrollConfigDocument::default().merge_with_defaults(),
            PayrollConfig::default()
        );
        assert_eq!(
            AllowanceConfigDocument::default().merge_with_defaults(),
            AllowanceConfig::default()
        );
        assert_eq!(
            DeductionConfigDocument::default().merge_with_defaults(),
            DeductionConfig::default()
        );
    }

    #[test]
    fn test_partial_document_overrides_only_present_fields() {
        let doc: BreakConfigDocument =
            serde_yaml::from_str("minimum_break_minutes: 30\nbreak_type: PAID\n").unwrap();
        let config = doc.merge_with_defaults();
        assert_eq!(config.minimum_break_minutes, 30);
        assert_eq!(config.break_type, BreakType::Paid);
        assert_eq!(config.default_break_minutes, 60);
        assert_eq!(config.maximum_break_minutes, Some(90));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let doc: PayrollConfigDocument =
            serde_yaml::from_str("legacy_flag: true\nstandard_working_days_per_month: 20\n")
                .unwrap();
        assert_eq!(
            doc.merge_with_defaults().standard_working_days_per_month,
            20
        );
    }

    #[test]
    fn test_night_window_wraps_midnight() {
        let window = AttendanceConfig::default().night_window;
        assert!(window.contains(time(22, 0)));
        assert!(window.contains(time(0, 0)));
        assert!(!window.contains(time(12, 0)));
    }

    #[test]
    fn test_day_window_does_not_wrap() {
        let window = TimeWindow {
            start: time(12, 0),
            end: time(13, 0),
        };
        assert!(window.contains(time(12, 30)));
        assert!(!window.contains(time(13, 0)));
        assert!(!window.contains(time(23, 0)));
    }

    #[test]
    fn test_find_allowance_type() {
        let config = AllowanceConfig {
            enabled: true,
            types: vec![AllowanceType {
                code: "meal".to_string(),
                name: "Meal allowance".to_string(),
                default_amount: Some(Decimal::from(10_000)),
                taxable: false,
            }],
        };
        assert_eq!(config.find_type("meal").unwrap().name, "Meal allowance");
        assert!(config.find_type("travel").is_none());
    }
}
