//! Time and money rounding.

use chrono::{Duration, NaiveDateTime, Timelike};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::{RoundingDirection, RoundingMode, RoundingRule};

/// Rounds a timestamp to the rule's granularity.
///
/// The unit is measured from midnight of the timestamp's date. An absent rule
/// or a zero unit returns the timestamp unchanged. Seconds and sub-seconds
/// count toward the remainder, so 09:07:30 is exactly half of a 15-minute unit
/// and rounds up under [`RoundingDirection::Nearest`].
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::round_time;
/// use attendance_payroll_engine::config::{RoundingDirection, RoundingRule};
/// use chrono::NaiveDateTime;
///
/// let rule = RoundingRule { unit_minutes: 15, direction: RoundingDirection::Nearest };
/// let ts = NaiveDateTime::parse_from_str("2026-01-13 08:55:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let rounded = round_time(ts, Some(&rule));
/// assert_eq!(rounded.format("%H:%M").to_string(), "09:00");
/// ```
pub fn round_time(timestamp: NaiveDateTime, rule: Option<&RoundingRule>) -> NaiveDateTime {
    let Some(rule) = rule else {
        return timestamp;
    };
    if rule.unit_minutes == 0 {
        return timestamp;
    }

    let unit_nanos = i64::from(rule.unit_minutes) * 60 * 1_000_000_000;
    let time = timestamp.time();
    let since_midnight = i64::from(time.num_seconds_from_midnight()) * 1_000_000_000
        + i64::from(time.nanosecond().min(999_999_999));
    let remainder = since_midnight % unit_nanos;
    if remainder == 0 {
        return timestamp;
    }

    let floor = timestamp - Duration::nanoseconds(remainder);
    let ceil = floor + Duration::nanoseconds(unit_nanos);
    match rule.direction {
        RoundingDirection::Down => floor,
        RoundingDirection::Up => ceil,
        RoundingDirection::Nearest => {
            if remainder * 2 >= unit_nanos {
                ceil
            } else {
                floor
            }
        }
    }
}

/// Whole minutes from `from` to `to`, truncated; zero when `to` precedes `from`.
pub fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> u32 {
    let minutes = (to - from).num_minutes();
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}

/// Rounds a monetary amount to a multiple of `unit`.
///
/// A non-positive unit leaves the amount unchanged.
///
/// # Example
///
/// ```
/// use attendance_payroll_engine::calculation::round_amount;
/// use attendance_payroll_engine::config::RoundingMode;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let amount = Decimal::from_str("2727272.7272").unwrap();
/// assert_eq!(round_amount(amount, Decimal::ONE, RoundingMode::Floor), Decimal::from(2_727_272));
/// assert_eq!(round_amount(amount, Decimal::from(10), RoundingMode::Ceil), Decimal::from(2_727_280));
/// ```
pub fn round_amount(amount: Decimal, unit: Decimal, mode: RoundingMode) -> Decimal {
    if unit <= Decimal::ZERO {
        return amount;
    }
    let units = amount / unit;
    let rounded = match mode {
        RoundingMode::Floor => units.floor(),
        RoundingMode::Ceil => units.ceil(),
        RoundingMode::Round => units.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
    };
    (rounded * unit).normalize()
}
