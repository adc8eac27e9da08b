// This file contains the forecast record structs and related definitions.
#![forbid(unsafe_code)]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Divisor used to derive fahrenheit from celsius.  The quotient is truncated
// toward zero, so 12C is 53F and 32C is 89F.
const FAHRENHEIT_DIVISOR: f64 = 0.5556;

// ---------------------------------------------------------------------------
// forecasts:
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub id: i32,
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub summary: String,
}

impl Forecast {
    pub fn new(id: i32, date: NaiveDate, temperature_c: i32, summary: String) -> Forecast {
        Forecast {id, date, temperature_c, summary}
    }

    /// The derived fahrenheit temperature.
    pub fn temperature_f(&self) -> i64 {
        celsius_to_fahrenheit(self.temperature_c)
    }
}

// ---------------------------------------------------------------------------
// validation errors:
// ---------------------------------------------------------------------------
/// A field level input error.  The identifier names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub identifier: String,
    pub error_message: String,
}

impl ValidationError {
    pub fn new(identifier: &str, error_message: &str) -> ValidationError {
        ValidationError {identifier: identifier.to_string(), error_message: error_message.to_string()}
    }
}

// ---------------------------------------------------------------------------
// celsius_to_fahrenheit:
// ---------------------------------------------------------------------------
/** Every i32 celsius value maps to an i64 fahrenheit value, so the addition
 * cannot overflow.  The `as` cast truncates toward zero.
 */
pub fn celsius_to_fahrenheit(celsius: i32) -> i64 {
    32 + (f64::from(celsius) / FAHRENHEIT_DIVISOR) as i64
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fahrenheit_reference_values() {
        assert_eq!(celsius_to_fahrenheit(12), 53);
        assert_eq!(celsius_to_fahrenheit(32), 89);
        assert_eq!(celsius_to_fahrenheit(0), 32);
    }

    #[test]
    fn fahrenheit_truncates_toward_zero() {
        // -10 / 0.5556 = -17.99..., truncated to -17.
        assert_eq!(celsius_to_fahrenheit(-10), 15);
    }

    #[test]
    fn forecast_derives_fahrenheit() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let f = Forecast::new(0, date, 21, "Warm".to_string());
        assert_eq!(f.temperature_f(), 69);
    }

    #[test]
    fn fahrenheit_covers_the_whole_celsius_range() {
        // 2147483647 / 0.5556 = 3865161351.8..., -2147483648 / 0.5556 = -3865161353.6...
        assert_eq!(celsius_to_fahrenheit(i32::MAX), 3_865_161_383);
        assert_eq!(celsius_to_fahrenheit(i32::MIN), -3_865_161_321);
        assert_eq!(celsius_to_fahrenheit(1_500_000_000), 2_699_784_049);
    }
}
