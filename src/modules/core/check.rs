//! Assertion helpers used by the store suites
//!
//! Each helper returns `HarnessError::Assertion` instead of panicking so a
//! failing step can be recorded and the suite can still tear down.

use std::fmt::Debug;
use std::ops::RangeBounds;

use crate::error::{HarnessError, Result};

/// Fail with an assertion error unless `actual == expected`
pub fn ensure_eq<T>(label: &str, actual: T, expected: T) -> Result<()>
where
    T: PartialEq + Debug,
{
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::assertion(
            label,
            format!("{:?}", expected),
            format!("{:?}", actual),
        ))
    }
}

/// Fail with an assertion error unless `condition` holds
pub fn ensure(condition: bool, label: &str, expected: &str, actual: impl Debug) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(HarnessError::assertion(label, expected, format!("{:?}", actual)))
    }
}

/// Fail with an assertion error unless `value` lies inside `range`
pub fn ensure_in<T, R>(label: &str, value: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(HarnessError::assertion(
            label,
            format!("value in {:?}", range),
            format!("{:?}", value),
        ))
    }
}

/// Parse a decimal column rendered as text
pub fn parse_decimal(label: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| HarnessError::assertion(label, "a decimal number", format!("{:?}", raw)))
}

/// Parse a decimal column rendered as text and compare it with `expected`
pub fn ensure_decimal_eq(label: &str, raw: &str, expected: f64) -> Result<()> {
    let value = parse_decimal(label, raw)?;
    ensure_eq(label, value, expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_eq() {
        assert!(ensure_eq("rows", 1, 1).is_ok());

        let err = ensure_eq("rows", 2, 1).unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: rows: expected 1, got 2");
    }

    #[test]
    fn test_ensure_eq_strings_are_quoted() {
        let err = ensure_eq("nombre", "otro", "Producto de Prueba").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Assertion failed: nombre: expected \"Producto de Prueba\", got \"otro\""
        );
    }

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "inserted_id", "an ObjectId", "x").is_ok());
        assert!(ensure(false, "inserted_id", "an ObjectId", "x").is_err());
    }

    #[test]
    fn test_ensure_in_ttl_window() {
        assert!(ensure_in("ttl", 60, 1..=60).is_ok());
        assert!(ensure_in("ttl", 1, 1..=60).is_ok());
        assert!(ensure_in("ttl", 0, 1..=60).is_err());
        assert!(ensure_in("ttl", -1, 1..=60).is_err());
        assert!(ensure_in("ttl", 61, 1..=60).is_err());
    }

    #[test]
    fn test_decimal_round_trip() {
        for (raw, expected) in [
            ("99.99", 99.99),
            ("129.99", 129.99),
            ("29.99", 29.99),
            ("34.99", 34.99),
            ("1.24", 1.24),
            ("15.00", 15.0),
            (" 10.5 ", 10.5),
        ] {
            assert!(ensure_decimal_eq("decimal", raw, expected).is_ok(), "{}", raw);
        }
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        let err = parse_decimal("precio", "n/a").unwrap_err();
        assert!(err.is_assertion());
    }
}
