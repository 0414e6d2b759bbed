//! Best-effort numeric parsing for string-typed setting values.
//!
//! Setting values are stored as text, and a malformed value must never abort a
//! tick. Every helper here returns zero for a missing, blank, or unparseable
//! input instead of an error. Input is parsed as-is, without trimming.

use std::str::FromStr;

/// Parses an `i32`, returning 0 on `None`, blank, or invalid input.
#[must_use]
pub fn parse_int<'a>(value: impl Into<Option<&'a str>>) -> i32 {
    parse_or_zero(value.into())
}

/// Parses an `i64`, returning 0 on `None`, blank, or invalid input.
#[must_use]
pub fn parse_long<'a>(value: impl Into<Option<&'a str>>) -> i64 {
    parse_or_zero(value.into())
}

/// Parses an `f64`, returning 0.0 on `None`, blank, or invalid input.
#[must_use]
pub fn parse_double<'a>(value: impl Into<Option<&'a str>>) -> f64 {
    parse_or_zero(value.into())
}

fn parse_or_zero<T>(value: Option<&str>) -> T
where
    T: FromStr + Default,
{
    value
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}
