//! Form input checks applied before anything is sent to the backend.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::ValidationError;

/// Trims `raw` and rejects it when nothing is left.
pub fn required_text(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(value.to_string())
}

/// Parses a user-typed number, accepting `,` as the decimal separator.
///
/// Only digits, a leading sign and a single `.` or `,` are allowed, so
/// `"1.234,56"` and `"4_99"` are rejected rather than silently reinterpreted.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }

    let invalid = || ValidationError::InvalidNumber { field, value: trimmed.to_string() };
    if !is_plain_number(trimmed) {
        return Err(invalid());
    }

    let normalized = trimmed.replacen(',', ".", 1);
    Decimal::from_str(&normalized).map_err(|_| invalid())
}

fn is_plain_number(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let separators = unsigned.chars().filter(|ch| matches!(ch, '.' | ',')).count();
    separators <= 1
        && unsigned.chars().any(|ch| ch.is_ascii_digit())
        && unsigned.chars().all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | ','))
}
