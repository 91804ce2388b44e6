//! Reusable field validators
//!
//! Each validator checks one value and reports failures against the field
//! name it was given.

use crate::core::error::ValidationError;
use regex::Regex;
use std::sync::OnceLock;

/// Card names are between 2 and 255 characters
pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 255;

/// Validator: text must be present and non-empty
pub fn required_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.is_empty() {
        Err(ValidationError::required(field))
    } else {
        Ok(value)
    }
}

/// Validator: string length (in characters) must be within range
pub fn string_length(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        Err(ValidationError::new(
            field,
            format!("{} must be between {} and {} characters", field, min, max),
        ))
    } else {
        Ok(())
    }
}

/// Validator: a card display name
pub fn card_name(value: &str) -> Result<(), ValidationError> {
    required_text("name", value)?;
    string_length("name", value, NAME_MIN_CHARS, NAME_MAX_CHARS)
}

/// Validator: exactly four ASCII digits
pub fn last_four(value: &str) -> Result<(), ValidationError> {
    static LAST_FOUR_REGEX: OnceLock<Regex> = OnceLock::new();

    required_text("last_four", value)?;
    if value.chars().count() != 4 {
        return Err(ValidationError::new(
            "last_four",
            "last_four must be exactly 4 digits",
        ));
    }

    let regex = LAST_FOUR_REGEX.get_or_init(|| Regex::new(r"^[0-9]{4}$").unwrap());
    if !regex.is_match(value) {
        return Err(ValidationError::new("last_four", "last_four must be numeric"));
    }
    Ok(())
}

/// Validator: number must be strictly positive (and finite)
pub fn positive(field: &str, value: f64, message: &str) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::new(field, message))
    }
}

/// Validator: a row reference must be set
pub fn non_zero_id(field: &str, value: i64) -> Result<i64, ValidationError> {
    if value == 0 {
        Err(ValidationError::required(field))
    } else {
        Ok(value)
    }
}
