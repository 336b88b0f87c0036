//! Field checks shared by the services.
//!
//! Each check records at most one message per field in a [`FieldErrors`]
//! so a single request reports every problem at once.

use common::EntityId;

use crate::error::FieldErrors;

pub const PROPERTY_NAME_MAX: usize = 255;
pub const CATEGORY_NAME_MAX: usize = 100;
pub const ADDRESS_MAX: usize = 500;
pub const DESCRIPTION_MAX: usize = 500;

/// Trims `value` and checks it is non-empty and at most `max` characters.
pub fn required_text(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, format!("{field} is required."));
    } else {
        max_chars(errors, field, trimmed, max);
    }
    trimmed.to_string()
}

pub fn max_chars(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, format!("{field} must not exceed {max} characters."));
    }
}

pub fn positive_amount(errors: &mut FieldErrors, field: &str, amount: f64) {
    if !amount.is_finite() || amount <= 0.0 {
        errors.add(field, format!("{field} must be greater than 0."));
    }
}

/// Checks a referenced id from a request body and returns its canonical form.
pub fn reference_id(errors: &mut FieldErrors, field: &str, value: &str) -> String {
    if value.trim().is_empty() {
        errors.add(field, format!("{field} is required."));
        return String::new();
    }
    match EntityId::parse(value) {
        Some(id) => id.to_string(),
        None => {
            errors.add(field, format!("{field} must be a valid UUID."));
            value.to_string()
        }
    }
}

/// Records the message for a required field that was missing or null.
pub fn missing(errors: &mut FieldErrors, field: &str) {
    errors.add(field, format!("{field} is required."));
}
