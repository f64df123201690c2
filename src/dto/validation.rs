//! Validation helpers for DTOs.

use validator::ValidationError;

/// Rejects strings that are empty once surrounding whitespace is removed.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("A1")  // Ok
/// validate_not_blank("  ")  // Err
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Route keys are free text but must stay on one line so they render as graph labels.
pub fn validate_route_key(key: &str) -> Result<(), ValidationError> {
    if key.chars().any(char::is_control) {
        let mut err = ValidationError::new("route_key_format");
        err.message = Some("route key must not contain control characters".into());
        return Err(err);
    }
    Ok(())
}
