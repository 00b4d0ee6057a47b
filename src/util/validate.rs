//! Input validation shared by the data model and the dispatcher surface.

use crate::core::SchedulerError;

/// Shortest accepted equipment (vehicle/station) name.
pub const EQUIPMENT_NAME_MIN: usize = 2;
/// Longest accepted equipment (vehicle/station) name.
pub const EQUIPMENT_NAME_MAX: usize = 40;

/// Trim `value` and reject it if nothing is left.
///
/// # Errors
///
/// Returns `SchedulerError::Validation` naming `field` when `value` is blank.
pub fn require_non_blank(value: &str, field: &str) -> Result<String, SchedulerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SchedulerError::Validation(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

/// Equipment names are 2-40 characters of ASCII letters, digits, `_` or `-`.
#[must_use]
pub fn is_valid_equipment_name(name: &str) -> bool {
    (EQUIPMENT_NAME_MIN..=EQUIPMENT_NAME_MAX).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Reject names that fail [`is_valid_equipment_name`].
///
/// # Errors
///
/// Returns `SchedulerError::Validation` mentioning `kind`.
pub fn require_equipment_name(name: &str, kind: &str) -> Result<(), SchedulerError> {
    if is_valid_equipment_name(name) {
        Ok(())
    } else {
        Err(SchedulerError::Validation(format!(
            "{kind} name must be {EQUIPMENT_NAME_MIN}-{EQUIPMENT_NAME_MAX} characters of letters, digits, '_' or '-'"
        )))
    }
}
