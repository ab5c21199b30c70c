// Validation utilities for identifiers and string fields
// Everything here runs before any network call is made

use uuid::Uuid;

use super::service_error::ServiceError;

/// Trim and validate a required string field
///
/// # Arguments
/// * `name` - Field name used in the error message
/// * `field` - The string field to validate
///
/// # Returns
/// * `Ok(String)` - The trimmed string if valid
/// * `Err(ServiceError::ValidationFailure)` - If the field is empty after trimming
pub fn trim_and_validate_field(name: &str, field: &str) -> Result<String, ServiceError> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Err(ServiceError::ValidationFailure(format!(
            "{} cannot be empty",
            name
        )))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parse an internal record identifier (user, account, payment task)
pub fn parse_id(name: &str, raw: &str) -> Result<Uuid, ServiceError> {
    let trimmed = trim_and_validate_field(name, raw)?;
    Uuid::parse_str(&trimmed).map_err(|_| {
        ServiceError::ValidationFailure(format!("{} is not a valid identifier: {}", name, raw))
    })
}

pub fn parse_user_id(raw: &str) -> Result<Uuid, ServiceError> {
    parse_id("user_id", raw)
}

/// Amounts arrive as floats; reject NaN and infinities
pub fn validate_amount(name: &str, amount: f64) -> Result<f64, ServiceError> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(ServiceError::ValidationFailure(format!(
            "{} must be a finite number",
            name
        )))
    }
}
