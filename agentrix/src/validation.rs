//! Input validation performed before any request leaves the SDK.
//!
//! Each function either returns `Ok(())` or a [`ValidationError`]. The first
//! invalid field wins; errors are never aggregated.

use serde_json::Value;

use crate::error::ValidationError;

/// Checks that an API key is present and not blank.
///
/// # Errors
///
/// Returns [`ValidationError`] if `key` is empty or whitespace only.
pub fn validate_api_key(key: &str) -> Result<(), ValidationError> {
    if key.trim().is_empty() {
        return Err(ValidationError::new("API key is required"));
    }
    Ok(())
}

/// Checks that a monetary amount is a finite, strictly positive number.
///
/// # Errors
///
/// Returns [`ValidationError`] for zero, negative, `NaN` or infinite amounts.
pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::new("Amount must be a number"));
    }
    if amount <= 0.0 {
        return Err(ValidationError::new("Amount must be greater than 0")
            .with_details(serde_json::json!({ "amount": amount })));
    }
    Ok(())
}

/// Checks that a currency code is exactly three characters.
///
/// Case and ISO 4217 membership are not checked.
///
/// # Errors
///
/// Returns [`ValidationError`] if `code` is not three characters long.
pub fn validate_currency(code: &str) -> Result<(), ValidationError> {
    if code.chars().count() != 3 {
        return Err(ValidationError::new("Currency must be a 3-letter code")
            .with_details(serde_json::json!({ "currency": code })));
    }
    Ok(())
}

/// Checks that an identifier is present and not blank.
///
/// `field` names the identifier in the error message, e.g. `"Agent ID"`.
///
/// # Errors
///
/// Returns [`ValidationError`] if `value` is empty or whitespace only.
pub fn validate_id(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!("{field} is required")));
    }
    Ok(())
}

/// Checks the shape of a payment request body.
///
/// Requires `amount`, then `currency`, then `description`, in that order.
/// `description` must be present but its value is not inspected.
///
/// # Errors
///
/// Returns [`ValidationError`] for the first missing or invalid field, or if
/// `request` is not a JSON object.
pub fn validate_payment_request(request: &Value) -> Result<(), ValidationError> {
    let Some(fields) = request.as_object() else {
        return Err(ValidationError::new("Payment request must be an object"));
    };

    let amount = fields
        .get("amount")
        .ok_or_else(|| ValidationError::new("Amount is required"))?;
    let amount = amount
        .as_f64()
        .ok_or_else(|| ValidationError::new("Amount must be a number"))?;
    validate_amount(amount)?;

    let currency = fields
        .get("currency")
        .ok_or_else(|| ValidationError::new("Currency is required"))?;
    let currency = currency
        .as_str()
        .ok_or_else(|| ValidationError::new("Currency must be a 3-letter code"))?;
    validate_currency(currency)?;

    if !fields.contains_key("description") {
        return Err(ValidationError::new("Description is required"));
    }
    Ok(())
}
