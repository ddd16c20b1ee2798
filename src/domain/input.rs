//! Input rules shared by every store
//!
//! Names are trimmed and must not be blank. Quantities typed by a user are
//! parsed leniently: anything that isn't a finite, non-negative number
//! becomes `0.0` instead of failing the whole command.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} must not be blank")]
    Blank(&'static str),

    #[error("Quantity must be a finite, non-negative number, got {0}")]
    InvalidQuantity(f64),

    #[error("Unknown unit category: '{0}'")]
    UnknownCategory(String),

    #[error("A recipe needs a name, at least one ingredient and at least one instruction")]
    IncompleteRecipe,
}

/// Trims `value` and rejects it when nothing is left
pub fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(trimmed.to_string())
}

/// Checks a quantity before it is stored
pub fn checked_quantity(quantity: f64) -> Result<f64, ValidationError> {
    if quantity.is_finite() && quantity >= 0.0 {
        Ok(quantity)
    } else {
        Err(ValidationError::InvalidQuantity(quantity))
    }
}

/// Parses user-typed quantity text, falling back to `0.0`
pub fn parse_quantity(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => {
            tracing::warn!(input, "unparsable quantity, using 0");
            0.0
        }
    }
}

/// Returns true when a search query should match everything
pub fn is_blank_query(query: &str) -> bool {
    query.trim().is_empty()
}

/// Case-insensitive substring match
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Key used to compare ingredient and inventory names
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
