//! Validation utilities.

use crate::StashError;
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `StashError` on failure.
    fn validate_request(&self) -> Result<(), StashError> {
        self.validate().map_err(validation_errors_to_stash_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Folds `validator::ValidationErrors` into one `StashError::Validation`,
/// listing `field: message` pairs in field order.
#[must_use]
pub fn validation_errors_to_stash_error(errors: ValidationErrors) -> StashError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let message = fields
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let text = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{field}: {text}")
            })
        })
        .collect::<Vec<_>>()
        .join("; ");

    StashError::Validation(message)
}
