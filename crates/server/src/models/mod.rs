//! Domain models and request/response shapes.

pub mod enquiry;
pub mod user;

pub use enquiry::{
    Assignee, CreateEnquiryRequest, Enquiry, ListFilter, ListQuery, NewEnquiry, Pagination,
    UpdateEnquiryPatch,
};
pub use user::{CurrentUser, StaffMember, User};

use thiserror::Error;

use enquiry_desk_core::EmailError;

/// Errors raised while validating request input at the API boundary.
#[derive(Debug, Error, Clone)]
pub enum ValidationError {
    /// A required field is missing or blank after trimming.
    #[error("{0} is required")]
    Required(&'static str),

    /// A field exceeds its maximum length.
    #[error("{0} cannot exceed {1} characters")]
    TooLong(&'static str, usize),

    /// A field is below its minimum length.
    #[error("{0} must be at least {1} characters")]
    TooShort(&'static str, usize),

    /// The email address is malformed.
    #[error("Please enter a valid email: {0}")]
    Email(#[from] EmailError),

    /// The status filter is not a recognized value.
    #[error("Status must be one of: new, in_progress, closed")]
    InvalidStatus,
}

/// Validate a required, length-bounded text field. Trims the input.
pub(crate) fn required_text(
    value: &str,
    field: &'static str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    if trimmed.len() > max {
        return Err(ValidationError::TooLong(field, max));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("  Jane ", "Name", 50).ok(), Some("Jane".to_owned()));
    }

    #[test]
    fn test_required_text_blank() {
        assert!(matches!(
            required_text("   ", "Name", 50),
            Err(ValidationError::Required("Name"))
        ));
    }

    #[test]
    fn test_required_text_too_long() {
        assert!(matches!(
            required_text(&"x".repeat(51), "Name", 50),
            Err(ValidationError::TooLong("Name", 50))
        ));
    }
}
