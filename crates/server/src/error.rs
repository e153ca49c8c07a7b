//! Unified error handling for the API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::policy::PolicyError;
use crate::services::auth::AuthError;
use crate::services::enquiries::EnquiryError;
use crate::services::token::TokenError;
use crate::services::users::UserAdminError;

/// Application-level error type for API responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-bounds input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Role or ownership check failed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource absent or soft-deleted.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Business-rule conflict (duplicate email, invalid assignee, last admin).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Server errors are logged; clients get a generic message
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            tracing::error!(error = %self, "request failed");
        }

        let status = match &self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Validation(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m) => m.clone(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Forbidden(_) => Self::Forbidden(err.to_string()),
            PolicyError::InvalidAssignee(_) => Self::Conflict(err.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        Self::Unauthorized(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::UserAlreadyExists
            | AuthError::AdminAlreadyExists
            | AuthError::StaffRegistrationClosed => Self::Conflict(err.to_string()),
            AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) | AuthError::InvalidName(_) => {
                Self::Validation(err.to_string())
            }
            AuthError::PasswordHash => Self::Internal(err.to_string()),
            AuthError::Repository(e) => Self::from(e),
        }
    }
}

impl From<EnquiryError> for ApiError {
    fn from(err: EnquiryError) -> Self {
        match err {
            EnquiryError::NotFound => Self::NotFound("Enquiry not found".to_string()),
            EnquiryError::Policy(e) => Self::from(e),
            EnquiryError::Validation(e) => Self::from(e),
            EnquiryError::Repository(e) => Self::from(e),
        }
    }
}

impl From<UserAdminError> for ApiError {
    fn from(err: UserAdminError) -> Self {
        match err {
            UserAdminError::NotFound => Self::NotFound("User not found".to_string()),
            UserAdminError::EmailTaken | UserAdminError::LastAdmin => {
                Self::Conflict(err.to_string())
            }
            UserAdminError::Validation(e) => Self::from(e),
            UserAdminError::PasswordHash => Self::Internal(err.to_string()),
            UserAdminError::Repository(e) => Self::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("enquiry 123".to_string());
        assert_eq!(err.to_string(), "Not found: enquiry 123");

        let err = ApiError::Validation("phone too long".to_string());
        assert_eq!(err.to_string(), "Validation error: phone too long");
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            get_status(ApiError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Conflict("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(ApiError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(ApiError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ApiError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_policy_errors_map_to_http_classes() {
        let forbidden: ApiError = PolicyError::Forbidden("no").into();
        assert_eq!(get_status(forbidden), StatusCode::FORBIDDEN);

        let invalid: ApiError = PolicyError::InvalidAssignee("no").into();
        assert_eq!(get_status(invalid), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_errors_are_redacted() {
        let response = ApiError::Internal("connection pool exhausted".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The body must not leak the internal detail; it is replaced wholesale.
        // (Body inspection is covered by the live integration tests.)
    }
}
