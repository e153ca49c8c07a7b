//! Authentication extractors.
//!
//! Handlers opt into authentication by taking [`RequireAuth`] (any role) or
//! [`RequireAdmin`] (admin only) as an argument. Both validate the
//! `Authorization: Bearer <token>` header against the token service.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     RequireAuth(actor): RequireAuth,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", actor.email)
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use enquiry_desk_core::Role;

use crate::error::ApiError;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Extractor that requires an authenticated actor of any role.
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires an authenticated admin.
pub struct RequireAdmin(pub CurrentUser);

/// Pull and verify the bearer token from the request headers.
fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser, ApiError> {
    let header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected a bearer token".to_string()))?;

    let actor = state.tokens().verify(token)?;
    Ok(actor)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor = authenticate(parts, state)?;

        if actor.role != Role::Admin {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }

        Ok(Self(actor))
    }
}
