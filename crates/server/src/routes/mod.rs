//! HTTP route handlers.

pub mod auth;
pub mod enquiries;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Assemble all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::routes())
        .nest("/api/enquiries", enquiries::routes())
        .nest("/api/users", users::routes())
}
