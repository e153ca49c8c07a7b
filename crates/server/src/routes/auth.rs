//! Authentication route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use enquiry_desk_core::Role;

use crate::db::users::UserRepository;
use crate::error::ApiError;
use crate::middleware::RequireAuth;
use crate::services::AuthService;
use crate::state::AppState;

/// Auth routes: register, login, me.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

/// Registration body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Login body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register a new account.
///
/// POST /api/auth/register
#[instrument(skip(state, request), fields(email = %request.email))]
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(
            &request.name,
            &request.email,
            &request.password,
            request.role,
        )
        .await?;

    let token = state.tokens().issue(&user)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "user": user,
        })),
    ))
}

/// Login with email and password.
///
/// POST /api/auth/login
#[instrument(skip(state, request), fields(email = %request.email))]
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&request.email, &request.password).await?;

    let token = state.tokens().issue(&user)?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": user,
    })))
}

/// Return the acting user's account.
///
/// GET /api/auth/me
#[instrument(skip(state, actor), fields(user_id = %actor.id))]
async fn me(
    RequireAuth(actor): RequireAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    // Re-read the account so role changes since token issue are visible.
    let user = UserRepository::new(state.pool())
        .get_by_id(actor.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(json!({ "user": user })))
}
