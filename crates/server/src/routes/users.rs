//! User management route handlers. Admin only.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use enquiry_desk_core::{Role, UserId};

use crate::error::ApiError;
use crate::middleware::RequireAdmin;
use crate::models::ListQuery;
use crate::services::UserService;
use crate::services::users::UserPatch;
use crate::state::AppState;

/// User management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", put(update).delete(delete))
        .route("/{id}/role", put(update_role))
}

/// Account creation body.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Partial account update body.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Role change body.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Pagination query for the account list.
#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Create an account with any role.
///
/// POST /api/users
#[instrument(skip(state, admin, request), fields(admin_id = %admin.id, email = %request.email))]
async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = UserService::new(state.pool())
        .create(
            &request.name,
            &request.email,
            &request.password,
            request.role.unwrap_or(Role::User),
        )
        .await?;
    tracing::info!(user_id = %user.id, role = %user.role, "user created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": user,
        })),
    ))
}

/// List accounts with pagination.
///
/// GET /api/users?page=&limit=
#[instrument(skip(state, admin, query), fields(admin_id = %admin.id))]
async fn list(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ListQuery {
        page: query.page,
        limit: query.limit,
        ..ListQuery::default()
    }
    .into_filter()?;

    let page = UserService::new(state.pool()).list(&filter).await?;

    Ok(Json(json!({
        "users": page.users,
        "pagination": page.pagination,
    })))
}

/// Update an account.
///
/// PUT /api/users/{id}
#[instrument(skip(state, admin, request), fields(admin_id = %admin.id))]
async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = UserService::new(state.pool())
        .update(
            UserId::new(id),
            UserPatch {
                name: request.name,
                email: request.email,
                password: request.password,
                role: request.role,
            },
        )
        .await?;

    Ok(Json(json!({
        "message": "User updated successfully",
        "user": user,
    })))
}

/// Change an account's role.
///
/// PUT /api/users/{id}/role
#[instrument(skip(state, admin, request), fields(admin_id = %admin.id))]
async fn update_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = UserService::new(state.pool())
        .update_role(UserId::new(id), request.role)
        .await?;

    Ok(Json(json!({
        "message": "User role updated successfully",
        "user": user,
    })))
}

/// Delete an account, upholding the last-admin invariant.
///
/// DELETE /api/users/{id}
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    UserService::new(state.pool()).delete(UserId::new(id)).await?;

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
