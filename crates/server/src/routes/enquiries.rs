//! Enquiry route handlers.
//!
//! Creation is public; everything else requires a bearer token, with the
//! role rules enforced by the authorization policy inside the service.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use enquiry_desk_core::{EnquiryId, UserId};

use crate::error::ApiError;
use crate::middleware::RequireAuth;
use crate::models::{CreateEnquiryRequest, ListQuery, UpdateEnquiryPatch};
use crate::services::EnquiryService;
use crate::state::AppState;

/// Enquiry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/staff/list", get(staff))
        .route("/{id}", get(get_by_id).put(update).delete(delete))
        .route("/{id}/assign", post(assign))
        .route("/{id}/unassign", post(unassign))
}

/// Assignment body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub assigned_to: UserId,
}

/// Submit a new enquiry. Public.
///
/// POST /api/enquiries
#[instrument(skip(state, request), fields(email = %request.email))]
async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateEnquiryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let enquiry = EnquiryService::new(state.pool()).create(request).await?;
    tracing::info!(enquiry_id = %enquiry.id, "enquiry created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Enquiry created successfully",
            "enquiry": enquiry,
        })),
    ))
}

/// List enquiries with filtering and pagination.
///
/// GET /api/enquiries?status=&search=&page=&limit=
#[instrument(skip(state, _actor, query))]
async fn list(
    RequireAuth(_actor): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.into_filter()?;
    let page = EnquiryService::new(state.pool()).list(&filter).await?;

    Ok(Json(json!({
        "enquiries": page.enquiries,
        "pagination": page.pagination,
    })))
}

/// Fetch a single enquiry.
///
/// GET /api/enquiries/{id}
#[instrument(skip(state, _actor))]
async fn get_by_id(
    RequireAuth(_actor): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let enquiry = EnquiryService::new(state.pool())
        .get(EnquiryId::new(id))
        .await?;

    Ok(Json(json!({ "enquiry": enquiry })))
}

/// Update an enquiry under the role rules.
///
/// PUT /api/enquiries/{id}
#[instrument(skip(state, actor, patch), fields(user_id = %actor.id))]
async fn update(
    RequireAuth(actor): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<UpdateEnquiryPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let enquiry = EnquiryService::new(state.pool())
        .update(EnquiryId::new(id), patch, &actor)
        .await?;

    Ok(Json(json!({
        "message": "Enquiry updated successfully",
        "enquiry": enquiry,
    })))
}

/// Soft-delete an enquiry. Admin only.
///
/// DELETE /api/enquiries/{id}
#[instrument(skip(state, actor), fields(user_id = %actor.id))]
async fn delete(
    RequireAuth(actor): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    EnquiryService::new(state.pool())
        .delete(EnquiryId::new(id), &actor)
        .await?;

    Ok(Json(json!({ "message": "Enquiry deleted successfully" })))
}

/// Assign an enquiry to a staff-or-admin user. Admin only.
///
/// POST /api/enquiries/{id}/assign
#[instrument(skip(state, actor, request), fields(user_id = %actor.id))]
async fn assign(
    RequireAuth(actor): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AssignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let enquiry = EnquiryService::new(state.pool())
        .assign(EnquiryId::new(id), request.assigned_to, &actor)
        .await?;

    Ok(Json(json!({
        "message": "Enquiry assigned successfully",
        "enquiry": enquiry,
    })))
}

/// Clear an enquiry's assignee. Admin only.
///
/// POST /api/enquiries/{id}/unassign
#[instrument(skip(state, actor), fields(user_id = %actor.id))]
async fn unassign(
    RequireAuth(actor): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let enquiry = EnquiryService::new(state.pool())
        .unassign(EnquiryId::new(id), &actor)
        .await?;

    Ok(Json(json!({
        "message": "Enquiry unassigned successfully",
        "enquiry": enquiry,
    })))
}

/// List assignable users for the assignment picker. Admin only.
///
/// GET /api/enquiries/staff/list
#[instrument(skip(state, actor), fields(user_id = %actor.id))]
async fn staff(
    RequireAuth(actor): RequireAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let staff = EnquiryService::new(state.pool()).staff(&actor).await?;

    Ok(Json(json!({ "staff": staff })))
}
