//! Tag API endpoints
//!
//! Handles HTTP requests for tag management:
//! - GET /api/v1/tags - List tags (`label`, `created_start`, `created_end`)
//! - GET /api/v1/tags/{id} - Get tag
//! - POST /api/v1/tags - Add tag
//! - PUT /api/v1/tags/{id} - Rename tag
//! - DELETE /api/v1/tags/{id} - Delete tag

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Tag, TagFilter, TagInput};

/// Response for tag list
#[derive(Debug, Serialize)]
pub struct TagListResponse {
    pub tags: Vec<Tag>,
}

/// Build the tags router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags).post(add_tag))
        .route("/{id}", get(get_tag).put(update_tag).delete(delete_tag))
}

/// GET /api/v1/tags
async fn list_tags(
    State(state): State<AppState>,
    Query(filter): Query<TagFilter>,
) -> Result<Json<TagListResponse>, ApiError> {
    let tags = state.tag_service.list_all(&filter).await?;
    Ok(Json(TagListResponse { tags }))
}

/// GET /api/v1/tags/{id}
async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Tag>, ApiError> {
    Ok(Json(state.tag_service.get_by_id(id).await?))
}

/// POST /api/v1/tags
async fn add_tag(
    State(state): State<AppState>,
    Json(input): Json<TagInput>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let tag = state.tag_service.add(input).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// PUT /api/v1/tags/{id}
async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<TagInput>,
) -> Result<Json<Tag>, ApiError> {
    Ok(Json(state.tag_service.update(input, id).await?))
}

/// DELETE /api/v1/tags/{id}
async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.tag_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
