//! Topic API endpoints
//!
//! Handles HTTP requests for topic management:
//! - GET /api/v1/topics - List topics (`label`, `created_start`, `created_end`)
//! - GET /api/v1/topics/{id} - Get topic
//! - POST /api/v1/topics - Add topic
//! - PUT /api/v1/topics/{id} - Rename topic
//! - DELETE /api/v1/topics/{id} - Delete topic

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Topic, TopicFilter, TopicInput};

/// Response for topic list
#[derive(Debug, Serialize)]
pub struct TopicListResponse {
    pub topics: Vec<Topic>,
}

/// Build the topics router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_topics).post(add_topic))
        .route("/{id}", get(get_topic).put(update_topic).delete(delete_topic))
}

/// GET /api/v1/topics
async fn list_topics(
    State(state): State<AppState>,
    Query(filter): Query<TopicFilter>,
) -> Result<Json<TopicListResponse>, ApiError> {
    let topics = state.topic_service.list_all(&filter).await?;
    Ok(Json(TopicListResponse { topics }))
}

/// GET /api/v1/topics/{id}
async fn get_topic(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Topic>, ApiError> {
    Ok(Json(state.topic_service.get_by_id(id).await?))
}

/// POST /api/v1/topics
async fn add_topic(
    State(state): State<AppState>,
    Json(input): Json<TopicInput>,
) -> Result<(StatusCode, Json<Topic>), ApiError> {
    let topic = state.topic_service.add(input).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

/// PUT /api/v1/topics/{id}
async fn update_topic(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<TopicInput>,
) -> Result<Json<Topic>, ApiError> {
    Ok(Json(state.topic_service.update(input, id).await?))
}

/// DELETE /api/v1/topics/{id}
async fn delete_topic(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.topic_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
