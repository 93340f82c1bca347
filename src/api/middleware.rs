//! Shared API plumbing
//!
//! Contains:
//! - `AppState`, the services injected into every handler
//! - `ApiError`, the JSON error body and its status mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::DynCacheStore;
use crate::config::CacheConfig;
use crate::db::repositories::{SqlxArticleRepository, SqlxTagRepository, SqlxTopicRepository};
use crate::db::DynDatabasePool;
use crate::services::{
    ArticleAssembler, ArticleService, ReadThroughCache, ServiceError, TagService, TopicService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub tag_service: Arc<TagService>,
    pub topic_service: Arc<TopicService>,
    pub article_service: Arc<ArticleService>,
}

impl AppState {
    /// Wire repositories and services over one pool and one cache store
    pub fn new(pool: DynDatabasePool, cache: DynCacheStore, cache_config: &CacheConfig) -> Self {
        let tag_repo = SqlxTagRepository::boxed(pool.clone());
        let topic_repo = SqlxTopicRepository::boxed(pool.clone());
        let article_repo = SqlxArticleRepository::boxed(pool.clone());
        let read_through = Arc::new(ReadThroughCache::new(cache, cache_config));

        let assembler =
            ArticleAssembler::new(article_repo.clone(), topic_repo.clone(), tag_repo.clone());

        Self {
            tag_service: Arc::new(TagService::new(tag_repo, read_through.clone())),
            topic_service: Arc::new(TopicService::new(topic_repo, read_through.clone())),
            article_service: Arc::new(ArticleService::new(article_repo, assembler, read_through)),
            pool,
        }
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::StorageError(e) => {
                tracing::error!(error = ?e, "Storage operation failed");
                ApiError::internal_error(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_codes() {
        let cases = [
            (ServiceError::validation("bad"), "VALIDATION_ERROR", StatusCode::BAD_REQUEST),
            (ServiceError::not_found("Tag", 1), "NOT_FOUND", StatusCode::NOT_FOUND),
            (
                ServiceError::StorageError(anyhow::anyhow!("locked")),
                "INTERNAL_ERROR",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, code, status) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.error.code, code);
            assert_eq!(api.into_response().status(), status);
        }
    }

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_value(ApiError::not_found("Tag with ID 3 not found")).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"error": {"code": "NOT_FOUND", "message": "Tag with ID 3 not found"}})
        );
    }
}
