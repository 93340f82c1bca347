//! Article API endpoints
//!
//! - GET /api/v1/articles - List articles (`status`, `topic`, `created_start`, `created_end`)
//! - GET /api/v1/articles/{id} - Get article (soft-deleted ones included)
//! - POST /api/v1/articles - Save article
//! - PUT /api/v1/articles/{id} - Overwrite article
//! - DELETE /api/v1/articles/{id} - Soft delete

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Article, ArticleDraft, ArticleFilter};

/// Response for article list
#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<Article>,
}

/// Build the articles router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_articles_handler).post(save_article_handler))
        .route(
            "/{id}",
            get(get_article_handler)
                .put(update_article_handler)
                .delete(delete_article_handler),
        )
}

/// GET /api/v1/articles
async fn list_articles_handler(
    State(state): State<AppState>,
    Query(filter): Query<ArticleFilter>,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let articles = state.article_service.list_all(&filter).await?;
    Ok(Json(ArticleListResponse { articles }))
}

/// GET /api/v1/articles/{id}
async fn get_article_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.article_service.get_by_id(id).await?))
}

/// POST /api/v1/articles
async fn save_article_handler(
    State(state): State<AppState>,
    Json(draft): Json<ArticleDraft>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let article = state.article_service.save(draft).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// PUT /api/v1/articles/{id}
async fn update_article_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<ArticleDraft>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.article_service.update(draft, id).await?))
}

/// DELETE /api/v1/articles/{id}
async fn delete_article_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.article_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{send, test_app};
    use axum::http::StatusCode;
    use axum::Router;
    use serde_json::{json, Value};

    async fn create(app: &Router, uri: &str, label: &str) -> i64 {
        let (status, body) = send(app, "POST", uri, Some(json!({ "label": label }))).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    async fn save(app: &Router, body: Value) -> (StatusCode, Value) {
        send(app, "POST", "/api/v1/articles", Some(body)).await
    }

    #[tokio::test]
    async fn test_save_publish_with_unknown_tag() {
        let app = test_app().await;
        let topic = create(&app, "/api/v1/topics", "economy").await;
        let tag = create(&app, "/api/v1/tags", "fund").await;

        let (status, body) = save(
            &app,
            json!({
                "title": "Rates hold",
                "writer": "desk",
                "content": "Body",
                "status": "publish",
                "tags": [tag, 999],
                "topic_id": topic,
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "publish");
        assert_eq!(body["tags"].as_array().unwrap().len(), 1);
        assert_eq!(body["tags"][0]["label"], "fund");
        assert_eq!(body["topic"]["label"], "economy");
        assert!(!body["published_at"].is_null());
    }

    #[tokio::test]
    async fn test_save_rejects_unknown_status() {
        let app = test_app().await;
        let topic = create(&app, "/api/v1/topics", "economy").await;

        let (status, body) = save(&app, json!({"title": "t", "status": "archived", "topic_id": topic})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (_, list) = send(&app, "GET", "/api/v1/articles", None).await;
        assert!(list["articles"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_with_unknown_topic_is_not_found() {
        let app = test_app().await;

        let (status, _) = save(&app, json!({"title": "t", "status": "draft", "topic_id": 12})).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_with_zero_id_creates() {
        let app = test_app().await;
        let topic = create(&app, "/api/v1/topics", "economy").await;

        let (status, body) = save(&app, json!({"id": 0, "title": "t", "status": "draft", "topic_id": topic})).await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_update_and_soft_delete() {
        let app = test_app().await;
        let topic = create(&app, "/api/v1/topics", "economy").await;
        let (_, saved) = save(&app, json!({"title": "t", "status": "draft", "topic_id": topic})).await;
        let id = saved["id"].as_i64().unwrap();

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/v1/articles/{}", id),
            Some(json!({"title": "t2", "status": "publish", "topic_id": topic})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id);
        assert_eq!(updated["title"], "t2");

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/articles/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, deleted) = send(&app, "GET", &format!("/api/v1/articles/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["status"], "deleted");
        assert!(!deleted["deleted_at"].is_null());
    }

    #[tokio::test]
    async fn test_update_missing_article() {
        let app = test_app().await;
        let topic = create(&app, "/api/v1/topics", "economy").await;

        let (status, _) = send(
            &app,
            "PUT",
            "/api/v1/articles/404",
            Some(json!({"title": "t", "status": "draft", "topic_id": topic})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_by_status_and_topic() {
        let app = test_app().await;
        let economy = create(&app, "/api/v1/topics", "economy").await;
        let sport = create(&app, "/api/v1/topics", "sport").await;
        for (title, status, topic) in [("a", "draft", economy), ("b", "publish", economy), ("c", "publish", sport)] {
            save(&app, json!({"title": title, "status": status, "topic_id": topic})).await;
        }

        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/v1/articles?status=publish&topic={}", economy),
            None,
        )
        .await;

        let articles = body["articles"].as_array().unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0]["title"], "b");
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let app = test_app().await;

        let (status, _) = save(&app, json!({"title": "t", "status": "draft", "topic_id": "five"})).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
