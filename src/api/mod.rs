//! API layer - HTTP handlers and routing
//!
//! Everything is mounted under `/api/v1`:
//! - Tag endpoints
//! - Topic endpoints
//! - Article endpoints
//! - Health check

pub mod articles;
pub mod health;
pub mod middleware;
pub mod tags;
pub mod topics;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState};

/// Build the main API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/tags", tags::router())
        .nest("/topics", topics::router())
        .nest("/articles", articles::router())
        .route("/health", axum::routing::get(health::health_check))
}

/// Build the complete router with middleware
///
/// `cors_origin` is either `*` or a single origin.
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = if cors_origin == "*" {
        AllowOrigin::any()
    } else {
        let value = cors_origin
            .parse::<HeaderValue>()
            .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
        AllowOrigin::exact(value)
    };

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .nest("/api/v1", build_api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{send, test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = test_app().await;

        let (status, _) = send(&app, "GET", "/api/v1/authors", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_cors_origin_rejected() {
        let pool = crate::db::create_test_pool().await.unwrap();
        let state = AppState::new(
            pool,
            crate::cache::create_cache(),
            &crate::config::CacheConfig::default(),
        );

        assert!(build_router(state, "bad\norigin").is_err());
    }
}
