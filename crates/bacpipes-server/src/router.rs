//! BACpipes Router
//!
//! Route table and middleware stack for the dashboard API.
//!
//! @version 0.1.0
//! @author BACpipes Development Team

use crate::handlers;
use crate::middleware;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/points", get(handlers::get_points))
        .route("/trends", get(handlers::get_trend))
        .route("/export", get(handlers::export_csv))
        .route("/health", get(handlers::get_health));

    Router::new()
        .route("/health", get(handlers::liveness))
        .nest("/api", api_routes)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::request_id))
        .with_state(state)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use bacpipes_store::MemoryStore;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        create_router(state)
    }

    #[tokio::test]
    async fn test_liveness_endpoint() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
